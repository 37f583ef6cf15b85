//! Parser for SVG path data.
//!
//! The parser pushes absolute commands into a [`PathStream`]: relative coordinates are
//! resolved against the current point, `H`/`V` become lines, the smooth curve commands
//! get their first control point by reflection, and elliptical arcs are converted to
//! center parameterization.

use std::fmt;
use std::iter::Enumerate;
use std::str;
use std::str::Bytes;

use crate::bezier::{ArcParameterization, EllipticalArc, LargeArc, Sweep};
use crate::path_builder::PathStream;

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum Token {
    // pub to allow benchmarking
    Number(f64),
    Flag(bool),
    Command(u8),
    Comma,
}

use crate::path_parser::Token::{Comma, Command, Flag, Number};

#[derive(Debug)]
pub struct Lexer<'a> {
    // pub to allow benchmarking
    input: &'a [u8],
    ci: Enumerate<Bytes<'a>>,
    current: Option<(usize, u8)>,
    flags_required: u8,
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum LexError {
    // pub to allow benchmarking
    ParseFloatError,
    UnexpectedByte(u8),
    UnexpectedEof,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Lexer<'a> {
        let mut ci = input.bytes().enumerate();
        let current = ci.next();
        Lexer {
            input: input.as_bytes(),
            ci,
            current,
            flags_required: 0,
        }
    }

    // Numbers and arc flags look the same ("0" and "1"), so the lexer can't tell them
    // apart on its own.  Only the large-arc and sweep flags of an elliptical arc are
    // flags, and they always come in pairs.  The parser calls this right after it reads
    // an arc's x-axis rotation; the next two digits are then returned as Flag tokens,
    // even if they are not separated by whitespace or commas.
    pub fn require_flags(&mut self) {
        self.flags_required = 2;
    }

    fn current_pos(&self) -> usize {
        match self.current {
            None => self.input.len(),
            Some((pos, _)) => pos,
        }
    }

    fn peek_byte(&self) -> Option<u8> {
        self.current.map(|(_, c)| c)
    }

    fn advance(&mut self) {
        self.current = self.ci.next();
    }

    fn advance_while(&mut self, pred: impl Fn(u8) -> bool) -> bool {
        let mut found_some = false;
        while self.peek_byte().map_or(false, &pred) {
            found_some = true;
            self.advance();
        }
        found_some
    }

    fn advance_over_optional(&mut self, needle: u8) -> bool {
        if self.peek_byte() == Some(needle) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn advance_over_sign(&mut self) {
        let _ = self.advance_over_optional(b'-') || self.advance_over_optional(b'+');
    }

    fn advance_over_simple_number(&mut self) -> bool {
        self.advance_over_sign();
        let found_digit = self.advance_while(|c| c.is_ascii_digit());
        let _ = self.advance_over_optional(b'.');
        self.advance_while(|c| c.is_ascii_digit()) || found_digit
    }

    fn match_number(&mut self) -> Result<Token, LexError> {
        let start_pos = self.current_pos();

        if !self.advance_over_simple_number() && start_pos != self.current_pos() {
            return match self.peek_byte() {
                None => Err(LexError::UnexpectedEof),
                Some(c) => Err(LexError::UnexpectedByte(c)),
            };
        }

        if self.advance_over_optional(b'e') || self.advance_over_optional(b'E') {
            self.advance_over_sign();
            let _ = self.advance_while(|c| c.is_ascii_digit());
        }

        let end_pos = self.current_pos();

        // The range only contains ASCII digits, signs, dots and exponent markers, so it
        // is valid UTF-8; a malformed exponent is caught by the float parser.
        str::from_utf8(&self.input[start_pos..end_pos])
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .map(Number)
            .ok_or(LexError::ParseFloatError)
    }
}

impl Iterator for Lexer<'_> {
    type Item = (usize, Result<Token, LexError>);

    fn next(&mut self) -> Option<Self::Item> {
        let _ = self.advance_while(|c| c.is_ascii_whitespace());

        let (pos, c) = self.current?;

        let token = match c {
            b',' => {
                self.advance();
                Ok(Comma)
            }

            c if c.is_ascii_alphabetic() => {
                self.advance();
                Ok(Command(c))
            }

            b'0' | b'1' if self.flags_required > 0 => {
                self.flags_required -= 1;
                self.advance();
                Ok(Flag(c == b'1'))
            }

            c if self.flags_required > 0 && c.is_ascii_digit() => Err(LexError::UnexpectedByte(c)),

            c if c.is_ascii_digit() || c == b'-' || c == b'+' || c == b'.' => self.match_number(),

            c => {
                self.advance();
                Err(LexError::UnexpectedByte(c))
            }
        };

        Some((pos, token))
    }
}

/// The previous command's last control point, if it can be reflected.
#[derive(Debug, Copy, Clone)]
enum LastControl {
    None,
    Cubic((f64, f64)),
    Quadratic((f64, f64)),
}

/// Recursive descent parser for path data, as specified in
/// <https://www.w3.org/TR/SVG/paths.html#PathDataBNF>.
///
/// Some peculiarities:
///
/// - Commas are optional inside coordinate pairs, and between coordinate pairs.  So,
///   for example, these are equivalent:
///
///   `M 10 20 30 40`, `M 10, 20 30, 40`, `M 10, 20, 30, 40`
///
/// - Whitespace is optional when a sign or a second decimal point starts a new
///   number.  These are equivalent:
///
///   `M-10,20-30-40` and `M -10 20 -30 -40`
///
///   and so are these:
///
///   `M.1-2,3E2-4` and `M 0.1 -2 300 -4`
pub struct PathParser<'b> {
    tokens: Lexer<'b>,
    lookahead: Option<(usize, Result<Token, LexError>)>,

    stream: &'b mut PathStream,

    // Adjusted at every command
    current: (f64, f64),

    // Position of the last moveto; used for closepath.
    subpath_start: (f64, f64),

    last_control: LastControl,
}

impl<'b> PathParser<'b> {
    pub fn new(stream: &'b mut PathStream, path_str: &'b str) -> PathParser<'b> {
        let mut lexer = Lexer::new(path_str);
        let lookahead = lexer.next();
        PathParser {
            tokens: lexer,
            lookahead,

            stream,

            current: (0.0, 0.0),
            subpath_start: (0.0, 0.0),
            last_control: LastControl::None,
        }
    }

    // The match_* methods either consume the token we requested and return its value,
    // or return an error without advancing the token stream.  It is safe to use them to
    // probe for one kind of token, and then try another.

    fn expect<T>(&mut self, want: impl FnOnce(Token) -> Option<T>) -> Result<T, ParseError> {
        let result = match self.lookahead {
            Some((pos, Ok(t))) => want(t).ok_or(ParseError::new(pos, ErrorKind::UnexpectedToken(t))),
            Some((pos, Err(e))) => Err(ParseError::new(pos, ErrorKind::LexError(e))),
            None => Err(ParseError::new(self.tokens.input.len(), ErrorKind::UnexpectedEof)),
        };

        if result.is_ok() {
            self.lookahead = self.tokens.next();
        }

        result
    }

    fn match_command(&mut self) -> Result<u8, ParseError> {
        self.expect(|t| match t {
            Command(c) => Some(c),
            _ => None,
        })
    }

    fn match_number(&mut self) -> Result<f64, ParseError> {
        self.expect(|t| match t {
            Number(n) => Some(n),
            _ => None,
        })
    }

    fn match_flag(&mut self) -> Result<bool, ParseError> {
        self.expect(|t| match t {
            Flag(f) => Some(f),
            _ => None,
        })
    }

    fn match_comma(&mut self) -> Result<(), ParseError> {
        self.expect(|t| match t {
            Comma => Some(()),
            _ => None,
        })
    }

    fn eat_optional_comma(&mut self) {
        let _ = self.match_comma();
    }

    // Like match_number, but eats a leading comma if present.
    fn match_comma_number(&mut self) -> Result<f64, ParseError> {
        self.eat_optional_comma();
        self.match_number()
    }

    fn match_number_and_flags(&mut self) -> Result<(f64, bool, bool), ParseError> {
        // The lexer has to be told to look for flags *before* it advances past the
        // number, or it would lex the flag characters as part of a number.
        let n = match self.lookahead {
            Some((_, Ok(Number(n)))) => n,
            Some((pos, Ok(t))) => return Err(ParseError::new(pos, ErrorKind::UnexpectedToken(t))),
            Some((pos, Err(e))) => return Err(ParseError::new(pos, ErrorKind::LexError(e))),
            None => {
                return Err(ParseError::new(
                    self.tokens.input.len(),
                    ErrorKind::UnexpectedEof,
                ))
            }
        };

        self.tokens.require_flags();
        self.lookahead = self.tokens.next();

        self.eat_optional_comma();
        let large_arc = self.match_flag()?;

        self.eat_optional_comma();
        let sweep = self.match_flag()?;

        Ok((n, large_arc, sweep))
    }

    fn peek_command(&self) -> Option<u8> {
        match self.lookahead {
            Some((_, Ok(Command(c)))) => Some(c),
            _ => None,
        }
    }

    fn peek_number(&self) -> Option<f64> {
        match self.lookahead {
            Some((_, Ok(Number(n)))) => Some(n),
            _ => None,
        }
    }

    /// Parses the whole path data string.
    ///
    /// Commands are pushed to the stream as soon as they are parsed, so on error the
    /// stream keeps everything up to the offending command.
    pub fn parse(&mut self) -> Result<(), ParseError> {
        while self.lookahead.is_some() {
            self.moveto()?;
            while self.drawto_command()? {}
        }

        Ok(())
    }

    fn error(&self, kind: ErrorKind) -> ParseError {
        let position = match self.lookahead {
            Some((pos, _)) => pos,
            None => self.tokens.input.len(),
        };

        ParseError { position, kind }
    }

    fn coordinate_pair(&mut self) -> Result<(f64, f64), ParseError> {
        Ok((self.match_number()?, self.match_comma_number()?))
    }

    fn resolve(&self, absolute: bool, (x, y): (f64, f64)) -> (f64, f64) {
        if absolute {
            (x, y)
        } else {
            (x + self.current.0, y + self.current.1)
        }
    }

    fn reflect(&self, control: Option<(f64, f64)>) -> (f64, f64) {
        let (cx, cy) = self.current;

        match control {
            Some((x, y)) => (cx + cx - x, cy + cy - y),
            None => self.current,
        }
    }

    fn emit_move_to(&mut self, to: (f64, f64)) {
        self.current = to;
        self.subpath_start = to;
        self.last_control = LastControl::None;

        self.stream.move_to(to.0, to.1);
    }

    fn emit_line_to(&mut self, to: (f64, f64)) {
        self.current = to;
        self.last_control = LastControl::None;

        self.stream.line_to(to.0, to.1);
    }

    fn emit_curve_to(&mut self, c1: (f64, f64), c2: (f64, f64), to: (f64, f64)) {
        self.current = to;
        self.last_control = LastControl::Cubic(c2);

        self.stream.curve_to(c1.0, c1.1, c2.0, c2.1, to.0, to.1);
    }

    fn emit_quad_to(&mut self, ctrl: (f64, f64), to: (f64, f64)) {
        self.current = to;
        self.last_control = LastControl::Quadratic(ctrl);

        self.stream.quad_to(ctrl.0, ctrl.1, to.0, to.1);
    }

    fn emit_arc(&mut self, arc: EllipticalArc) {
        let to = arc.to;

        match arc.center_parameterization() {
            ArcParameterization::CenterParameters(center) => self.stream.center_arc(&center),
            ArcParameterization::LineTo => self.stream.line_to(to.0, to.1),
            ArcParameterization::Omit => (),
        }

        self.current = to;
        self.last_control = LastControl::None;
    }

    fn emit_close_path(&mut self) {
        self.current = self.subpath_start;
        self.last_control = LastControl::None;

        self.stream.close_path();
    }

    fn moveto(&mut self) -> Result<(), ParseError> {
        let absolute = self.expect(|t| match t {
            Command(b'M') => Some(true),
            Command(b'm') => Some(false),
            _ => None,
        })?;

        let to = self.coordinate_pair()?;
        let to = self.resolve(absolute, to);
        self.emit_move_to(to);

        // Extra coordinate pairs after a moveto are implicit linetos.
        if self.match_comma().is_ok() || self.peek_number().is_some() {
            self.lineto_argument_sequence(absolute)
        } else {
            Ok(())
        }
    }

    /// Parses one drawto command and its arguments; returns false if the next token
    /// does not start one.
    fn drawto_command(&mut self) -> Result<bool, ParseError> {
        let c = match self.peek_command() {
            Some(c) if !matches!(c, b'M' | b'm') => c,
            _ => return Ok(false),
        };

        let (cmd, absolute) = (c.to_ascii_uppercase(), c.is_ascii_uppercase());

        if !b"ZLHVCSQTA".contains(&cmd) {
            return Err(self.error(ErrorKind::UnexpectedCommand(c)));
        }

        self.match_command()?;

        match cmd {
            b'Z' => self.emit_close_path(),
            b'L' => self.lineto_argument_sequence(absolute)?,
            b'H' => self.horizontal_lineto_argument_sequence(absolute)?,
            b'V' => self.vertical_lineto_argument_sequence(absolute)?,
            b'C' => self.curveto_argument_sequence(absolute)?,
            b'S' => self.smooth_curveto_argument_sequence(absolute)?,
            b'Q' => self.quadratic_curveto_argument_sequence(absolute)?,
            b'T' => self.smooth_quadratic_curveto_argument_sequence(absolute)?,
            b'A' => self.elliptical_arc_argument_sequence(absolute)?,
            _ => unreachable!("checked above"),
        }

        Ok(true)
    }

    fn should_break_arg_sequence(&mut self) -> bool {
        if self.match_comma().is_ok() {
            // A comma means that another group of arguments must follow.
            false
        } else {
            self.peek_number().is_none()
        }
    }

    /// Runs `parse_one` for each group of arguments after a command letter.
    fn argument_sequence(
        &mut self,
        mut parse_one: impl FnMut(&mut Self) -> Result<(), ParseError>,
    ) -> Result<(), ParseError> {
        loop {
            parse_one(self)?;

            if self.should_break_arg_sequence() {
                return Ok(());
            }
        }
    }

    fn lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let to = p.coordinate_pair()?;
            let to = p.resolve(absolute, to);
            p.emit_line_to(to);
            Ok(())
        })
    }

    fn horizontal_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let mut x = p.match_number()?;
            if !absolute {
                x += p.current.0;
            }
            p.emit_line_to((x, p.current.1));
            Ok(())
        })
    }

    fn vertical_lineto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let mut y = p.match_number()?;
            if !absolute {
                y += p.current.1;
            }
            p.emit_line_to((p.current.0, y));
            Ok(())
        })
    }

    fn curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let c1 = p.coordinate_pair()?;
            p.eat_optional_comma();
            let c2 = p.coordinate_pair()?;
            p.eat_optional_comma();
            let to = p.coordinate_pair()?;

            let (c1, c2, to) = (
                p.resolve(absolute, c1),
                p.resolve(absolute, c2),
                p.resolve(absolute, to),
            );
            p.emit_curve_to(c1, c2, to);
            Ok(())
        })
    }

    fn smooth_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let c2 = p.coordinate_pair()?;
            p.eat_optional_comma();
            let to = p.coordinate_pair()?;

            let c1 = match p.last_control {
                LastControl::Cubic(c) => p.reflect(Some(c)),
                _ => p.reflect(None),
            };

            let (c2, to) = (p.resolve(absolute, c2), p.resolve(absolute, to));
            p.emit_curve_to(c1, c2, to);
            Ok(())
        })
    }

    fn quadratic_curveto_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let ctrl = p.coordinate_pair()?;
            p.eat_optional_comma();
            let to = p.coordinate_pair()?;

            let (ctrl, to) = (p.resolve(absolute, ctrl), p.resolve(absolute, to));
            p.emit_quad_to(ctrl, to);
            Ok(())
        })
    }

    fn smooth_quadratic_curveto_argument_sequence(
        &mut self,
        absolute: bool,
    ) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let to = p.coordinate_pair()?;

            let ctrl = match p.last_control {
                LastControl::Quadratic(c) => p.reflect(Some(c)),
                _ => p.reflect(None),
            };

            let to = p.resolve(absolute, to);
            p.emit_quad_to(ctrl, to);
            Ok(())
        })
    }

    fn elliptical_arc_argument_sequence(&mut self, absolute: bool) -> Result<(), ParseError> {
        self.argument_sequence(|p| {
            let rx = p.match_number()?.abs();
            let ry = p.match_comma_number()?.abs();

            p.eat_optional_comma();
            let (x_axis_rotation, large_arc, sweep) = p.match_number_and_flags()?;

            p.eat_optional_comma();
            let to = p.coordinate_pair()?;
            let to = p.resolve(absolute, to);

            p.emit_arc(EllipticalArc {
                r: (rx, ry),
                x_axis_rotation,
                large_arc: LargeArc(large_arc),
                sweep: if sweep { Sweep::Positive } else { Sweep::Negative },
                from: p.current,
                to,
            });
            Ok(())
        })
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum ErrorKind {
    UnexpectedToken(Token),
    UnexpectedCommand(u8),
    UnexpectedEof,
    LexError(LexError),
}

/// Error from parsing path data, with the byte offset where it happened.
#[derive(Debug, PartialEq, Clone)]
pub struct ParseError {
    pub position: usize,
    pub kind: ErrorKind,
}

impl ParseError {
    fn new(position: usize, kind: ErrorKind) -> ParseError {
        ParseError { position, kind }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self.kind {
            ErrorKind::UnexpectedToken(_) => "unexpected token",
            ErrorKind::UnexpectedCommand(_) => "unexpected command",
            ErrorKind::UnexpectedEof => "unexpected end of data",
            ErrorKind::LexError(_) => "error processing token",
        };
        write!(f, "error at position {}: {}", self.position, description)
    }
}

impl std::error::Error for ParseError {}
