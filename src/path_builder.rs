//! Representation of paths as a stream of drawing commands.
//!
//! A [`PathStream`] is the outline of one shape.  The shape's build routine (or the path
//! data parser) pushes commands into it; afterwards the stream can be replayed into any
//! [`PathSink`], iterated as long-form [`PathCommand`] values, or handed to the geometric
//! queries and the morphing code.
//!
//! Commands and their coordinates are stored separately, in two dense arrays.  The
//! command array is a [`TinyVec`] with space for 32 commands inline, since most shapes
//! need fewer than that.
//!
//! Every mutation bumps [`PathStream::version`], so that consumers which cache data derived
//! from a stream can detect that their cache is stale.

use tinyvec::TinyVec;

use std::f64::consts::*;

use crate::bezier::{CenterArc, CubicBezierCurve};
use crate::error::StreamError;
use crate::path_parser::{ParseError, PathParser};
use crate::vg_log;

/// Long-form version of a single path command.
///
/// This is returned from [`PathStream::iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(CubicBezierCurve),
    QuadTo { ctrl: (f64, f64), to: (f64, f64) },
    Arc(CenterArc),
    Rect { x: f64, y: f64, width: f64, height: f64 },
    ClosePath,
}

impl PathCommand {
    /// Consumes a packed command's coordinates and returns the rehydrated `PathCommand`.
    ///
    /// `c` must have exactly `packed.num_coordinates()` elements.
    fn from_packed(packed: PackedCommand, c: &[f64]) -> PathCommand {
        match packed {
            PackedCommand::MoveTo => PathCommand::MoveTo(c[0], c[1]),

            PackedCommand::LineTo => PathCommand::LineTo(c[0], c[1]),

            PackedCommand::CurveTo => PathCommand::CurveTo(CubicBezierCurve {
                pt1: (c[0], c[1]),
                pt2: (c[2], c[3]),
                to: (c[4], c[5]),
            }),

            PackedCommand::QuadTo => PathCommand::QuadTo {
                ctrl: (c[0], c[1]),
                to: (c[2], c[3]),
            },

            PackedCommand::Arc => PathCommand::Arc(CenterArc {
                center: (c[0], c[1]),
                radii: (c[2], c[3]),
                start: c[4],
                delta: c[5],
                rotation: c[6],
            }),

            PackedCommand::Rect => PathCommand::Rect {
                x: c[0],
                y: c[1],
                width: c[2],
                height: c[3],
            },

            PackedCommand::ClosePath => PathCommand::ClosePath,
        }
    }
}

/// Packed tag of a command in a [`PathStream`].
///
/// This is `repr(u8)` to keep it as small as possible; the discriminants are also the tags
/// accepted by [`PathStream::append`].
#[repr(u8)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PackedCommand {
    #[default]
    MoveTo = 0,
    LineTo = 1,
    CurveTo = 2,
    QuadTo = 3,
    /// `cx, cy, rx, ry, start, delta, rotation, anticlockwise`
    Arc = 4,
    Rect = 5,
    ClosePath = 6,
}

impl PackedCommand {
    /// Returns the number of coordinate values that this command stores.
    pub fn num_coordinates(self) -> usize {
        match self {
            PackedCommand::MoveTo => 2,
            PackedCommand::LineTo => 2,
            PackedCommand::CurveTo => 6,
            PackedCommand::QuadTo => 4,
            PackedCommand::Arc => 8,
            PackedCommand::Rect => 4,
            PackedCommand::ClosePath => 0,
        }
    }

    /// Single-letter name, used in error messages.
    pub fn letter(self) -> char {
        match self {
            PackedCommand::MoveTo => 'M',
            PackedCommand::LineTo => 'L',
            PackedCommand::CurveTo => 'C',
            PackedCommand::QuadTo => 'Q',
            PackedCommand::Arc => 'A',
            PackedCommand::Rect => 'R',
            PackedCommand::ClosePath => 'Z',
        }
    }
}

impl TryFrom<u8> for PackedCommand {
    type Error = StreamError;

    fn try_from(tag: u8) -> Result<PackedCommand, StreamError> {
        match tag {
            0 => Ok(PackedCommand::MoveTo),
            1 => Ok(PackedCommand::LineTo),
            2 => Ok(PackedCommand::CurveTo),
            3 => Ok(PackedCommand::QuadTo),
            4 => Ok(PackedCommand::Arc),
            5 => Ok(PackedCommand::Rect),
            6 => Ok(PackedCommand::ClosePath),
            _ => Err(StreamError::UnexpectedTag(tag)),
        }
    }
}

/// The drawing vocabulary that a [`PathStream`] can be replayed into.
///
/// Painting backends implement this; so does [`PathStream`] itself, and the SVG
/// serializer in [`crate::path_writer`].
///
/// Angles are in radians.  With the y axis pointing down, increasing angles go clockwise
/// on screen; `anticlockwise` selects the opposite direction.
pub trait PathSink {
    fn move_to(&mut self, x: f64, y: f64);

    fn line_to(&mut self, x: f64, y: f64);

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64);

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64);

    fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    );

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn close_path(&mut self);
}

/// Signed sweep of a canvas-style arc from `start` to `end`.
///
/// A sweep of a full turn or more in the drawing direction is clamped to exactly one
/// turn; anything else is reduced to the equivalent sweep in `(-2π, 2π)` that goes in the
/// drawing direction.
pub fn arc_sweep(start: f64, end: f64, anticlockwise: bool) -> f64 {
    let full = PI * 2.0;

    if !anticlockwise {
        let delta = end - start;
        if delta >= full {
            full
        } else {
            delta.rem_euclid(full)
        }
    } else {
        let delta = start - end;
        if delta >= full {
            -full
        } else {
            -delta.rem_euclid(full)
        }
    }
}

/// Checks that raw arc operands replay through [`PathSink::ellipse`] as the same arc.
///
/// The sweep is rebuilt from `start`, `start + delta` and the direction flag with
/// [`arc_sweep`], so the sign of `delta` must agree with the flag, and the sweep cannot
/// exceed a full turn.
fn check_raw_arc(arc: &CenterArc, anticlockwise: bool) -> Result<(), StreamError> {
    if arc.radii.0 < 0.0 || arc.radii.1 < 0.0 {
        return Err(StreamError::InvalidArc("negative radius"));
    }

    if arc.delta.abs() > PI * 2.0 {
        return Err(StreamError::InvalidArc("sweep larger than a full turn"));
    }

    if arc.delta != 0.0 && (arc.delta < 0.0) != anticlockwise {
        return Err(StreamError::InvalidArc("sweep disagrees with direction flag"));
    }

    Ok(())
}

/// Ordered sequence of drawing commands for one shape's outline.
///
/// Create this with [`PathStream::new`] or `PathStream::default()`; it yields an empty
/// stream.  Commands can only be appended; [`PathStream::reset`] clears everything.
///
/// The stream tracks the current point and the start of the current subpath.  After a
/// `ClosePath`, the current point goes back to the start of the subpath, and further
/// drawing continues from there until the next `MoveTo`.  Drawing commands issued with no
/// current point start a new subpath, as in a canvas 2D context.
///
/// Commands with non-finite operands are dropped instead of being recorded, and counted
/// in [`PathStream::dropped_segments`].
#[derive(Debug, Clone, Default)]
pub struct PathStream {
    commands: TinyVec<[PackedCommand; 32]>,
    coords: Vec<f64>,
    version: u64,
    current: Option<(f64, f64)>,
    subpath_start: (f64, f64),
    dropped_segments: usize,
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl PathStream {
    pub fn new() -> PathStream {
        PathStream::default()
    }

    /// Creates a stream from SVG path data.
    ///
    /// On error, the stream contains the commands that were parsed successfully
    /// before the error.
    pub fn from_path_data(path_str: &str) -> (PathStream, Result<(), ParseError>) {
        let mut stream = PathStream::new();
        let res = stream.parse(path_str);
        (stream, res)
    }

    /// Appends the commands from SVG path data to this stream.
    pub fn parse(&mut self, path_str: &str) -> Result<(), ParseError> {
        let mut parser = PathParser::new(self, path_str);
        parser.parse()
    }

    /// Counter that increases on every mutation of the stream.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of commands in the stream.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The point where the next command will start from, if any.
    pub fn current_point(&self) -> Option<(f64, f64)> {
        self.current
    }

    /// The start of the current subpath; `ClosePath` returns here.
    pub fn subpath_start(&self) -> (f64, f64) {
        self.subpath_start
    }

    /// Number of commands that were dropped because they had non-finite operands.
    pub fn dropped_segments(&self) -> usize {
        self.dropped_segments
    }

    /// Removes all commands.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.coords.clear();
        self.current = None;
        self.subpath_start = (0.0, 0.0);
        self.dropped_segments = 0;
        self.bump_version();
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn push(&mut self, cmd: PackedCommand, coords: &[f64]) {
        debug_assert_eq!(cmd.num_coordinates(), coords.len());

        self.commands.push(cmd);
        self.coords.extend_from_slice(coords);
        self.bump_version();
    }

    fn drop_segment(&mut self, cmd: PackedCommand, coords: &[f64]) -> bool {
        if all_finite(coords) {
            false
        } else {
            vg_log!(
                "dropping path command {} with non-finite operands {:?}",
                cmd.letter(),
                coords
            );
            self.dropped_segments += 1;
            true
        }
    }

    /// Starts a subpath at `(x, y)` if there is no current point.
    fn ensure_subpath(&mut self, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x, y);
        }
    }

    /// Adds a MoveTo command to the path.
    pub fn move_to(&mut self, x: f64, y: f64) {
        if self.drop_segment(PackedCommand::MoveTo, &[x, y]) {
            return;
        }

        self.push(PackedCommand::MoveTo, &[x, y]);
        self.current = Some((x, y));
        self.subpath_start = (x, y);
    }

    /// Adds a LineTo command to the path.
    pub fn line_to(&mut self, x: f64, y: f64) {
        if self.drop_segment(PackedCommand::LineTo, &[x, y]) {
            return;
        }

        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }

        self.push(PackedCommand::LineTo, &[x, y]);
        self.current = Some((x, y));
    }

    /// Adds a cubic CurveTo command to the path.
    pub fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let coords = [x1, y1, x2, y2, x, y];
        if self.drop_segment(PackedCommand::CurveTo, &coords) {
            return;
        }

        self.ensure_subpath(x1, y1);
        self.push(PackedCommand::CurveTo, &coords);
        self.current = Some((x, y));
    }

    /// Adds a quadratic curve command to the path.
    pub fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        let coords = [x1, y1, x, y];
        if self.drop_segment(PackedCommand::QuadTo, &coords) {
            return;
        }

        self.ensure_subpath(x1, y1);
        self.push(PackedCommand::QuadTo, &coords);
        self.current = Some((x, y));
    }

    /// Adds a circular arc, with canvas 2D semantics.
    pub fn arc(&mut self, cx: f64, cy: f64, r: f64, start: f64, end: f64, anticlockwise: bool) {
        self.ellipse(cx, cy, r, r, 0.0, start, end, anticlockwise);
    }

    /// Adds an elliptical arc, with canvas 2D semantics.
    ///
    /// If there is a current point, the arc is implicitly connected to it with a straight
    /// line; that line is not recorded as a separate command.
    pub fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) {
        if self.drop_segment(PackedCommand::Arc, &[cx, cy, rx, ry, rotation, start, end]) {
            return;
        }

        if rx < 0.0 || ry < 0.0 {
            vg_log!("dropping arc with negative radii ({}, {})", rx, ry);
            self.dropped_segments += 1;
            return;
        }

        let arc = CenterArc {
            center: (cx, cy),
            radii: (rx, ry),
            start,
            delta: arc_sweep(start, end, anticlockwise),
            rotation,
        };

        self.push_arc(&arc, anticlockwise);
    }

    /// Adds an arc given in center parameterization.
    ///
    /// The drawing direction is taken from the sign of `arc.delta`.
    pub fn center_arc(&mut self, arc: &CenterArc) {
        if !arc.is_finite() || arc.radii.0 < 0.0 || arc.radii.1 < 0.0 {
            vg_log!("dropping invalid arc {:?}", arc);
            self.dropped_segments += 1;
            return;
        }

        self.push_arc(arc, arc.delta < 0.0);
    }

    fn push_arc(&mut self, arc: &CenterArc, anticlockwise: bool) {
        let start_point = arc.start_point();
        self.ensure_subpath(start_point.0, start_point.1);

        let flag = if anticlockwise { 1.0 } else { 0.0 };

        self.push(
            PackedCommand::Arc,
            &[
                arc.center.0,
                arc.center.1,
                arc.radii.0,
                arc.radii.1,
                arc.start,
                arc.delta,
                arc.rotation,
                flag,
            ],
        );
        self.current = Some(arc.end_point());
    }

    /// Adds a closed rectangular subpath.
    ///
    /// Afterwards, both the current point and the subpath start are at `(x, y)`.
    pub fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let coords = [x, y, width, height];
        if self.drop_segment(PackedCommand::Rect, &coords) {
            return;
        }

        self.push(PackedCommand::Rect, &coords);
        self.current = Some((x, y));
        self.subpath_start = (x, y);
    }

    /// Adds a ClosePath command to the path.
    ///
    /// This is a no-op on an empty stream.
    pub fn close_path(&mut self) {
        if self.is_empty() {
            return;
        }

        self.push(PackedCommand::ClosePath, &[]);
        self.current = Some(self.subpath_start);
    }

    /// Appends a command given as a raw tag and its operands.
    ///
    /// The tag is one of the [`PackedCommand`] discriminants.  Returns an error, and leaves
    /// the stream unchanged, if the tag is unknown or the number of operands is wrong.
    pub fn append(&mut self, tag: u8, operands: &[f64]) -> Result<(), StreamError> {
        let cmd = PackedCommand::try_from(tag)?;

        let expected = cmd.num_coordinates();
        if operands.len() != expected {
            return Err(StreamError::OperandCount {
                command: cmd.letter(),
                expected,
                got: operands.len(),
            });
        }

        let o = operands;

        match cmd {
            PackedCommand::MoveTo => self.move_to(o[0], o[1]),
            PackedCommand::LineTo => self.line_to(o[0], o[1]),
            PackedCommand::CurveTo => self.curve_to(o[0], o[1], o[2], o[3], o[4], o[5]),
            PackedCommand::QuadTo => self.quad_to(o[0], o[1], o[2], o[3]),
            PackedCommand::Arc => {
                if !self.drop_segment(cmd, o) {
                    let arc = CenterArc {
                        center: (o[0], o[1]),
                        radii: (o[2], o[3]),
                        start: o[4],
                        delta: o[5],
                        rotation: o[6],
                    };
                    let anticlockwise = o[7] != 0.0;
                    check_raw_arc(&arc, anticlockwise)?;
                    self.push_arc(&arc, anticlockwise);
                }
            }
            PackedCommand::Rect => self.rect(o[0], o[1], o[2], o[3]),
            PackedCommand::ClosePath => self.close_path(),
        }

        Ok(())
    }

    /// Get an iterator over the stream's commands.
    pub fn iter(&self) -> impl Iterator<Item = PathCommand> + '_ {
        let mut offset = 0;

        self.commands.iter().map(move |&cmd| {
            let n = cmd.num_coordinates();
            let coords = &self.coords[offset..offset + n];
            offset += n;
            PathCommand::from_packed(cmd, coords)
        })
    }

    /// Get an iterator over the raw tags and operands of the stream's commands.
    pub fn iter_raw(&self) -> impl Iterator<Item = (PackedCommand, &[f64])> + '_ {
        let mut offset = 0;

        self.commands.iter().map(move |&cmd| {
            let n = cmd.num_coordinates();
            let coords = &self.coords[offset..offset + n];
            offset += n;
            (cmd, coords)
        })
    }

    /// Issues every command of the stream into `sink`, in order.
    pub fn replay<S: PathSink + ?Sized>(&self, sink: &mut S) {
        for (cmd, c) in self.iter_raw() {
            match cmd {
                PackedCommand::MoveTo => sink.move_to(c[0], c[1]),
                PackedCommand::LineTo => sink.line_to(c[0], c[1]),
                PackedCommand::CurveTo => sink.curve_to(c[0], c[1], c[2], c[3], c[4], c[5]),
                PackedCommand::QuadTo => sink.quad_to(c[0], c[1], c[2], c[3]),
                PackedCommand::Arc => {
                    sink.ellipse(c[0], c[1], c[2], c[3], c[6], c[4], c[4] + c[5], c[7] != 0.0)
                }
                PackedCommand::Rect => sink.rect(c[0], c[1], c[2], c[3]),
                PackedCommand::ClosePath => sink.close_path(),
            }
        }
    }
}

impl PathSink for PathStream {
    fn move_to(&mut self, x: f64, y: f64) {
        PathStream::move_to(self, x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        PathStream::line_to(self, x, y);
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        PathStream::curve_to(self, x1, y1, x2, y2, x, y);
    }

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        PathStream::quad_to(self, x1, y1, x, y);
    }

    fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
        start: f64,
        end: f64,
        anticlockwise: bool,
    ) {
        PathStream::ellipse(self, cx, cy, rx, ry, rotation, start, end, anticlockwise);
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        PathStream::rect(self, x, y, width, height);
    }

    fn close_path(&mut self) {
        PathStream::close_path(self);
    }
}
