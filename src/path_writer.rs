//! Serialization of paths to SVG path data.
//!
//! [`SvgPathWriter`] is a [`PathSink`], so any [`PathStream`] can be written out by
//! replaying it:
//!
//! ```
//! use vgkernel::path_builder::PathStream;
//! use vgkernel::path_writer::{SvgPathWriter, WriterOptions};
//!
//! let mut stream = PathStream::new();
//! stream.move_to(0.0, 0.0);
//! stream.line_to(10.0, 0.5);
//! stream.close_path();
//!
//! let mut writer = SvgPathWriter::new(WriterOptions::default());
//! stream.replay(&mut writer);
//! assert_eq!(writer.finish(), "M0 0L10 0.5Z");
//! ```
//!
//! Numbers are rounded to a fixed number of decimals to keep the output small.  Shapes
//! drawn at a large scale need more decimals to keep their detail; use
//! [`precision_for_scale`] to pick a precision from the scale the path will be shown at.

use std::f64::consts::*;
use std::fmt::Write;

use crate::bezier::CenterArc;
use crate::float_eq::points_approx_eq;
use crate::path_builder::{arc_sweep, PathSink, PathStream};
use crate::util::round_to;

/// Decimals used when the path is drawn at a scale of 1.
pub const DEFAULT_PRECISION: u32 = 4;

const MAX_PRECISION: u32 = 12;

/// Sweeps closer than this to a full turn are written as full ellipses.
const FULL_TURN_EPSILON: f64 = 1e-4;

/// Returns the number of decimals needed to show a path drawn at `scale` without
/// visible rounding.
///
/// Each tenfold increase in scale adds one decimal.
pub fn precision_for_scale(scale: f64) -> u32 {
    if !scale.is_finite() || scale <= 0.0 {
        return DEFAULT_PRECISION;
    }

    let extra = scale.log10().ceil();
    let precision = DEFAULT_PRECISION as f64 + extra;

    precision.max(0.0).min(MAX_PRECISION as f64) as u32
}

/// Options for [`SvgPathWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriterOptions {
    precision: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl WriterOptions {
    pub fn new() -> Self {
        WriterOptions::default()
    }

    /// Sets the number of decimals for the output numbers.
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision.min(MAX_PRECISION);
        self
    }

    /// Picks the precision with [`precision_for_scale`].
    pub fn with_scale(self, scale: f64) -> Self {
        self.with_precision(precision_for_scale(scale))
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }
}

/// A [`PathSink`] that produces the value of an SVG `d` attribute.
///
/// All commands are written in absolute form.  Arcs become SVG `A` commands, with full
/// ellipses split in two halves since a single `A` cannot describe a closed ellipse.
/// Rectangles become closed subpaths of lines.
#[derive(Debug, Clone)]
pub struct SvgPathWriter {
    out: String,
    precision: u32,
    current: Option<(f64, f64)>,
    subpath_start: (f64, f64),
}

impl SvgPathWriter {
    pub fn new(options: WriterOptions) -> SvgPathWriter {
        SvgPathWriter {
            out: String::new(),
            precision: options.precision,
            current: None,
            subpath_start: (0.0, 0.0),
        }
    }

    /// The path data written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(self) -> String {
        self.out
    }

    fn command(&mut self, letter: char, operands: &[f64]) {
        self.out.push(letter);

        for (i, v) in operands.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            // Writing to a String cannot fail.
            let _ = write!(self.out, "{}", round_to(*v, self.precision));
        }
    }

    /// Moves to `p`, or draws a line to it if the current point is elsewhere.
    fn connect_to(&mut self, p: (f64, f64)) {
        match self.current {
            None => self.move_to(p.0, p.1),
            Some(current) if !points_approx_eq(current, p) => self.line_to(p.0, p.1),
            Some(_) => (),
        }
    }

    fn svg_arc(&mut self, arc: &CenterArc, from: f64, delta: f64) {
        let to = arc.point_at(from + delta);
        let large_arc = if delta.abs() > PI { 1.0 } else { 0.0 };
        let sweep = if delta > 0.0 { 1.0 } else { 0.0 };

        self.command(
            'A',
            &[
                arc.radii.0,
                arc.radii.1,
                arc.rotation.to_degrees(),
                large_arc,
                sweep,
                to.0,
                to.1,
            ],
        );
        self.current = Some(to);
    }
}

impl PathSink for SvgPathWriter {
    fn move_to(&mut self, x: f64, y: f64) {
        self.command('M', &[x, y]);
        self.current = Some((x, y));
        self.subpath_start = (x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }

        self.command('L', &[x, y]);
        self.current = Some((x, y));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x1, y1);
        }

        self.command('C', &[x1, y1, x2, y2, x, y]);
        self.current = Some((x, y));
    }

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        if self.current.is_none() {
            self.move_to(x1, y1);
        }

        self.command('Q', &[x1, y1, x, y]);
        self.current = Some((x, y));
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
        let delta = arc_sweep(start, end, anticlockwise);
        let arc = CenterArc {
            center: (cx, cy),
            radii: (rx, ry),
            start,
            delta,
            rotation,
        };

        self.connect_to(arc.start_point());

        if delta == 0.0 {
            return;
        }

        if (delta.abs() - 2.0 * PI).abs() < FULL_TURN_EPSILON {
            let half = delta / 2.0;
            self.svg_arc(&arc, start, half);
            self.svg_arc(&arc, start + half, half);
        } else {
            self.svg_arc(&arc, start, delta);
        }
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.move_to(x, y);
        self.command('H', &[x + width]);
        self.command('V', &[y + height]);
        self.command('H', &[x]);
        self.close_path();
    }

    fn close_path(&mut self) {
        if self.current.is_none() {
            return;
        }

        self.out.push('Z');
        self.current = Some(self.subpath_start);
    }
}

/// Serializes a whole stream to SVG path data.
pub fn to_path_data(stream: &PathStream, options: WriterOptions) -> String {
    let mut writer = SvgPathWriter::new(options);
    stream.replay(&mut writer);
    writer.finish()
}
