//! Point containment tests.
//!
//! Each primitive kind has a closed-form test.  Arbitrary paths are flattened into
//! polylines first, and then tested with a fill rule; stroked geometry is tested by
//! distance to the flattened segments.
//!
//! All tests are inclusive: points on the boundary of a shape are inside it.

use crate::angle::Angle;
use crate::bezier::{cubic_at, quadratic_at, CubicBezierCurve};
use crate::float_eq::POINT_EPSILON;
use crate::path_builder::{arc_sweep, PathCommand, PathStream};
use crate::rect::Rect;

/// Maximum distance between a curve and its flattened polyline.
pub const FLATTEN_TOLERANCE: f64 = 0.1;

/// Upper bound for the number of lines a single curve is flattened into.
const MAX_FLATTEN_SEGMENTS: usize = 256;

/// How overlapping subpaths decide what is inside a path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    NonZero,
    #[default]
    EvenOdd,
}

impl FillRule {
    fn is_inside(self, winding: i32, crossings: u32) -> bool {
        match self {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => crossings % 2 == 1,
        }
    }
}

pub fn contains_rect(rect: &Rect, x: f64, y: f64) -> bool {
    rect.contains(x, y)
}

pub fn contains_circle(cx: f64, cy: f64, r: f64, x: f64, y: f64) -> bool {
    let (dx, dy) = (x - cx, y - cy);
    dx * dx + dy * dy <= r * r
}

pub fn contains_ellipse(cx: f64, cy: f64, rx: f64, ry: f64, x: f64, y: f64) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }

    let (dx, dy) = ((x - cx) / rx, (y - cy) / ry);
    dx * dx + dy * dy <= 1.0
}

/// Tests a point against an annular sector.
///
/// The sector covers the radii in `[r0, r]` and the angles swept from `start` to `end`,
/// in radians, in the increasing direction if `clockwise` is true.  Angles are measured
/// from the positive x axis; with the y axis pointing down, increasing angles go
/// clockwise on screen.  A sweep of a full turn or more is a ring.
#[allow(clippy::too_many_arguments)]
pub fn contains_sector(
    cx: f64,
    cy: f64,
    r0: f64,
    r: f64,
    start: f64,
    end: f64,
    clockwise: bool,
    x: f64,
    y: f64,
) -> bool {
    let (dx, dy) = (x - cx, y - cy);
    let d2 = dx * dx + dy * dy;

    if d2 > r * r || (r0 > 0.0 && d2 < r0 * r0) {
        return false;
    }

    if d2 == 0.0 {
        // The apex; it has no angle.
        return r0 <= 0.0;
    }

    let sweep = arc_sweep(start, end, !clockwise);
    if sweep.abs() >= 2.0 * std::f64::consts::PI {
        return true;
    }

    let angle = Angle::from_vector(dx, dy);
    let start = Angle::new(start);

    if sweep >= 0.0 {
        angle.positive_distance_from(start) <= sweep
    } else {
        start.positive_distance_from(angle) <= -sweep
    }
}

/// Squared distance from `(x, y)` to the segment from `a` to `b`.
fn distance_to_segment_squared(a: (f64, f64), b: (f64, f64), x: f64, y: f64) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let (wx, wy) = (x - a.0, y - a.1);
    let len2 = vx * vx + vy * vy;

    let t = if len2 == 0.0 {
        0.0
    } else {
        ((wx * vx + wy * vy) / len2).max(0.0).min(1.0)
    };

    let (px, py) = (a.0 + t * vx - x, a.1 + t * vy - y);
    px * px + py * py
}

/// Whether a point is within `line_width / 2` of the segment from `(x0, y0)` to `(x1, y1)`.
#[allow(clippy::too_many_arguments)]
pub fn on_line_stroke(x0: f64, y0: f64, x1: f64, y1: f64, line_width: f64, x: f64, y: f64) -> bool {
    let half = line_width / 2.0;

    if half <= 0.0 {
        return false;
    }

    // Cheap rejection before the distance computation.
    let bounds = Rect::from_origin_size(x0, y0, x1 - x0, y1 - y0).outset(half);
    if !bounds.contains(x, y) {
        return false;
    }

    distance_to_segment_squared((x0, y0), (x1, y1), x, y) <= half * half
}

/// Whether a point is within `line_width / 2` of any segment of an open polyline.
pub fn on_polyline_stroke(points: &[(f64, f64)], line_width: f64, x: f64, y: f64) -> bool {
    points
        .windows(2)
        .any(|w| on_line_stroke(w[0].0, w[0].1, w[1].0, w[1].1, line_width, x, y))
}

fn on_boundary(points: &[(f64, f64)], closed: bool, x: f64, y: f64) -> bool {
    let eps2 = POINT_EPSILON * POINT_EPSILON;

    edges(points, closed).any(|(a, b)| distance_to_segment_squared(a, b, x, y) <= eps2)
}

fn edges(
    points: &[(f64, f64)],
    closed: bool,
) -> impl Iterator<Item = ((f64, f64), (f64, f64))> + '_ {
    let closing = match (closed, points.first(), points.last()) {
        (true, Some(&first), Some(&last)) if points.len() > 1 => Some((last, first)),
        _ => None,
    };

    points.windows(2).map(|w| (w[0], w[1])).chain(closing)
}

/// Accumulates the crossings of a ray going from `(x, y)` towards positive x.
///
/// An edge is crossed if one of its ends is strictly above the ray and the other one is
/// not; this counts a vertex on the ray once, and ignores horizontal edges.
fn accumulate_crossings(
    points: &[(f64, f64)],
    x: f64,
    y: f64,
    winding: &mut i32,
    crossings: &mut u32,
) {
    for (a, b) in edges(points, true) {
        if (a.1 > y) == (b.1 > y) {
            continue;
        }

        let x_at_y = a.0 + (y - a.1) * (b.0 - a.0) / (b.1 - a.1);
        if x < x_at_y {
            *crossings += 1;
            *winding += if b.1 > a.1 { 1 } else { -1 };
        }
    }
}

/// Even-odd test of a point against a closed polygon.
///
/// Points on an edge or a vertex are inside.
pub fn contains_polygon(points: &[(f64, f64)], x: f64, y: f64) -> bool {
    if points.len() < 3 {
        return false;
    }

    if on_boundary(points, true, x, y) {
        return true;
    }

    let (mut winding, mut crossings) = (0, 0);
    accumulate_crossings(points, x, y, &mut winding, &mut crossings);

    FillRule::EvenOdd.is_inside(winding, crossings)
}

/// A subpath approximated with straight lines.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlatSubpath {
    pub points: Vec<(f64, f64)>,
    /// Whether the subpath ended with a ClosePath, or was a rectangle.
    pub closed: bool,
}

/// Number of lines needed to keep a curve within `tolerance` of its polyline, from the
/// largest second difference of its control points.
fn segments_for(second_difference: f64, degree_factor: f64, tolerance: f64) -> usize {
    let n = (degree_factor * second_difference / tolerance).sqrt().ceil();

    if n.is_finite() {
        (n as usize).max(1).min(MAX_FLATTEN_SEGMENTS)
    } else {
        1
    }
}

fn length(p: (f64, f64)) -> f64 {
    p.0.hypot(p.1)
}

fn flatten_cubic(
    out: &mut Vec<(f64, f64)>,
    from: (f64, f64),
    curve: &CubicBezierCurve,
    tolerance: f64,
) {
    let (p0, p1, p2, p3) = (from, curve.pt1, curve.pt2, curve.to);

    let d1 = length((p0.0 - 2.0 * p1.0 + p2.0, p0.1 - 2.0 * p1.1 + p2.1));
    let d2 = length((p1.0 - 2.0 * p2.0 + p3.0, p1.1 - 2.0 * p2.1 + p3.1));
    let n = segments_for(d1.max(d2), 0.75, tolerance);

    for i in 1..=n {
        let t = i as f64 / n as f64;
        out.push((
            cubic_at(p0.0, p1.0, p2.0, p3.0, t),
            cubic_at(p0.1, p1.1, p2.1, p3.1, t),
        ));
    }
}

fn flatten_quadratic(
    out: &mut Vec<(f64, f64)>,
    p0: (f64, f64),
    p1: (f64, f64),
    p2: (f64, f64),
    tolerance: f64,
) {
    let d = length((p0.0 - 2.0 * p1.0 + p2.0, p0.1 - 2.0 * p1.1 + p2.1));
    let n = segments_for(d, 0.25, tolerance);

    for i in 1..=n {
        let t = i as f64 / n as f64;
        out.push((quadratic_at(p0.0, p1.0, p2.0, t), quadratic_at(p0.1, p1.1, p2.1, t)));
    }
}

/// Approximates every subpath of a stream with straight lines.
///
/// Subpaths that consist only of a MoveTo are kept, as single points.
pub fn flatten(stream: &PathStream, tolerance: f64) -> Vec<FlatSubpath> {
    let mut subpaths = Vec::new();
    let mut current = FlatSubpath::default();
    let mut subpath_start = (0.0, 0.0);

    let finish = |subpaths: &mut Vec<FlatSubpath>, current: &mut FlatSubpath| {
        if !current.points.is_empty() {
            subpaths.push(std::mem::take(current));
        }
    };

    for cmd in stream.iter() {
        // After a ClosePath, drawing continues from the start of the closed subpath.
        let starts_subpath = matches!(
            cmd,
            PathCommand::MoveTo(..) | PathCommand::Rect { .. } | PathCommand::ClosePath
        );
        if current.points.is_empty() && !starts_subpath {
            current.points.push(subpath_start);
        }

        let last = current.points.last().copied().unwrap_or(subpath_start);

        match cmd {
            PathCommand::MoveTo(x, y) => {
                finish(&mut subpaths, &mut current);
                subpath_start = (x, y);
                current.points.push((x, y));
            }

            PathCommand::LineTo(x, y) => current.points.push((x, y)),

            PathCommand::CurveTo(curve) => {
                flatten_cubic(&mut current.points, last, &curve, tolerance)
            }

            PathCommand::QuadTo { ctrl, to } => {
                flatten_quadratic(&mut current.points, last, ctrl, to, tolerance)
            }

            PathCommand::Arc(arc) => {
                let start = arc.start_point();
                if last != start {
                    current.points.push(start);
                }

                let mut from = start;
                for curve in arc.to_cubics() {
                    flatten_cubic(&mut current.points, from, &curve, tolerance);
                    from = curve.to;
                }
            }

            PathCommand::Rect {
                x,
                y,
                width,
                height,
            } => {
                finish(&mut subpaths, &mut current);
                subpaths.push(FlatSubpath {
                    points: vec![
                        (x, y),
                        (x + width, y),
                        (x + width, y + height),
                        (x, y + height),
                    ],
                    closed: true,
                });
                subpath_start = (x, y);
            }

            PathCommand::ClosePath => {
                // Nothing to close right after a Rect or another ClosePath.
                current.closed = !current.points.is_empty();
                finish(&mut subpaths, &mut current);
            }
        }
    }

    finish(&mut subpaths, &mut current);

    subpaths
}

/// Tests a point against the filled interior of a path.
///
/// Every subpath is implicitly closed for filling.  Points on the outline are inside.
pub fn contains_path(stream: &PathStream, fill_rule: FillRule, x: f64, y: f64) -> bool {
    let subpaths = flatten(stream, FLATTEN_TOLERANCE);

    if subpaths.iter().any(|s| on_boundary(&s.points, true, x, y)) {
        return true;
    }

    let (mut winding, mut crossings) = (0, 0);
    for s in &subpaths {
        accumulate_crossings(&s.points, x, y, &mut winding, &mut crossings);
    }

    fill_rule.is_inside(winding, crossings)
}

/// Whether a point is within `line_width / 2` of the outline of a path.
///
/// Only the closing segments of closed subpaths are considered, not the implicit ones
/// used for filling.
pub fn on_path_stroke(stream: &PathStream, line_width: f64, x: f64, y: f64) -> bool {
    let half = line_width / 2.0;
    if half <= 0.0 {
        return false;
    }

    flatten(stream, FLATTEN_TOLERANCE).iter().any(|s| {
        if s.points.len() == 1 {
            let (px, py) = s.points[0];
            return contains_circle(px, py, half, x, y);
        }

        edges(&s.points, s.closed)
            .any(|(a, b)| distance_to_segment_squared(a, b, x, y) <= half * half)
    })
}
