//! Bounding boxes that know their coordinate space, and path extents.
//!
//! The extents of curved segments are computed from the curves' extrema, not from their
//! control points; the hull of the control points can be much larger than the curve.

use std::f64::consts::*;

use crate::bezier::{cubic_at, cubic_extrema, quadratic_at, quadratic_extremum, CenterArc};
use crate::path_builder::{PathCommand, PathStream};
use crate::rect::Rect;
use crate::transform::Transform;

#[derive(Debug, Default, Copy, Clone)]
pub struct BoundingBox {
    transform: Transform,
    pub rect: Option<Rect>,     // without stroke
    pub ink_rect: Option<Rect>, // with stroke
}

impl BoundingBox {
    pub fn new() -> BoundingBox {
        Default::default()
    }

    /// Computes the box of a path in its own coordinate space.
    ///
    /// The ink rect grows by half of `stroke_width` on every side, if it is given.
    pub fn from_path(stream: &PathStream, stroke_width: Option<f64>) -> BoundingBox {
        match path_extents(stream) {
            None => BoundingBox::new(),
            Some(rect) => BoundingBox::new().with_rect(rect).with_ink_rect(match stroke_width {
                Some(w) if w > 0.0 => rect.outset(w / 2.0),
                _ => rect,
            }),
        }
    }

    pub fn with_transform(self, transform: Transform) -> BoundingBox {
        BoundingBox { transform, ..self }
    }

    pub fn with_rect(self, rect: Rect) -> BoundingBox {
        BoundingBox {
            rect: Some(rect),
            ..self
        }
    }

    pub fn with_ink_rect(self, ink_rect: Rect) -> BoundingBox {
        BoundingBox {
            ink_rect: Some(ink_rect),
            ..self
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// The geometric rect, mapped through this box's transform.
    pub fn rect_in_parent(&self) -> Option<Rect> {
        self.rect.map(|r| self.transform.transform_rect(&r))
    }

    /// The stroke-inclusive rect, mapped through this box's transform.
    pub fn ink_rect_in_parent(&self) -> Option<Rect> {
        self.ink_rect.map(|r| self.transform.transform_rect(&r))
    }
}

/// Accumulates points into a rectangle.
#[derive(Default)]
struct Extents(Option<Rect>);

impl Extents {
    fn add(&mut self, (x, y): (f64, f64)) {
        self.0 = Some(match self.0 {
            None => Rect::new(x, y, x, y),
            Some(r) => r.include_point(x, y),
        });
    }

    fn add_rect(&mut self, r: &Rect) {
        self.add((r.x0, r.y0));
        self.add((r.x1, r.y1));
    }
}

/// Exact extents of a cubic curve from `p0` through `p1`, `p2` to `p3`.
pub fn cubic_extents(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)) -> Rect {
    let mut e = Extents::default();
    e.add(p0);
    e.add(p3);

    for t in cubic_extrema(p0.0, p1.0, p2.0, p3.0) {
        e.add((cubic_at(p0.0, p1.0, p2.0, p3.0, t), cubic_at(p0.1, p1.1, p2.1, p3.1, t)));
    }

    for t in cubic_extrema(p0.1, p1.1, p2.1, p3.1) {
        e.add((cubic_at(p0.0, p1.0, p2.0, p3.0, t), cubic_at(p0.1, p1.1, p2.1, p3.1, t)));
    }

    e.0.unwrap_or_default()
}

/// Exact extents of a quadratic curve.
pub fn quadratic_extents(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> Rect {
    let mut e = Extents::default();
    e.add(p0);
    e.add(p2);

    let at = |t: f64| (quadratic_at(p0.0, p1.0, p2.0, t), quadratic_at(p0.1, p1.1, p2.1, t));

    if let Some(t) = quadratic_extremum(p0.0, p1.0, p2.0) {
        e.add(at(t));
    }

    if let Some(t) = quadratic_extremum(p0.1, p1.1, p2.1) {
        e.add(at(t));
    }

    e.0.unwrap_or_default()
}

/// Whether the parametric angle `theta` is swept by an arc starting at `start`.
fn arc_covers(start: f64, delta: f64, theta: f64) -> bool {
    if delta.abs() >= 2.0 * PI {
        true
    } else if delta >= 0.0 {
        (theta - start).rem_euclid(2.0 * PI) <= delta
    } else {
        (start - theta).rem_euclid(2.0 * PI) <= -delta
    }
}

/// Exact extents of an elliptical arc, including the ends of the ellipse's axes that the
/// arc passes through.
pub fn arc_extents(arc: &CenterArc) -> Rect {
    let mut e = Extents::default();
    e.add(arc.start_point());
    e.add(arc.end_point());

    let (rx, ry) = arc.radii;
    let (sin_phi, cos_phi) = arc.rotation.sin_cos();

    // Parametric angles where dx/dθ = 0 and dy/dθ = 0; each repeats every half turn.
    let x_critical = (-ry * sin_phi).atan2(rx * cos_phi);
    let y_critical = (ry * cos_phi).atan2(rx * sin_phi);

    for base in [x_critical, y_critical] {
        for theta in [base, base + PI] {
            if arc_covers(arc.start, arc.delta, theta) {
                e.add(arc.point_at(theta));
            }
        }
    }

    e.0.unwrap_or_default()
}

/// Extents of all the geometry in a stream, or `None` if it is empty.
pub fn path_extents(stream: &PathStream) -> Option<Rect> {
    let mut e = Extents::default();
    let mut current = (0.0, 0.0);
    let mut subpath_start = (0.0, 0.0);

    for cmd in stream.iter() {
        match cmd {
            PathCommand::MoveTo(x, y) => {
                e.add((x, y));
                current = (x, y);
                subpath_start = current;
            }

            PathCommand::LineTo(x, y) => {
                e.add((x, y));
                current = (x, y);
            }

            PathCommand::CurveTo(curve) => {
                e.add_rect(&cubic_extents(current, curve.pt1, curve.pt2, curve.to));
                current = curve.to;
            }

            PathCommand::QuadTo { ctrl, to } => {
                e.add_rect(&quadratic_extents(current, ctrl, to));
                current = to;
            }

            PathCommand::Arc(arc) => {
                e.add_rect(&arc_extents(&arc));
                current = arc.end_point();
            }

            PathCommand::Rect {
                x,
                y,
                width,
                height,
            } => {
                e.add_rect(&Rect::from_origin_size(x, y, width, height));
                current = (x, y);
                subpath_start = current;
            }

            PathCommand::ClosePath => current = subpath_start,
        }
    }

    e.0
}

/// Extents of a stream; an empty stream yields a zero-sized rect at the origin.
pub fn path_bounding_rect(stream: &PathStream) -> Rect {
    path_extents(stream).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_has_zero_rect() {
        let stream = PathStream::new();
        assert_eq!(path_extents(&stream), None);
        assert_eq!(path_bounding_rect(&stream), Rect::default());

        let bbox = BoundingBox::from_path(&stream, Some(4.0));
        assert_eq!(bbox.rect, None);
        assert_eq!(bbox.ink_rect, None);
    }

    #[test]
    fn polyline_extents() {
        let (stream, _) = PathStream::from_path_data("M 10 10 L 30 -5 L 20 40 Z");
        assert_eq!(path_bounding_rect(&stream), Rect::new(10.0, -5.0, 30.0, 40.0));
    }

    #[test]
    fn cubic_extents_are_tighter_than_control_points() {
        let (stream, _) = PathStream::from_path_data("M 0 0 C 0 100 100 100 100 0");
        let r = path_bounding_rect(&stream);

        // The curve peaks at t = 0.5, at 3/4 of the control point height.
        assert!(r.approx_eq(&Rect::new(0.0, 0.0, 100.0, 75.0)));
    }

    #[test]
    fn quadratic_extents_include_extremum() {
        let (stream, _) = PathStream::from_path_data("M 0 0 Q 50 100 100 0");
        let r = path_bounding_rect(&stream);

        assert!(r.approx_eq(&Rect::new(0.0, 0.0, 100.0, 50.0)));
    }

    #[test]
    fn full_circle_extents() {
        let mut stream = PathStream::new();
        stream.arc(50.0, 50.0, 10.0, 0.0, 2.0 * PI, false);

        assert!(path_bounding_rect(&stream).approx_eq(&Rect::new(40.0, 40.0, 60.0, 60.0)));
    }

    #[test]
    fn partial_arc_extents() {
        // Lower half of the circle on screen (y grows downwards).
        let mut stream = PathStream::new();
        stream.arc(0.0, 0.0, 10.0, 0.0, PI, false);
        assert!(path_bounding_rect(&stream).approx_eq(&Rect::new(-10.0, 0.0, 10.0, 10.0)));

        // The same endpoints drawn the other way cover the upper half.
        let mut stream = PathStream::new();
        stream.arc(0.0, 0.0, 10.0, 0.0, PI, true);
        assert!(path_bounding_rect(&stream).approx_eq(&Rect::new(-10.0, -10.0, 10.0, 0.0)));
    }

    #[test]
    fn rotated_ellipse_extents() {
        // An ellipse with radii (20, 10) rotated a quarter turn is 20 wide and 40 tall.
        let mut stream = PathStream::new();
        stream.ellipse(0.0, 0.0, 20.0, 10.0, FRAC_PI_2, 0.0, 2.0 * PI, false);
        assert!(path_bounding_rect(&stream).approx_eq(&Rect::new(-10.0, -20.0, 10.0, 20.0)));

        // At 45 degrees, the half extents are sqrt((400 + 100) / 2).
        let mut stream = PathStream::new();
        stream.ellipse(0.0, 0.0, 20.0, 10.0, FRAC_PI_4, 0.0, 2.0 * PI, false);
        let h = 250.0_f64.sqrt();
        assert!(path_bounding_rect(&stream).approx_eq(&Rect::new(-h, -h, h, h)));
    }

    #[test]
    fn stroke_grows_ink_rect() {
        let (stream, _) = PathStream::from_path_data("M 0 0 L 10 10");
        let bbox = BoundingBox::from_path(&stream, Some(4.0));

        assert_eq!(bbox.rect, Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(bbox.ink_rect, Some(Rect::new(-2.0, -2.0, 12.0, 12.0)));

        let bbox = bbox.with_transform(Transform::new_translate(5.0, 0.0));
        assert_eq!(bbox.rect_in_parent(), Some(Rect::new(5.0, 0.0, 15.0, 10.0)));
        assert_eq!(bbox.ink_rect_in_parent(), Some(Rect::new(3.0, -2.0, 17.0, 12.0)));
    }

    #[test]
    fn rect_command_extents() {
        let mut stream = PathStream::new();
        stream.rect(10.0, 10.0, -5.0, 20.0);
        assert_eq!(path_bounding_rect(&stream), Rect::new(5.0, 10.0, 10.0, 30.0));
    }
}
