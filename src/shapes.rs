//! Basic shapes: rectangles, circles, ellipses, sectors, rings, polygons, polylines,
//! lines and arbitrary paths.
//!
//! A [`ShapeDescriptor`] holds the numeric parameters of one primitive, and knows how to
//! build its outline, compute its bounds, and test points against it.  A [`Shape`] adds
//! the things a drawable object owns: its transform, its fill and stroke, the path built
//! from the descriptor, and a cache for the bounding box.

use std::cell::Cell;
use std::f64::consts::*;

use crate::bbox::{arc_extents, path_bounding_rect, BoundingBox};
use crate::bezier::CenterArc;
use crate::contain::{self, FillRule};
use crate::path_builder::{arc_sweep, PathSink, PathStream};
use crate::rect::Rect;
use crate::transform::{Transform, Transformable, ValidTransform};

/// Numeric parameters of a primitive shape.
///
/// Angles are in radians.  With the y axis pointing down, increasing angles go clockwise
/// on screen.
#[derive(Debug, Clone)]
pub enum ShapeDescriptor {
    /// Rectangle with optional rounded corners.  Negative sizes extend the rectangle to
    /// the left or upwards from `(x, y)`.
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        rx: f64,
        ry: f64,
    },

    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },

    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
    },

    /// Annular sector between radii `r0` and `r`; `r0` can be zero for a pie slice.
    Sector {
        cx: f64,
        cy: f64,
        r0: f64,
        r: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    },

    Ring {
        cx: f64,
        cy: f64,
        r0: f64,
        r: f64,
    },

    Polygon(Vec<(f64, f64)>),

    Polyline(Vec<(f64, f64)>),

    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },

    Path(PathStream),
}

impl ShapeDescriptor {
    pub fn rect(x: f64, y: f64, width: f64, height: f64) -> ShapeDescriptor {
        ShapeDescriptor::Rect {
            x,
            y,
            width,
            height,
            rx: 0.0,
            ry: 0.0,
        }
    }

    /// Creates a sector with its angles given in degrees.
    ///
    /// The sector covers the angles from `start_degrees` to `end_degrees`, as measured by
    /// `atan2` and going in the increasing direction.  An end angle smaller than the start
    /// angle wraps through 360.
    pub fn sector_from_degrees(
        cx: f64,
        cy: f64,
        r0: f64,
        r: f64,
        start_degrees: f64,
        end_degrees: f64,
    ) -> ShapeDescriptor {
        ShapeDescriptor::Sector {
            cx,
            cy,
            r0,
            r,
            start_angle: start_degrees.to_radians(),
            end_angle: end_degrees.to_radians(),
            clockwise: true,
        }
    }

    /// Creates a path shape from SVG path data.
    ///
    /// If the data has errors, the shape gets the part of the path before the first
    /// error.
    pub fn from_path_data(path_str: &str) -> ShapeDescriptor {
        let (stream, result) = PathStream::from_path_data(path_str);

        if let Err(e) = result {
            vg_log!("invalid path data \"{}\": {}", path_str, e);
        }

        ShapeDescriptor::Path(stream)
    }

    /// Appends the outline of the shape to `sink`.
    pub fn build_path<S: PathSink + ?Sized>(&self, sink: &mut S) {
        match *self {
            ShapeDescriptor::Rect {
                x,
                y,
                width,
                height,
                rx,
                ry,
            } => make_rect(sink, x, y, width, height, rx, ry),

            ShapeDescriptor::Circle { cx, cy, r } => make_circle(sink, cx, cy, r, false),

            ShapeDescriptor::Ellipse { cx, cy, rx, ry } => make_ellipse(sink, cx, cy, rx, ry),

            ShapeDescriptor::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                end_angle,
                clockwise,
            } => make_sector(sink, cx, cy, r0, r, start_angle, end_angle, clockwise),

            ShapeDescriptor::Ring { cx, cy, r0, r } => {
                make_circle(sink, cx, cy, r, false);
                if r0 > 0.0 {
                    make_circle(sink, cx, cy, r0, true);
                }
            }

            ShapeDescriptor::Polygon(ref points) => make_poly(sink, points, true),

            ShapeDescriptor::Polyline(ref points) => make_poly(sink, points, false),

            ShapeDescriptor::Line { x1, y1, x2, y2 } => {
                sink.move_to(x1, y1);
                sink.line_to(x2, y2);
            }

            ShapeDescriptor::Path(ref stream) => stream.replay(sink),
        }
    }

    /// Builds the outline of the shape into a new stream.
    pub fn to_path(&self) -> PathStream {
        let mut stream = PathStream::new();
        self.build_path(&mut stream);
        stream
    }

    /// Geometric bounds of the shape, without stroke.
    ///
    /// Shapes with no geometry yield a zero-sized rect at the origin.
    pub fn bounding_rect(&self) -> Rect {
        match *self {
            ShapeDescriptor::Rect {
                x,
                y,
                width,
                height,
                ..
            } => Rect::from_origin_size(x, y, width, height),

            ShapeDescriptor::Circle { cx, cy, r } | ShapeDescriptor::Ring { cx, cy, r, .. } => {
                Rect::new(cx - r, cy - r, cx + r, cy + r)
            }

            ShapeDescriptor::Ellipse { cx, cy, rx, ry } => {
                Rect::new(cx - rx, cy - ry, cx + rx, cy + ry)
            }

            ShapeDescriptor::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                end_angle,
                clockwise,
            } => {
                let delta = arc_sweep(start_angle, end_angle, !clockwise);
                let arc = |radius: f64| CenterArc {
                    center: (cx, cy),
                    radii: (radius, radius),
                    start: start_angle,
                    delta,
                    rotation: 0.0,
                };

                let outer = arc_extents(&arc(r));
                if r0 > 0.0 {
                    outer.union(&arc_extents(&arc(r0)))
                } else {
                    outer.include_point(cx, cy)
                }
            }

            ShapeDescriptor::Polygon(ref points) | ShapeDescriptor::Polyline(ref points) => {
                points_extents(points)
            }

            ShapeDescriptor::Line { x1, y1, x2, y2 } => Rect::from_origin_size(x1, y1, x2 - x1, y2 - y1),

            ShapeDescriptor::Path(ref stream) => path_bounding_rect(stream),
        }
    }

    /// Tests a point against the filled interior of the shape.
    ///
    /// `fill_rule` only matters for paths; lines have no interior.  Polylines are closed
    /// implicitly, as for filling.
    pub fn contains(&self, fill_rule: FillRule, x: f64, y: f64) -> bool {
        match *self {
            ShapeDescriptor::Rect {
                x: rx0,
                y: ry0,
                width,
                height,
                rx,
                ry,
            } => contains_rounded_rect(rx0, ry0, width, height, rx, ry, x, y),

            ShapeDescriptor::Circle { cx, cy, r } => contain::contains_circle(cx, cy, r, x, y),

            ShapeDescriptor::Ellipse { cx, cy, rx, ry } => {
                contain::contains_ellipse(cx, cy, rx, ry, x, y)
            }

            ShapeDescriptor::Sector {
                cx,
                cy,
                r0,
                r,
                start_angle,
                end_angle,
                clockwise,
            } => contain::contains_sector(cx, cy, r0, r, start_angle, end_angle, clockwise, x, y),

            ShapeDescriptor::Ring { cx, cy, r0, r } => {
                contain::contains_sector(cx, cy, r0, r, 0.0, 2.0 * PI, true, x, y)
            }

            ShapeDescriptor::Polygon(ref points) | ShapeDescriptor::Polyline(ref points) => {
                contain::contains_polygon(points, x, y)
            }

            ShapeDescriptor::Line { .. } => false,

            ShapeDescriptor::Path(ref stream) => contain::contains_path(stream, fill_rule, x, y),
        }
    }

    /// Tests a point against the stroked outline of the shape.
    pub fn on_stroke(&self, line_width: f64, x: f64, y: f64) -> bool {
        match *self {
            ShapeDescriptor::Line { x1, y1, x2, y2 } => {
                contain::on_line_stroke(x1, y1, x2, y2, line_width, x, y)
            }

            ShapeDescriptor::Polyline(ref points) => {
                contain::on_polyline_stroke(points, line_width, x, y)
            }

            ShapeDescriptor::Path(ref stream) => contain::on_path_stroke(stream, line_width, x, y),

            _ => contain::on_path_stroke(&self.to_path(), line_width, x, y),
        }
    }
}

fn points_extents(points: &[(f64, f64)]) -> Rect {
    let mut iter = points.iter();

    match iter.next() {
        None => Rect::default(),
        Some(&(x, y)) => iter.fold(Rect::new(x, y, x, y), |r, &(x, y)| r.include_point(x, y)),
    }
}

/// Clamps corner radii the way rounded rectangles need them.
///
/// Radii larger than half the size are reduced; if one radius is zero, the corners are
/// square.
fn corner_radii(width: f64, height: f64, rx: f64, ry: f64) -> (f64, f64) {
    let rx = rx.max(0.0).min(width / 2.0);
    let ry = ry.max(0.0).min(height / 2.0);

    if rx == 0.0 || ry == 0.0 {
        (0.0, 0.0)
    } else {
        (rx, ry)
    }
}

#[allow(clippy::too_many_arguments)]
fn contains_rounded_rect(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: f64,
    ry: f64,
    px: f64,
    py: f64,
) -> bool {
    let r = Rect::from_origin_size(x, y, width, height);
    if !r.contains(px, py) {
        return false;
    }

    let (rx, ry) = corner_radii(r.width(), r.height(), rx, ry);
    if rx == 0.0 {
        return true;
    }

    // Outside of the corner boxes, the rectangle is square.
    let cx = if px < r.x0 + rx {
        r.x0 + rx
    } else if px > r.x1 - rx {
        r.x1 - rx
    } else {
        return true;
    };

    let cy = if py < r.y0 + ry {
        r.y0 + ry
    } else if py > r.y1 - ry {
        r.y1 - ry
    } else {
        return true;
    };

    contain::contains_ellipse(cx, cy, rx, ry, px, py)
}

#[allow(clippy::too_many_arguments)]
fn make_rect<S: PathSink + ?Sized>(
    sink: &mut S,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rx: f64,
    ry: f64,
) {
    let r = Rect::from_origin_size(x, y, width, height);
    let (rx, ry) = corner_radii(r.width(), r.height(), rx, ry);

    if rx == 0.0 {
        // Easy case, no rounded corners
        sink.rect(r.x0, r.y0, r.width(), r.height());
        return;
    }

    // Rounded corners: straight edges joined by quarter ellipses, going clockwise from
    // the top left corner.  Each arc is connected to the previous edge implicitly.
    sink.move_to(r.x0 + rx, r.y0);
    sink.line_to(r.x1 - rx, r.y0);
    sink.ellipse(r.x1 - rx, r.y0 + ry, rx, ry, 0.0, -FRAC_PI_2, 0.0, false);
    sink.line_to(r.x1, r.y1 - ry);
    sink.ellipse(r.x1 - rx, r.y1 - ry, rx, ry, 0.0, 0.0, FRAC_PI_2, false);
    sink.line_to(r.x0 + rx, r.y1);
    sink.ellipse(r.x0 + rx, r.y1 - ry, rx, ry, 0.0, FRAC_PI_2, PI, false);
    sink.line_to(r.x0, r.y0 + ry);
    sink.ellipse(r.x0 + rx, r.y0 + ry, rx, ry, 0.0, PI, 3.0 * FRAC_PI_2, false);
    sink.close_path();
}

fn make_circle<S: PathSink + ?Sized>(sink: &mut S, cx: f64, cy: f64, r: f64, anticlockwise: bool) {
    if r <= 0.0 {
        return;
    }

    let end = if anticlockwise { -2.0 * PI } else { 2.0 * PI };

    sink.move_to(cx + r, cy);
    sink.ellipse(cx, cy, r, r, 0.0, 0.0, end, anticlockwise);
    sink.close_path();
}

fn make_ellipse<S: PathSink + ?Sized>(sink: &mut S, cx: f64, cy: f64, rx: f64, ry: f64) {
    // rx and ry must be positive
    if rx <= 0.0 || ry <= 0.0 {
        return;
    }

    // 4/3 * (1-cos 45°)/sin 45° = 4/3 * sqrt(2) - 1
    let arc_magic: f64 = 0.552_284_749_8;

    // approximate an ellipse using 4 Bézier curves

    sink.move_to(cx + rx, cy);

    sink.curve_to(
        cx + rx,
        cy + arc_magic * ry,
        cx + arc_magic * rx,
        cy + ry,
        cx,
        cy + ry,
    );

    sink.curve_to(
        cx - arc_magic * rx,
        cy + ry,
        cx - rx,
        cy + arc_magic * ry,
        cx - rx,
        cy,
    );

    sink.curve_to(
        cx - rx,
        cy - arc_magic * ry,
        cx - arc_magic * rx,
        cy - ry,
        cx,
        cy - ry,
    );

    sink.curve_to(
        cx + arc_magic * rx,
        cy - ry,
        cx + rx,
        cy - arc_magic * ry,
        cx + rx,
        cy,
    );

    sink.close_path();
}

#[allow(clippy::too_many_arguments)]
fn make_sector<S: PathSink + ?Sized>(
    sink: &mut S,
    cx: f64,
    cy: f64,
    r0: f64,
    r: f64,
    start: f64,
    end: f64,
    clockwise: bool,
) {
    let r0 = r0.max(0.0);
    if r <= 0.0 {
        return;
    }

    let (sin_start, cos_start) = start.sin_cos();
    let (sin_end, cos_end) = end.sin_cos();

    sink.move_to(cx + cos_start * r0, cy + sin_start * r0);
    sink.line_to(cx + cos_start * r, cy + sin_start * r);
    sink.ellipse(cx, cy, r, r, 0.0, start, end, !clockwise);
    sink.line_to(cx + cos_end * r0, cy + sin_end * r0);

    if r0 > 0.0 {
        sink.ellipse(cx, cy, r0, r0, 0.0, end, start, clockwise);
    }

    sink.close_path();
}

fn make_poly<S: PathSink + ?Sized>(sink: &mut S, points: &[(f64, f64)], closed: bool) {
    for (i, &(x, y)) in points.iter().enumerate() {
        if i == 0 {
            sink.move_to(x, y);
        } else {
            sink.line_to(x, y);
        }
    }

    if closed && !points.is_empty() {
        sink.close_path();
    }
}

/// Stroke parameters that affect geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
}

/// A drawable primitive: a descriptor, the path built from it, a transform, and fill and
/// stroke settings.
///
/// The path is rebuilt whenever the descriptor changes.  The bounding box is cached
/// until the path or the stroke changes.
#[derive(Debug, Clone)]
pub struct Shape {
    descriptor: ShapeDescriptor,
    path: PathStream,
    transformable: Transformable,
    fill: bool,
    fill_rule: FillRule,
    stroke: Option<Stroke>,
    bbox_cache: Cell<Option<(u64, BoundingBox)>>,
}

impl Shape {
    /// Creates a filled, unstroked shape.
    pub fn new(descriptor: ShapeDescriptor) -> Shape {
        let mut shape = Shape {
            descriptor,
            path: PathStream::new(),
            transformable: Transformable::new(),
            fill: true,
            fill_rule: FillRule::default(),
            stroke: None,
            bbox_cache: Cell::new(None),
        };

        shape.rebuild_path();
        shape
    }

    pub fn with_fill(mut self, fill: bool) -> Shape {
        self.fill = fill;
        self
    }

    pub fn with_fill_rule(mut self, fill_rule: FillRule) -> Shape {
        self.fill_rule = fill_rule;
        self
    }

    pub fn with_stroke(mut self, width: f64) -> Shape {
        self.set_stroke(Some(Stroke { width }));
        self
    }

    pub fn descriptor(&self) -> &ShapeDescriptor {
        &self.descriptor
    }

    pub fn set_descriptor(&mut self, descriptor: ShapeDescriptor) {
        self.descriptor = descriptor;
        self.rebuild_path();
    }

    /// Modifies the descriptor in place, and rebuilds the path afterwards.
    pub fn update_descriptor(&mut self, f: impl FnOnce(&mut ShapeDescriptor)) {
        f(&mut self.descriptor);
        self.rebuild_path();
    }

    /// The outline built from the descriptor, in the shape's local coordinates.
    pub fn path(&self) -> &PathStream {
        &self.path
    }

    pub fn transformable(&self) -> &Transformable {
        &self.transformable
    }

    pub fn transformable_mut(&mut self) -> &mut Transformable {
        &mut self.transformable
    }

    pub fn transform(&self) -> Transform {
        self.transformable.transform()
    }

    pub fn fill(&self) -> bool {
        self.fill
    }

    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    pub fn stroke(&self) -> Option<Stroke> {
        self.stroke
    }

    pub fn set_stroke(&mut self, stroke: Option<Stroke>) {
        self.stroke = stroke;
        self.bbox_cache.set(None);
    }

    fn rebuild_path(&mut self) {
        self.path.reset();
        self.descriptor.build_path(&mut self.path);

        if self.path.dropped_segments() > 0 {
            vg_log!(
                "shape {:?} has {} invalid segments",
                self.descriptor,
                self.path.dropped_segments()
            );
        }
    }

    /// Replays the shape's outline into a painting backend.
    pub fn draw<S: PathSink + ?Sized>(&self, sink: &mut S) {
        self.path.replay(sink);
    }

    fn stroke_width(&self) -> Option<f64> {
        self.stroke.map(|s| s.width)
    }

    /// Bounding box of the shape in local coordinates, carrying the shape's transform.
    pub fn bounding_box(&self) -> BoundingBox {
        let version = self.path.version();

        let bbox = match self.bbox_cache.get() {
            Some((v, bbox)) if v == version => bbox,
            _ => {
                let rect = self.descriptor.bounding_rect();
                let ink_rect = match self.stroke_width() {
                    Some(w) if w > 0.0 => rect.outset(w / 2.0),
                    _ => rect,
                };
                let bbox = BoundingBox::new().with_rect(rect).with_ink_rect(ink_rect);

                self.bbox_cache.set(Some((version, bbox)));
                bbox
            }
        };

        bbox.with_transform(self.transform())
    }

    /// Geometric bounds in local coordinates, without stroke.
    pub fn bounding_rect(&self) -> Rect {
        self.bounding_box().rect.unwrap_or_default()
    }

    /// Tests a point given in the shape's local coordinates.
    pub fn contains_local(&self, x: f64, y: f64) -> bool {
        let ink_rect = self.bounding_box().ink_rect.unwrap_or_default();
        if !ink_rect.contains(x, y) {
            return false;
        }

        if self.fill && self.descriptor.contains(self.fill_rule, x, y) {
            return true;
        }

        match self.stroke_width() {
            Some(w) if w > 0.0 => self.descriptor.on_stroke(w, x, y),
            _ => false,
        }
    }

    /// Tests a point given in the parent's coordinates, which the shape's transform maps
    /// its local coordinates into.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        match ValidTransform::try_from(self.transform()) {
            Ok(t) => {
                let (lx, ly) = t.inverse().transform_point(x, y);
                self.contains_local(lx, ly)
            }

            Err(_) => {
                vg_log!("shape has a singular transform; it contains no points");
                false
            }
        }
    }
}
