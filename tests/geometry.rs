//! Hit-testing, bounding boxes and transforms through the public API.

use std::f64::consts::*;

use float_cmp::approx_eq;

use vgkernel::bbox::path_bounding_rect;
use vgkernel::bezier::{ArcParameterization, EllipticalArc, LargeArc, Sweep};
use vgkernel::contain::{contains_circle, contains_polygon, contains_sector};
use vgkernel::{FillRule, PathStream, Rect, Shape, ShapeDescriptor, Transform};

fn assert_rect_eq(a: Rect, b: Rect) {
    assert!(a.approx_eq(&b), "{a:?} != {b:?}");
}

#[test]
fn circle_hit_test() {
    assert!(contains_circle(0.0, 0.0, 10.0, 0.0, 0.0));
    assert!(!contains_circle(0.0, 0.0, 10.0, 11.0, 0.0));

    let shape = Shape::new(ShapeDescriptor::Circle {
        cx: 0.0,
        cy: 0.0,
        r: 10.0,
    });
    assert!(shape.contains(0.0, 0.0));
    assert!(!shape.contains(11.0, 0.0));
}

#[test]
fn quarter_sector_hit_test() {
    let end = FRAC_PI_2;

    assert!(contains_sector(0.0, 0.0, 0.0, 10.0, 0.0, end, true, 5.0, 5.0));
    assert!(!contains_sector(0.0, 0.0, 0.0, 10.0, 0.0, end, true, -5.0, 5.0));
    assert!(!contains_sector(0.0, 0.0, 0.0, 10.0, 0.0, end, true, 5.0, -5.0));

    let shape = Shape::new(ShapeDescriptor::Sector {
        cx: 0.0,
        cy: 0.0,
        r0: 0.0,
        r: 10.0,
        start_angle: 0.0,
        end_angle: end,
        clockwise: true,
    });
    assert!(shape.contains(5.0, 5.0));
    assert!(!shape.contains(-5.0, 5.0));
    assert!(!shape.contains(5.0, -5.0));

    let shape = Shape::new(ShapeDescriptor::sector_from_degrees(0.0, 0.0, 0.0, 10.0, 0.0, 90.0));
    assert!(shape.contains(5.0, 5.0));
    assert!(!shape.contains(-5.0, 5.0));
    assert!(!shape.contains(5.0, -5.0));
}

#[test]
fn square_polygon_hit_test() {
    let square = vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];

    assert!(contains_polygon(&square, 5.0, 5.0));
    assert!(!contains_polygon(&square, 15.0, 5.0));

    let shape = Shape::new(ShapeDescriptor::Polygon(square));
    assert!(shape.contains(5.0, 5.0));
    assert!(!shape.contains(15.0, 5.0));
}

#[test]
fn path_shape_uses_fill_rule() {
    // Two nested squares drawn in the same direction.
    let (path, result) = PathStream::from_path_data("M0 0 H30 V30 H0 Z M10 10 H20 V20 H10 Z");
    assert!(result.is_ok());

    let even_odd = Shape::new(ShapeDescriptor::Path(path.clone()));
    assert!(even_odd.contains(5.0, 5.0));
    assert!(!even_odd.contains(15.0, 15.0));

    let non_zero = Shape::new(ShapeDescriptor::Path(path)).with_fill_rule(FillRule::NonZero);
    assert!(non_zero.contains(15.0, 15.0));
}

#[test]
fn stroked_line_hit_test() {
    let line = Shape::new(ShapeDescriptor::Line {
        x1: 0.0,
        y1: 0.0,
        x2: 100.0,
        y2: 0.0,
    })
    .with_stroke(4.0);

    assert!(line.contains(50.0, 1.5));
    assert!(!line.contains(50.0, 3.0));
    assert!(!line.contains(110.0, 0.0));
}

#[test]
fn curved_path_bounds_use_extrema() {
    let (path, _) = PathStream::from_path_data("M0 0 C 0 100 100 100 100 0");

    // The control points reach y = 100, but the curve only reaches 75.
    assert_rect_eq(path_bounding_rect(&path), Rect::new(0.0, 0.0, 100.0, 75.0));
}

#[test]
fn arc_path_bounds_include_critical_angles() {
    let mut path = PathStream::new();
    path.arc(0.0, 0.0, 10.0, -FRAC_PI_4, FRAC_PI_4, false);

    let x = 10.0 * FRAC_PI_4.cos();
    assert_rect_eq(path_bounding_rect(&path), Rect::new(x, -x, 10.0, x));
}

#[test]
fn empty_path_bounds_are_empty_at_origin() {
    assert_eq!(path_bounding_rect(&PathStream::new()), Rect::default());
}

#[test]
fn stroke_expands_ink_rect() {
    let shape = Shape::new(ShapeDescriptor::rect(10.0, 10.0, 20.0, 20.0)).with_stroke(4.0);
    let bbox = shape.bounding_box();

    assert_rect_eq(bbox.rect.unwrap(), Rect::new(10.0, 10.0, 30.0, 30.0));
    assert_rect_eq(bbox.ink_rect.unwrap(), Rect::new(8.0, 8.0, 32.0, 32.0));
}

#[test]
fn bounds_follow_the_shape_transform() {
    let mut shape = Shape::new(ShapeDescriptor::rect(0.0, 0.0, 10.0, 20.0));
    shape.transformable_mut().set_rotation(FRAC_PI_2);
    shape.transformable_mut().set_position(100.0, 0.0);

    let rect = shape.bounding_box().rect_in_parent().unwrap();
    assert_rect_eq(rect, Rect::new(80.0, 0.0, 100.0, 10.0));

    assert!(shape.contains(90.0, 5.0));
    assert!(!shape.contains(5.0, 5.0));
}

#[test]
fn composed_transform_inverts() {
    let t = Transform::new_scale_about(2.0, 3.0, 5.0, 5.0)
        .post_rotate_about(FRAC_PI_3, 5.0, 5.0)
        .post_translate(10.0, -4.0);

    let inv = t.invert().unwrap();
    let (x, y) = t.transform_point(7.0, 11.0);
    let (bx, by) = inv.transform_point(x, y);

    assert!(approx_eq!(f64, bx, 7.0, epsilon = 1e-9));
    assert!(approx_eq!(f64, by, 11.0, epsilon = 1e-9));

    assert!(Transform::new_scale(0.0, 1.0).invert().is_none());
}

#[test]
fn arc_endpoints_round_trip() {
    let arc = EllipticalArc {
        r: (30.0, 15.0),
        x_axis_rotation: 30.0,
        large_arc: LargeArc(true),
        sweep: Sweep::Negative,
        from: (10.0, 20.0),
        to: (40.0, 35.0),
    };

    match arc.center_parameterization() {
        ArcParameterization::CenterParameters(center) => {
            let start = center.start_point();
            let end = center.end_point();

            assert!(approx_eq!(f64, start.0, 10.0, epsilon = 1e-9));
            assert!(approx_eq!(f64, start.1, 20.0, epsilon = 1e-9));
            assert!(approx_eq!(f64, end.0, 40.0, epsilon = 1e-9));
            assert!(approx_eq!(f64, end.1, 35.0, epsilon = 1e-9));
            assert!(center.delta < -PI);
        }
        other => panic!("expected center parameters, got {other:?}"),
    }
}
