//! Morphing between shapes, through the public API.

use std::f64::consts::*;

use vgkernel::morph::path_to_bezier_subpaths;
use vgkernel::{
    to_path_data, Morph, MorphError, MorphOptions, MorphPlan, MorphState, PathCommand,
    PathStream, ShapeDescriptor, WriterOptions,
};

fn all_points(stream: &PathStream) -> Vec<(f64, f64)> {
    stream
        .iter()
        .flat_map(|cmd| match cmd {
            PathCommand::MoveTo(x, y) => vec![(x, y)],
            PathCommand::CurveTo(c) => vec![c.pt1, c.pt2, c.to],
            _ => vec![],
        })
        .collect()
}

fn assert_close(a: (f64, f64), b: (f64, f64), epsilon: f64) {
    assert!(
        (a.0 - b.0).abs() < epsilon && (a.1 - b.1).abs() < epsilon,
        "{a:?} != {b:?}"
    );
}

fn star_points() -> Vec<(f64, f64)> {
    (0..10)
        .map(|i| {
            let r = if i % 2 == 0 { 40.0 } else { 15.0 };
            let angle = -FRAC_PI_2 + i as f64 * PI / 5.0;
            (100.0 + r * angle.cos(), 100.0 + r * angle.sin())
        })
        .collect()
}

fn circle() -> PathStream {
    ShapeDescriptor::Circle {
        cx: 100.0,
        cy: 100.0,
        r: 40.0,
    }
    .to_path()
}

fn star() -> PathStream {
    ShapeDescriptor::Polygon(star_points()).to_path()
}

#[test]
fn identity_morph() {
    let path = circle();
    let original = path_to_bezier_subpaths(&path).remove(0).points;

    let plan = MorphPlan::new(&path, &path, &MorphOptions::default());

    for i in 0..=10 {
        let frame = all_points(&plan.interpolate(i as f64 / 10.0));
        assert_eq!(frame.len(), original.len());

        for (a, b) in frame.iter().zip(&original) {
            assert_close(*a, *b, 1e-9);
        }
    }
}

#[test]
fn circle_to_star_and_back() {
    let there = MorphPlan::new(&circle(), &star(), &MorphOptions::default());
    let back = MorphPlan::new(&star(), &circle(), &MorphOptions::default());

    // Star vertices come out in order at the end of the forward morph.
    let end = all_points(&there.interpolate(1.0));
    for (p, v) in end.iter().step_by(3).zip(star_points()) {
        assert_close(*p, v, 1e-6);
    }

    // The backward morph starts at the star, possibly from another vertex.
    let start = all_points(&back.interpolate(0.0));
    for p in start.iter().step_by(3) {
        assert!(star_points().iter().any(|v| (p.0 - v.0).hypot(p.1 - v.1) < 1e-6));
    }

    // And ends on the circle.
    for p in all_points(&back.interpolate(1.0)).iter().step_by(3) {
        assert!(((p.0 - 100.0).hypot(p.1 - 100.0) - 40.0).abs() < 0.02);
    }

    for plan in [&there, &back] {
        for i in 0..=50 {
            let frame = plan.interpolate(i as f64 / 50.0);
            assert!(all_points(&frame)
                .iter()
                .all(|p| p.0.is_finite() && p.1.is_finite()));
            assert!(!to_path_data(&frame, WriterOptions::default()).contains("NaN"));
        }
    }
}

#[test]
fn morph_across_subpath_counts() {
    let (two_squares, _) = PathStream::from_path_data("M0 0 H10 V10 H0 Z M50 0 H60 V10 H50 Z");

    let mut morph = Morph::new(two_squares, circle());
    let frame = morph.frame(0.5).unwrap();

    let moves = frame
        .iter()
        .filter(|c| matches!(c, PathCommand::MoveTo(..)))
        .count();
    assert_eq!(moves, 2);
    assert_eq!(morph.state(), MorphState::Animating);

    // At the end, the extra subpath has collapsed to a single point.
    let end = all_points(&morph.frame(1.0).unwrap());
    let circle_points = path_to_bezier_subpaths(&circle()).remove(0).points.len();
    let extra = &end[circle_points..];

    assert_eq!(extra.len(), circle_points);
    assert!(extra.iter().all(|p| (p.0 - extra[0].0).hypot(p.1 - extra[0].1) < 1e-9));
    assert_eq!(morph.state(), MorphState::Done);
}

#[test]
fn aborted_morph_needs_planning() {
    let mut morph = Morph::new(circle(), star());

    morph.abort();
    assert_eq!(morph.frame(0.2).unwrap_err(), MorphError::Aborted);

    morph.plan();
    assert!(morph.frame(0.2).is_ok());
}
