//! End-to-end tests for path data: parsing into a stream, replaying it into a sink, and
//! writing it back out.

use std::f64::consts::PI;

use vgkernel::path_writer::precision_for_scale;
use vgkernel::{to_path_data, PathCommand, PathSink, PathStream, StreamError, WriterOptions};

#[derive(Debug, PartialEq)]
enum Op {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CurveTo(f64, f64, f64, f64, f64, f64),
    QuadTo(f64, f64, f64, f64),
    Ellipse(f64, f64, f64, f64),
    Rect(f64, f64, f64, f64),
    Close,
}

#[derive(Default)]
struct Recorder(Vec<Op>);

impl PathSink for Recorder {
    fn move_to(&mut self, x: f64, y: f64) {
        self.0.push(Op::MoveTo(x, y));
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.0.push(Op::LineTo(x, y));
    }

    fn curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        self.0.push(Op::CurveTo(x1, y1, x2, y2, x, y));
    }

    fn quad_to(&mut self, x1: f64, y1: f64, x: f64, y: f64) {
        self.0.push(Op::QuadTo(x1, y1, x, y));
    }

    fn ellipse(
        &mut self,
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        _rotation: f64,
        _start: f64,
        _end: f64,
        _anticlockwise: bool,
    ) {
        self.0.push(Op::Ellipse(cx, cy, rx, ry));
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.0.push(Op::Rect(x, y, width, height));
    }

    fn close_path(&mut self) {
        self.0.push(Op::Close);
    }
}

fn replay(stream: &PathStream) -> Vec<Op> {
    let mut recorder = Recorder::default();
    stream.replay(&mut recorder);
    recorder.0
}

#[test]
fn parsed_square_replays_exactly() {
    let (stream, result) = PathStream::from_path_data("M0 0 L10 0 L10 10 L0 10 Z");
    assert!(result.is_ok());

    assert_eq!(
        replay(&stream),
        vec![
            Op::MoveTo(0.0, 0.0),
            Op::LineTo(10.0, 0.0),
            Op::LineTo(10.0, 10.0),
            Op::LineTo(0.0, 10.0),
            Op::Close,
        ]
    );
}

#[test]
fn relative_and_smooth_commands_become_absolute() {
    let (stream, result) = PathStream::from_path_data("m10 10 h10 v10 s 10 10 20 0 t 10 0");
    assert!(result.is_ok());

    assert_eq!(
        replay(&stream),
        vec![
            Op::MoveTo(10.0, 10.0),
            Op::LineTo(20.0, 10.0),
            Op::LineTo(20.0, 20.0),
            // No previous curve, so the first control point is the current point.
            Op::CurveTo(20.0, 20.0, 30.0, 30.0, 40.0, 20.0),
            // Previous command was a cubic, so no reflection for T.
            Op::QuadTo(40.0, 20.0, 50.0, 20.0),
        ]
    );
}

#[test]
fn partial_path_survives_errors() {
    let (stream, result) = PathStream::from_path_data("M10 10 L20 20 L30");
    let err = result.unwrap_err();

    assert_eq!(err.position, 17);
    assert_eq!(
        replay(&stream),
        vec![Op::MoveTo(10.0, 10.0), Op::LineTo(20.0, 20.0)]
    );
}

#[test]
fn svg_arcs_replay_as_ellipses() {
    let (stream, result) = PathStream::from_path_data("M0 0 A 10 10 0 0 1 20 0");
    assert!(result.is_ok());

    let ops = replay(&stream);
    assert_eq!(ops.len(), 2);
    match ops[1] {
        Op::Ellipse(cx, cy, rx, ry) => {
            assert!((cx - 10.0).abs() < 1e-9);
            assert!(cy.abs() < 1e-9);
            assert!((rx - 10.0).abs() < 1e-9);
            assert!((ry - 10.0).abs() < 1e-9);
        }
        ref other => panic!("expected an ellipse, got {other:?}"),
    }
}

#[test]
fn non_finite_segments_never_reach_the_sink() {
    let mut stream = PathStream::new();
    stream.move_to(0.0, 0.0);
    stream.line_to(f64::NAN, 1.0);
    stream.curve_to(1.0, 2.0, f64::INFINITY, 4.0, 5.0, 6.0);
    stream.line_to(10.0, 0.0);

    assert_eq!(stream.dropped_segments(), 2);
    assert_eq!(
        replay(&stream),
        vec![Op::MoveTo(0.0, 0.0), Op::LineTo(10.0, 0.0)]
    );
}

#[test]
fn raw_appends_are_checked() {
    let mut stream = PathStream::new();

    assert!(stream.append(0, &[1.0, 2.0]).is_ok());
    assert_eq!(
        stream.append(1, &[1.0]),
        Err(StreamError::OperandCount {
            command: 'L',
            expected: 2,
            got: 1
        })
    );
    assert_eq!(stream.append(99, &[]), Err(StreamError::UnexpectedTag(99)));
    // A quarter turn forward, flagged as anticlockwise.
    assert!(matches!(
        stream.append(4, &[0.0, 0.0, 10.0, 10.0, 0.0, PI / 2.0, 0.0, 1.0]),
        Err(StreamError::InvalidArc(_))
    ));
    assert!(stream.append(5, &[0.0, 0.0, 4.0, 4.0]).is_ok());

    assert_eq!(
        replay(&stream),
        vec![Op::MoveTo(1.0, 2.0), Op::Rect(0.0, 0.0, 4.0, 4.0)]
    );
}

#[test]
fn streams_copy_through_replay() {
    let (stream, _) = PathStream::from_path_data("M1 2 Q 3 4 5 6 C 7 8 9 10 11 12 Z");

    let mut copy = PathStream::new();
    stream.replay(&mut copy);

    assert_eq!(
        stream.iter().collect::<Vec<PathCommand>>(),
        copy.iter().collect::<Vec<PathCommand>>()
    );
}

#[test]
fn version_tracks_changes() {
    let mut stream = PathStream::new();
    let v0 = stream.version();

    stream.move_to(1.0, 1.0);
    let v1 = stream.version();
    assert_ne!(v0, v1);

    stream.close_path();
    assert_ne!(stream.version(), v1);

    let v2 = stream.version();
    stream.reset();
    assert_ne!(stream.version(), v2);
    assert!(stream.is_empty());
}

#[test]
fn close_on_empty_stream_is_a_noop() {
    let mut stream = PathStream::new();
    stream.close_path();

    assert!(stream.is_empty());
}

#[test]
fn written_data_parses_back() {
    let mut stream = PathStream::new();
    stream.move_to(10.0, 10.0);
    stream.curve_to(20.0, 0.0, 30.0, 0.0, 40.0, 10.0);
    stream.arc(40.0, 30.0, 20.0, -PI / 2.0, 0.0, false);
    stream.line_to(0.0, 30.0);
    stream.close_path();

    let data = to_path_data(&stream, WriterOptions::new().with_precision(8));
    let (reparsed, result) = PathStream::from_path_data(&data);
    assert!(result.is_ok(), "{data}");

    let data2 = to_path_data(&reparsed, WriterOptions::new().with_precision(8));
    assert_eq!(data, data2);
}

#[test]
fn precision_follows_scale() {
    let mut stream = PathStream::new();
    stream.move_to(1.0 / 3.0, 2.0 / 3.0);

    let options = WriterOptions::new().with_scale(1000.0);
    assert_eq!(options.precision(), precision_for_scale(1000.0));
    assert_eq!(to_path_data(&stream, options), "M0.3333333 0.6666667");
}
