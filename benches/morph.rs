use std::f64::consts::PI;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vgkernel::{MorphOptions, MorphPlan, PathStream};

fn circle() -> PathStream {
    let mut stream = PathStream::new();
    stream.move_to(150.0, 100.0);
    stream.arc(100.0, 100.0, 50.0, 0.0, 2.0 * PI, false);
    stream.close_path();
    stream
}

fn star(points: usize) -> PathStream {
    let mut stream = PathStream::new();

    for i in 0..points * 2 {
        let r = if i % 2 == 0 { 50.0 } else { 20.0 };
        let angle = -PI / 2.0 + i as f64 * PI / points as f64;
        stream.line_to(100.0 + r * angle.cos(), 100.0 + r * angle.sin());
    }

    stream.close_path();
    stream
}

fn morph(c: &mut Criterion) {
    let from = circle();
    let to = star(12);

    c.bench_function("plan circle to star", |b| {
        b.iter(|| MorphPlan::new(black_box(&from), black_box(&to), &MorphOptions::default()));
    });

    c.bench_function("interpolate circle to star", |b| {
        let plan = MorphPlan::new(&from, &to, &MorphOptions::default());

        b.iter(|| plan.interpolate(black_box(0.37)));
    });
}

criterion_group!(benches, morph);
criterion_main!(benches);
