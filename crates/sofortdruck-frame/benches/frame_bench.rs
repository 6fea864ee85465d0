// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the framing transform in the sofortdruck-frame
// crate. Exercises the full compose pipeline (cover fit, resize, composite,
// rotate) on a camera-sized synthetic image.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, Rgba, RgbaImage};

use sofortdruck_core::types::{Orientation, PrinterModel};
use sofortdruck_frame::{FramingParams, render_print_canvas};

/// Benchmark the full framing pipeline on a 1024x768 source.
///
/// The source is larger than the Mini print canvas, so this hits the
/// realistic path: Lanczos downscale plus composite plus a 90° rotation for
/// landscape output.
fn bench_render_print_canvas(c: &mut Criterion) {
    let source = DynamicImage::ImageRgba8(RgbaImage::from_fn(1024, 768, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    }));

    let params = FramingParams {
        scale: 1.6,
        offset: (24.0, -12.0),
        preview_size: (390.0, 293.0),
    };

    c.bench_function("render_print_canvas_mini_landscape", |b| {
        b.iter(|| {
            let out = render_print_canvas(
                black_box(&source),
                PrinterModel::Mini,
                Orientation::Landscape,
                black_box(&params),
            )
            .expect("render");
            black_box(out);
        })
    });
}

criterion_group!(benches, bench_render_print_canvas);
criterion_main!(benches);
