//! Benchmarks for Grad-CAM attribution and overlay rendering.
//!
//! Run with: cargo bench --bench overlay_bench

use burn::prelude::*;
use burn_autodiff::Autodiff;
use burn_ndarray::NdArray;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{Rgb, RgbImage};
use ndarray::Array2;
use rand::Rng;

use tumorlens::all::*;

type InferBackend = Autodiff<NdArray>;

/// Create a random saliency map for benchmarking.
fn create_saliency(side: usize) -> SaliencyMap {
    let mut rng = Seed::new(42).to_rng();
    let values = Array2::from_shape_fn((side, side), |_| rng.gen::<f32>());
    SaliencyMap::new(values).unwrap()
}

/// Create a random RGB scan for benchmarking.
fn create_scan(width: u32, height: u32) -> RgbImage {
    let mut rng = Seed::new(7).to_rng();
    RgbImage::from_fn(width, height, |_, _| {
        let v = rng.gen::<u8>();
        Rgb([v, v, v])
    })
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay_render");

    let compositor = HeatmapCompositor::new(OverlayConfig::default());
    let saliency = create_saliency(61);

    for side in [128u32, 256, 512].iter() {
        let scan = create_scan(*side, *side);

        group.bench_with_input(BenchmarkId::new("additive", side), side, |b, _| {
            b.iter(|| black_box(compositor.render(black_box(&saliency), black_box(&scan))))
        });
    }

    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("saliency_resize");

    let saliency = create_saliency(30);

    for side in [128usize, 512].iter() {
        group.bench_with_input(BenchmarkId::new("bilinear", side), side, |b, &side| {
            b.iter(|| black_box(saliency.resize_bilinear(side, side)))
        });
    }

    group.finish();
}

fn bench_attribute(c: &mut Criterion) {
    let mut group = c.benchmark_group("grad_cam");
    group.sample_size(10); // Full forward + backward at 128x128

    let device = <InferBackend as Backend>::Device::default();
    let model = TumorCnnConfig::default()
        .init::<InferBackend>(&device)
        .unwrap();
    let input = InputTensor::from_rgb(&create_scan(128, 128), DEFAULT_INPUT_SIZE, &device).unwrap();

    group.bench_function("tumor_cnn_128", |b| {
        b.iter(|| black_box(attribute(&model, black_box(&input), None).unwrap()))
    });

    group.finish();
}

criterion_group!(benches, bench_render, bench_resize, bench_attribute);
criterion_main!(benches);
