//! Criterion benchmarks for the image normalization path.
//!
//! Run with: `cargo bench --bench normalize_bench`
//!
//! ## Benchmarks
//!
//! 1. **Rescale** — elementwise division of a pixel matrix
//! 2. **Fit mean** — column mean over the sample axis
//! 3. **Center** — row-broadcast mean subtraction
//! 4. **IDX parse** — decoding a raw Fashion-MNIST image file

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use iaml_data::data::image::{parse_idx_images, FASHION_PIXELS};
use iaml_data::{rescale, FeatureMean};
use ndarray::Array2;
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use std::path::Path;

/// Random Fashion-MNIST-shaped pixel matrix.
fn synthetic_pixels(num_images: usize) -> Array2<f64> {
    Array2::random((num_images, FASHION_PIXELS), Uniform::new_inclusive(0.0, 255.0))
}

/// Raw IDX image bytes for `num_images` 28×28 images.
fn synthetic_idx(num_images: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(16 + num_images * FASHION_PIXELS);
    bytes.extend_from_slice(&0x0000_0803u32.to_be_bytes());
    bytes.extend_from_slice(&(num_images as u32).to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    bytes.extend_from_slice(&28u32.to_be_bytes());
    bytes.extend((0..num_images * FASHION_PIXELS).map(|i| (i % 256) as u8));
    bytes
}

fn bench_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalization");

    for num_images in [1_000, 10_000] {
        let pixels = synthetic_pixels(num_images);
        let scaled = rescale(&pixels, 255.0);
        let mean = FeatureMean::fit(&scaled).expect("non-empty");

        group.bench_with_input(BenchmarkId::new("rescale", num_images), &pixels, |b, x| {
            b.iter(|| rescale(black_box(x), 255.0));
        });

        group.bench_with_input(BenchmarkId::new("fit_mean", num_images), &scaled, |b, x| {
            b.iter(|| FeatureMean::fit(black_box(x)).expect("fit"));
        });

        group.bench_with_input(BenchmarkId::new("center", num_images), &scaled, |b, x| {
            b.iter(|| mean.center(black_box(x)).expect("center"));
        });
    }

    group.finish();
}

fn bench_idx_parse(c: &mut Criterion) {
    let bytes = synthetic_idx(10_000);
    c.bench_function("parse_idx_images_10k", |b| {
        b.iter(|| parse_idx_images(Path::new("bench"), black_box(&bytes)).expect("parse"));
    });
}

criterion_group!(benches, bench_normalization, bench_idx_parse);
criterion_main!(benches);
