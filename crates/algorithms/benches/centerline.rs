//! Benchmarks for skeleton extraction and centerline finding

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo::Coord;
use meander_algorithms::channel::{
    build_channel_polygon, extract_skeleton_graph, find_centerline, resample_evenly_spaced, smooth,
    BankLines, ChannelAnalysis, RiverParams, SmoothingParams,
};
use meander_core::{Diagnostics, Ellipsoid};

/// Sine-wave channel, 0.0008° wide, `n` points per bank
fn create_sinuous_banks(n: usize) -> BankLines {
    let k = 2.0 * std::f64::consts::PI / 0.01;
    let (amp, half) = (0.002, 0.0004);
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    for i in 0..n {
        let y = 0.02 * i as f64 / (n - 1) as f64;
        let x = amp * (k * y).sin();
        let slope = amp * k * (k * y).cos();
        let norm = (1.0 + slope * slope).sqrt();
        let (nx, ny) = (1.0 / norm, -slope / norm);
        left.push(Coord { x: x - half * nx, y: y - half * ny });
        right.push(Coord { x: x + half * nx, y: y + half * ny });
    }
    BankLines::new(left, right).unwrap()
}

fn bench_skeleton(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel/skeleton");
    group.sample_size(20);
    let e = Ellipsoid::WGS84;
    for n in [100, 250, 500] {
        let banks = create_sinuous_banks(n);
        let bank =
            build_channel_polygon(&banks.left, &banks.right, &mut Diagnostics::new()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n * 2), &n, |b, _| {
            b.iter(|| {
                extract_skeleton_graph(
                    black_box(&banks.left),
                    black_box(&banks.right),
                    &bank.polygon,
                    &e,
                    &mut Diagnostics::new(),
                )
            })
        });
    }
    group.finish();
}

fn bench_shortest_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel/find_centerline");
    let e = Ellipsoid::WGS84;
    for n in [100, 250, 500] {
        let banks = create_sinuous_banks(n);
        let bank =
            build_channel_polygon(&banks.left, &banks.right, &mut Diagnostics::new()).unwrap();
        let mut diag = Diagnostics::new();
        let graph = extract_skeleton_graph(&banks.left, &banks.right, &bank.polygon, &e, &mut diag);
        group.bench_with_input(BenchmarkId::from_parameter(graph.node_count()), &n, |b, _| {
            b.iter(|| {
                find_centerline(black_box(&graph), &bank.top, &bank.bottom, &mut Diagnostics::new())
            })
        });
    }
    group.finish();
}

fn bench_resample(c: &mut Criterion) {
    let mut group = c.benchmark_group("channel/resample_smooth");
    let analysis = ChannelAnalysis::new(create_sinuous_banks(200), RiverParams::default()).unwrap();
    let Some(raw) = analysis.raw_centerline() else {
        return;
    };
    let e = Ellipsoid::WGS84;
    for points in [200, 1000, 5000] {
        group.bench_with_input(BenchmarkId::from_parameter(points), &points, |b, &points| {
            b.iter(|| {
                let even = resample_evenly_spaced(black_box(raw), points, &e).unwrap();
                smooth(&even, &SmoothingParams::default()).unwrap()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_skeleton, bench_shortest_path, bench_resample);
criterion_main!(benches);
