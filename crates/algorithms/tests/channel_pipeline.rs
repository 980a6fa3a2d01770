//! End-to-end tests of the channel pipeline on synthetic channels.
//!
//! - a straight 1° wide rectangle, where every answer is known exactly
//! - a sinuous constant-width channel about 2 km long
//! - a channel pinched to near-zero width at its downstream end

use approx::assert_relative_eq;
use geo::Coord;
use meander_algorithms::channel::{
    resample_equal_distance, BankLines, Centerline, CenterlineKind, ChannelAnalysis, ConflictGraph,
    RiverParams,
};
use meander_core::Ellipsoid;

fn c(x: f64, y: f64) -> Coord<f64> {
    Coord { x, y }
}

const SINUOUS_LENGTH: f64 = 0.02;
const SINUOUS_AMPLITUDE: f64 = 0.002;
const SINUOUS_WAVELENGTH: f64 = 0.01;
const SINUOUS_HALF_WIDTH: f64 = 0.0004;

/// Sine-wave centerline point and its unit normal (pointing east-ish).
fn sine_point(y: f64) -> (Coord<f64>, Coord<f64>) {
    let k = 2.0 * std::f64::consts::PI / SINUOUS_WAVELENGTH;
    let x = SINUOUS_AMPLITUDE * (k * y).sin();
    let dxdy = SINUOUS_AMPLITUDE * k * (k * y).cos();
    let norm = (1.0 + dxdy * dxdy).sqrt();
    (c(x, y), c(1.0 / norm, -dxdy / norm))
}

fn sinuous_banks(n: usize) -> BankLines {
    let mut left = Vec::with_capacity(n);
    let mut right = Vec::with_capacity(n);
    for i in 0..n {
        let y = SINUOUS_LENGTH * i as f64 / (n - 1) as f64;
        let (p, normal) = sine_point(y);
        left.push(c(p.x - SINUOUS_HALF_WIDTH * normal.x, p.y - SINUOUS_HALF_WIDTH * normal.y));
        right.push(c(p.x + SINUOUS_HALF_WIDTH * normal.x, p.y + SINUOUS_HALF_WIDTH * normal.y));
    }
    BankLines::new(left, right).unwrap()
}

fn rectangle() -> BankLines {
    BankLines::new(vec![c(0.0, 0.0), c(0.0, 10.0)], vec![c(1.0, 0.0), c(1.0, 10.0)]).unwrap()
}

// ---------------------------------------------------------------------------
// Straight rectangle
// ---------------------------------------------------------------------------

#[test]
fn rectangle_centerline_is_midline() {
    let analysis = ChannelAnalysis::new(rectangle(), RiverParams::default()).unwrap();
    let raw = analysis.raw_centerline().expect("rectangle has a centerline");
    assert!(raw.len() >= 2);
    for p in raw.coords() {
        assert_relative_eq!(p.x, 0.5, epsilon = 1e-9);
        assert!(p.y > 0.0 && p.y < 10.0);
    }
    assert_eq!(raw.kind(), CenterlineKind::Voronoi);
}

#[test]
fn rectangle_widths_are_one() {
    let mut analysis = ChannelAnalysis::new(rectangle(), RiverParams::default()).unwrap();
    for kind in [CenterlineKind::Voronoi, CenterlineKind::EvenlySpaced, CenterlineKind::Smoothed] {
        let transects = analysis.width_transects(kind).unwrap();
        assert!(!transects.is_empty(), "{:?} produced no transects", kind);
        for t in &transects {
            assert_relative_eq!(t.width_coord(), 1.0, epsilon = 1e-9);
            assert_relative_eq!(t.left.x, 0.0, epsilon = 1e-9);
            assert_relative_eq!(t.right.x, 1.0, epsilon = 1e-9);
        }
    }
    assert!(analysis.diagnostics().is_empty(), "{:?}", analysis.events());
}

#[test]
fn rectangle_evenly_spaced_count() {
    let params = RiverParams {
        resample: meander_algorithms::channel::ResampleParams {
            evenly_spaced_points: 57,
            ..Default::default()
        },
        ..RiverParams::default()
    };
    let analysis = ChannelAnalysis::new(rectangle(), params).unwrap();
    let raw = analysis.raw_centerline().unwrap();
    let even = analysis.centerline(CenterlineKind::EvenlySpaced).unwrap().unwrap();
    assert_eq!(even.len(), 57);
    assert_eq!(even.first(), raw.first());
    assert_eq!(even.last(), raw.last());
}

// ---------------------------------------------------------------------------
// Sinuous channel
// ---------------------------------------------------------------------------

#[test]
fn sinuous_channel_full_pipeline() {
    let e = Ellipsoid::WGS84;
    let mut analysis = ChannelAnalysis::new(sinuous_banks(120), RiverParams::default()).unwrap();
    assert!(analysis.bank_polygon().polygon.is_valid());

    let raw = analysis.raw_centerline().expect("sinuous channel has a centerline").clone();
    let top = analysis.bank_polygon().top;
    let bottom = analysis.bank_polygon().bottom;
    // start near the downstream closure, end near the upstream one
    assert!(top.distance_to(raw.first().unwrap()) < SINUOUS_HALF_WIDTH * 2.0);
    assert!(bottom.distance_to(raw.last().unwrap()) < SINUOUS_HALF_WIDTH * 2.0);

    let transects = analysis.width_transects(CenterlineKind::Smoothed).unwrap();
    assert!(transects.len() > 20, "only {} transects", transects.len());
    assert_eq!(ConflictGraph::build(&transects).conflict_count(), 0);

    let expected = e.distance(c(0.0, 0.0), c(2.0 * SINUOUS_HALF_WIDTH, 0.0));
    for t in &transects {
        let w = t.width_m(&e);
        assert!((w - expected).abs() < 0.05 * expected, "width {} vs {}", w, expected);
    }

    let stats = analysis.statistics(&transects);
    let mean = stats.mean_width_m.unwrap();
    assert!((mean - expected).abs() < 0.03 * expected, "mean width {} vs {}", mean, expected);
    assert!(stats.sinuosity.unwrap() > 1.1);
    assert!(stats.area_m2 > 0.0);
}

#[test]
fn sinuous_skeleton_is_deterministic() {
    let a = ChannelAnalysis::new(sinuous_banks(80), RiverParams::default()).unwrap();
    let b = ChannelAnalysis::new(sinuous_banks(80), RiverParams::default()).unwrap();
    assert_eq!(a.skeleton(), b.skeleton());
    assert_eq!(a.path(), b.path());
}

#[test]
fn equal_distance_steps_within_one_percent() {
    let e = Ellipsoid::WGS84;
    let coords: Vec<_> = (0..2000)
        .map(|i| sine_point(SINUOUS_LENGTH * i as f64 / 1999.0).0)
        .collect();
    let line = Centerline::new(CenterlineKind::Voronoi, coords);

    let step = 25.0;
    let out = resample_equal_distance(&line, step, &e).unwrap();
    let pts = out.coords();
    assert!(pts.len() > 50);
    for w in pts[..pts.len() - 1].windows(2) {
        let d = e.distance(w[0], w[1]);
        assert!((d - step).abs() <= 0.01 * step, "step {}", d);
    }
    assert_eq!(out.first(), line.first());
    assert_eq!(out.last(), line.last());
}

// ---------------------------------------------------------------------------
// Degenerate input
// ---------------------------------------------------------------------------

#[test]
fn pinched_channel_does_not_fail() {
    let n = 11;
    let left: Vec<_> = (0..n).map(|i| c(0.0, 0.001 * i as f64)).collect();
    let right: Vec<_> = (0..n)
        .map(|i| {
            let y = 0.001 * i as f64;
            c(1e-9 + 0.001 * (1.0 - y / 0.01), y)
        })
        .collect();
    let banks = BankLines::new(left, right).unwrap();

    let mut analysis = ChannelAnalysis::new(banks, RiverParams::default()).unwrap();
    match analysis.raw_centerline() {
        Some(line) => assert!(line.len() >= 2),
        None => assert!(!analysis.diagnostics().is_empty()),
    }
    assert!(analysis.width_transects(CenterlineKind::Smoothed).is_ok());
}

#[test]
fn empty_bank_is_rejected() {
    let err = BankLines::new(vec![], vec![c(0.0, 0.0)]).unwrap_err();
    assert!(err.to_string().contains("left"));
}
