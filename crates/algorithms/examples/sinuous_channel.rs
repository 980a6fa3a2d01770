//! Sinuous channel demo: full centerline and width pipeline
//!
//! Builds a synthetic meandering river (two sine wavelengths, ~90 m wide,
//! ~2.2 km long near the equator), then:
//!   1. extracts the Voronoi skeleton and raw centerline
//!   2. derives the equal-distance, evenly-spaced and smoothed variants
//!   3. measures width along the smoothed centerline
//!   4. prints river statistics and any data-quality events
//!
//! Run:
//!   cargo run -p meander-algorithms --example sinuous_channel
//!   cargo run -p meander-algorithms --example sinuous_channel -- --verbose

use geo::Coord;
use meander_algorithms::prelude::*;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const BANK_POINTS: usize = 150;
const LENGTH_DEG: f64 = 0.02;
const AMPLITUDE_DEG: f64 = 0.002;
const WAVELENGTH_DEG: f64 = 0.01;
const HALF_WIDTH_DEG: f64 = 0.0004;

fn main() -> Result<()> {
    let verbose = std::env::args().any(|a| a == "--verbose" || a == "-v");
    setup_logging(verbose);

    let banks = build_banks();
    println!(
        "Synthetic channel: {} left / {} right bank points",
        banks.left.len(),
        banks.right.len()
    );

    let mut analysis = CenterlineExtraction.execute_default(banks)?;
    let e = *analysis.ellipsoid();
    println!(
        "Skeleton: {} nodes, {} edges",
        analysis.skeleton().node_count(),
        analysis.skeleton().edge_count()
    );

    for kind in [
        CenterlineKind::Voronoi,
        CenterlineKind::EqualDistance,
        CenterlineKind::EvenlySpaced,
        CenterlineKind::Smoothed,
    ] {
        match analysis.centerline(kind)? {
            Some(line) => println!(
                "  {:<14} {:>5} points, {:>8.1} m",
                format!("{:?}", kind),
                line.len(),
                line.length_m(&e)
            ),
            None => println!("  {:?}: no centerline", kind),
        }
    }

    let transects = analysis.width_transects(CenterlineKind::Smoothed)?;
    let widths: Vec<f64> = transects.iter().map(|t| t.width_m(&e)).collect();
    if let (Some(min), Some(max)) = (
        widths.iter().copied().reduce(f64::min),
        widths.iter().copied().reduce(f64::max),
    ) {
        println!("\nTransects: {} (width {:.1}..{:.1} m)", transects.len(), min, max);
    }

    let stats = analysis.statistics(&transects);
    println!("\nRiver statistics");
    println!("  centerline length : {:>9.1} m", stats.centerline_length_m);
    println!("  left bank length  : {:>9.1} m", stats.left_bank_length_m);
    println!("  right bank length : {:>9.1} m", stats.right_bank_length_m);
    println!("  area              : {:>9.0} m²", stats.area_m2);
    if let Some(s) = stats.sinuosity {
        println!("  sinuosity         : {:>9.3}", s);
    }
    if let Some(w) = stats.mean_width_m {
        println!("  mean width        : {:>9.1} m", w);
    }

    if !analysis.diagnostics().is_empty() {
        println!("\nData-quality events:");
        for event in analysis.events() {
            println!("  [{}] {}", event.kind(), event);
        }
    }
    Ok(())
}

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

/// Banks offset ±HALF_WIDTH_DEG along the normal of a sine centerline.
fn build_banks() -> BankLines {
    let k = 2.0 * std::f64::consts::PI / WAVELENGTH_DEG;
    let mut left = Vec::with_capacity(BANK_POINTS);
    let mut right = Vec::with_capacity(BANK_POINTS);
    for i in 0..BANK_POINTS {
        let y = LENGTH_DEG * i as f64 / (BANK_POINTS - 1) as f64;
        let x = AMPLITUDE_DEG * (k * y).sin();
        let slope = AMPLITUDE_DEG * k * (k * y).cos();
        let norm = (1.0 + slope * slope).sqrt();
        let (nx, ny) = (1.0 / norm, -slope / norm);
        left.push(Coord { x: x - HALF_WIDTH_DEG * nx, y: y - HALF_WIDTH_DEG * ny });
        right.push(Coord { x: x + HALF_WIDTH_DEG * nx, y: y + HALF_WIDTH_DEG * ny });
    }
    BankLines { left, right }
}
