//! River measurements: lengths, area, sinuosity, mean width

use geo::{Area, Coord, LineString, Polygon};
use meander_core::{Ellipsoid, LocalProjector};
use serde::{Deserialize, Serialize};

use super::centerline::Centerline;
use super::polygon::{BankLines, BankPolygon};
use super::width::Transect;

/// Aggregate channel measurements, all in meters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RiverStatistics {
    pub centerline_length_m: f64,
    pub left_bank_length_m: f64,
    pub right_bank_length_m: f64,
    /// Channel polygon area in m²
    pub area_m2: f64,
    /// `None` when the centerline endpoints coincide
    pub sinuosity: Option<f64>,
    /// `None` when there are no transects
    pub mean_width_m: Option<f64>,
}

/// Geodesic length of a centerline.
pub fn centerline_length(centerline: &Centerline, ellipsoid: &Ellipsoid) -> f64 {
    centerline.length_m(ellipsoid)
}

/// Geodesic lengths of the (left, right) banks.
pub fn bank_lengths(banks: &BankLines, ellipsoid: &Ellipsoid) -> (f64, f64) {
    (ellipsoid.path_length(&banks.left), ellipsoid.path_length(&banks.right))
}

/// Channel polygon area in square meters.
///
/// Computed in a local metric frame centered on the polygon, so accuracy
/// degrades for channels spanning many kilometers.
pub fn channel_area(bank: &BankPolygon, ellipsoid: &Ellipsoid) -> f64 {
    let ring: &[Coord<f64>] = &bank.polygon.ring().0;
    let Some(frame) = LocalProjector::centered_on(ring, ellipsoid) else {
        return 0.0;
    };
    Polygon::new(LineString::new(frame.project_all(ring)), vec![]).unsigned_area()
}

/// Centerline length over the straight distance between its endpoints.
///
/// Always ≥ 1 for a non-degenerate path.
pub fn sinuosity(centerline: &Centerline, ellipsoid: &Ellipsoid) -> Option<f64> {
    let (first, last) = (centerline.first()?, centerline.last()?);
    let straight = ellipsoid.distance(first, last);
    if straight <= 0.0 {
        return None;
    }
    Some(centerline.length_m(ellipsoid) / straight)
}

/// Mean geodesic left-right distance.
pub fn mean_width(transects: &[Transect], ellipsoid: &Ellipsoid) -> Option<f64> {
    if transects.is_empty() {
        return None;
    }
    let total: f64 = transects.iter().map(|t| t.width_m(ellipsoid)).sum();
    Some(total / transects.len() as f64)
}

/// All measurements at once. A missing centerline gives zero length and no
/// sinuosity.
pub fn river_statistics(
    banks: &BankLines,
    bank: &BankPolygon,
    centerline: Option<&Centerline>,
    transects: &[Transect],
    ellipsoid: &Ellipsoid,
) -> RiverStatistics {
    let (left, right) = bank_lengths(banks, ellipsoid);
    RiverStatistics {
        centerline_length_m: centerline.map_or(0.0, |c| centerline_length(c, ellipsoid)),
        left_bank_length_m: left,
        right_bank_length_m: right,
        area_m2: channel_area(bank, ellipsoid),
        sinuosity: centerline.and_then(|c| sinuosity(c, ellipsoid)),
        mean_width_m: mean_width(transects, ellipsoid),
    }
}
