//! Centerline resampling
//!
//! Three derivations of the raw skeleton path, each a pure function of its
//! input:
//! - Equal distance: one point every `step_meters` of geodesic arc length
//! - Evenly spaced: exactly `n` points at uniform fractions of arc length
//! - Smoothed: Savitzky-Golay (moving least-squares polynomial) filter
//!
//! Every variant starts at the input's first point and ends at (or within
//! floating-point noise of) its last point.

use std::collections::hash_map::{Entry, HashMap};

use geo::Coord;
use meander_core::{Ellipsoid, Error, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::centerline::{Centerline, CenterlineKind};

/// An emitted point this close to the final input point is snapped onto it
/// instead of being followed by a near-duplicate.
const ENDPOINT_TOLERANCE_M: f64 = 1e-6;

/// Parameters for the arc-length resamplers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleParams {
    /// Geodesic step for the equal-distance variant (meters)
    pub equal_distance_step_m: f64,
    /// Point count for the evenly-spaced variant
    pub evenly_spaced_points: usize,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            equal_distance_step_m: 10.0,
            evenly_spaced_points: 200,
        }
    }
}

/// Parameters for Savitzky-Golay smoothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingParams {
    /// Full window length in points (odd, at least 3)
    pub window: usize,
    /// Polynomial order (less than `window`)
    pub polyorder: usize,
}

impl Default for SmoothingParams {
    fn default() -> Self {
        Self { window: 11, polyorder: 3 }
    }
}

fn require_path(centerline: &Centerline) -> Result<()> {
    if centerline.len() < 2 {
        return Err(Error::invalid_parameter(
            "centerline",
            centerline.len(),
            "at least 2 points are required",
        ));
    }
    Ok(())
}

#[inline]
fn lerp(a: Coord<f64>, b: Coord<f64>, t: f64) -> Coord<f64> {
    Coord { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) }
}

/// Resample at a fixed geodesic step.
///
/// Walks the path accumulating arc length and emits a point every
/// `step_meters`, placed with the direct geodesic problem along the current
/// segment. The final input point is appended, so the last step may be
/// shorter than `step_meters`.
pub fn resample_equal_distance(
    centerline: &Centerline,
    step_meters: f64,
    ellipsoid: &Ellipsoid,
) -> Result<Centerline> {
    if !(step_meters > 0.0) || !step_meters.is_finite() {
        return Err(Error::invalid_parameter(
            "step_meters",
            step_meters,
            "must be a positive finite distance",
        ));
    }
    require_path(centerline)?;

    let coords = centerline.coords();
    let mut out = vec![coords[0]];
    // distance still to travel before the next emission
    let mut remaining = step_meters;

    for w in coords.windows(2) {
        let (a, b) = (w[0], w[1]);
        let g = ellipsoid.inverse(a, b);
        let mut pos = 0.0;
        while g.distance - pos >= remaining {
            pos += remaining;
            out.push(ellipsoid.direct(a, g.initial_azimuth, pos));
            remaining = step_meters;
        }
        remaining -= g.distance - pos;
    }

    let last = coords[coords.len() - 1];
    let n = out.len();
    if n > 1 && ellipsoid.distance(out[n - 1], last) <= ENDPOINT_TOLERANCE_M {
        // snap a final emission that landed on the endpoint
        out[n - 1] = last;
    } else {
        out.push(last);
    }

    Ok(Centerline::new(CenterlineKind::EqualDistance, out))
}

/// Resample to exactly `n_points` at uniform fractions of geodesic arc length.
///
/// The first and last points equal the input's endpoints exactly.
pub fn resample_evenly_spaced(
    centerline: &Centerline,
    n_points: usize,
    ellipsoid: &Ellipsoid,
) -> Result<Centerline> {
    if n_points < 2 {
        return Err(Error::invalid_parameter("n_points", n_points, "must be at least 2"));
    }
    require_path(centerline)?;

    let coords = centerline.coords();
    let mut cumulative = Vec::with_capacity(coords.len());
    cumulative.push(0.0);
    for w in coords.windows(2) {
        let prev = cumulative[cumulative.len() - 1];
        cumulative.push(prev + ellipsoid.distance(w[0], w[1]));
    }
    let total = cumulative[cumulative.len() - 1];
    let last = coords[coords.len() - 1];

    let mut out = Vec::with_capacity(n_points);
    let mut seg = 0;
    for i in 0..n_points {
        if i == n_points - 1 {
            out.push(last);
            break;
        }
        let target = total * i as f64 / (n_points - 1) as f64;
        while seg + 2 < coords.len() && cumulative[seg + 1] < target {
            seg += 1;
        }
        let span = cumulative[seg + 1] - cumulative[seg];
        let t = if span > 0.0 { ((target - cumulative[seg]) / span).clamp(0.0, 1.0) } else { 0.0 };
        out.push(lerp(coords[seg], coords[seg + 1], t));
    }

    Ok(Centerline::new(CenterlineKind::EvenlySpaced, out))
}

/// Savitzky-Golay smoothing weights for the center of a window of
/// `2 * half + 1` points fitted with a polynomial of degree `order`.
///
/// The center weights are `A (AᵀA)⁻¹ e₀`, with `A` the Vandermonde matrix
/// of the window offsets.
fn savgol_weights(half: usize, order: usize) -> Result<Array1<f64>> {
    let len = 2 * half + 1;
    let scale = half.max(1) as f64;

    // offsets normalized to [-1, 1]
    let a = Array2::from_shape_fn((len, order + 1), |(j, p)| {
        ((j as f64 - half as f64) / scale).powi(p as i32)
    });
    let mut e0 = Array1::<f64>::zeros(order + 1);
    e0[0] = 1.0;

    let z = solve_normal(a.t().dot(&a), e0)?;
    Ok(a.dot(&z))
}

/// Solve the small symmetric system `m · x = b` in place by Gaussian
/// elimination with partial pivoting.
fn solve_normal(mut m: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| m[[i, col]].abs().total_cmp(&m[[j, col]].abs()))
            .unwrap_or(col);
        if m[[pivot, col]].abs() < 1e-14 {
            return Err(Error::Algorithm(format!(
                "singular Savitzky-Golay normal matrix at column {}",
                col
            )));
        }
        if pivot != col {
            for j in 0..n {
                m.swap([col, j], [pivot, j]);
            }
            b.swap(col, pivot);
        }

        for row in (col + 1)..n {
            let factor = m[[row, col]] / m[[col, col]];
            for j in col..n {
                let delta = factor * m[[col, j]];
                m[[row, j]] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = ((row + 1)..n).map(|j| m[[row, j]] * x[j]).sum();
        x[row] = (b[row] - tail) / m[[row, row]];
    }
    Ok(x)
}

/// Smooth a centerline with a symmetric Savitzky-Golay filter applied to
/// longitude and latitude independently.
///
/// Near the ends the window shrinks symmetrically (`half = min(half, i,
/// n - 1 - i)`), so the first and last points are kept exactly. Lines
/// shorter than the window use the largest odd window that fits.
pub fn smooth(centerline: &Centerline, params: &SmoothingParams) -> Result<Centerline> {
    if params.window < 3 || params.window % 2 == 0 {
        return Err(Error::invalid_parameter(
            "window",
            params.window,
            "must be an odd number of at least 3",
        ));
    }
    if params.polyorder >= params.window {
        return Err(Error::invalid_parameter(
            "polyorder",
            params.polyorder,
            format!("must be less than the window ({})", params.window),
        ));
    }

    let coords = centerline.coords();
    let n = coords.len();
    let max_half = (params.window / 2).min(n.saturating_sub(1) / 2);

    let mut weights: HashMap<(usize, usize), Array1<f64>> = HashMap::new();
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let half = max_half.min(i).min(n - 1 - i);
        let order = params.polyorder.min(2 * half);
        if half == 0 || order == 2 * half {
            // window fits the polynomial exactly
            out.push(coords[i]);
            continue;
        }
        let w = match weights.entry((half, order)) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => e.insert(savgol_weights(half, order)?),
        };

        let window = &coords[i - half..=i + half];
        let (x, y) = window
            .iter()
            .zip(w.iter())
            .fold((0.0, 0.0), |(sx, sy), (c, &k)| (sx + k * c.x, sy + k * c.y));
        out.push(Coord { x, y });
    }

    Ok(Centerline::new(CenterlineKind::Smoothed, out))
}
