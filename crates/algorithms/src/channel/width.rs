//! Width transects
//!
//! The centerline is cut into windows of `span` points that overlap by one
//! point (`[p0..p(span-1)]`, `[p(span-1)..p(2span-2)]`, ...). For each
//! window a channel direction is estimated in a local metric frame, and a
//! line perpendicular to it is drawn through the window's middle point,
//! long enough to cross the whole channel. Where that line meets the bank
//! ring gives the left and right crossings.

use geo::{Coord, Line};
use meander_core::geometry::{
    envelope, line_ring_crossings, planar_length, point_in_polygon, split_line_inside, Crossing,
};
use meander_core::{DataQualityEvent, Diagnostics, Ellipsoid, Error, LocalProjector, Result};
use serde::{Deserialize, Serialize};

use super::centerline::Centerline;
use super::polygon::{BankPolygon, BankSide};

/// Coordinate-unit distance under which a crossing counts as touching a
/// closure boundary.
pub const CLOSURE_TOLERANCE: f64 = 1e-8;

/// Horizontal deltas below this (meters) are treated as vertical segments.
const MIN_DX: f64 = 1e-9;

/// How the channel direction of a window is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SlopeMode {
    /// Mean of the consecutive-segment slopes; vertical segments are skipped
    #[default]
    Average,
    /// Slope of the chord from the window's first to last point
    Direct,
}

/// Parameters for width transects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidthParams {
    /// Centerline points per window (at least 3)
    pub span: usize,
    pub slope_mode: SlopeMode,
    /// Run conflict resolution on the transects
    pub remove_intersections: bool,
}

impl Default for WidthParams {
    fn default() -> Self {
        Self {
            span: 3,
            slope_mode: SlopeMode::Average,
            remove_intersections: true,
        }
    }
}

/// A bank-to-bank line perpendicular to the local channel direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transect {
    /// Centerline point the transect passes through
    pub anchor: Coord<f64>,
    /// Index of `anchor` in the source centerline
    pub centerline_index: usize,
    /// Crossing with the left bank
    pub left: Coord<f64>,
    /// Crossing with the right bank
    pub right: Coord<f64>,
    /// Channel slope (north/east) in the local metric frame; infinite when
    /// the channel runs due north-south
    pub slope: f64,
}

impl Transect {
    pub fn line(&self) -> Line<f64> {
        Line::new(self.left, self.right)
    }

    /// Left-right distance in coordinate units.
    pub fn width_coord(&self) -> f64 {
        planar_length(self.left, self.right)
    }

    /// Left-right geodesic distance in meters.
    pub fn width_m(&self, ellipsoid: &Ellipsoid) -> f64 {
        ellipsoid.distance(self.left, self.right)
    }
}

/// Start indices of the one-point-overlap windows of `span` points.
pub fn window_starts(len: usize, span: usize) -> impl Iterator<Item = usize> {
    let step = span.saturating_sub(1).max(1);
    (0..len).step_by(step).take_while(move |&s| len - s >= 2)
}

/// Channel direction of a window of projected points, as a unit vector and
/// the slope it represents.
fn window_direction(points: &[Coord<f64>], mode: SlopeMode) -> (Coord<f64>, f64) {
    let slope = match mode {
        SlopeMode::Average => {
            let slopes: Vec<f64> = points
                .windows(2)
                .filter(|w| (w[1].x - w[0].x).abs() > MIN_DX)
                .map(|w| (w[1].y - w[0].y) / (w[1].x - w[0].x))
                .collect();
            if slopes.is_empty() {
                f64::INFINITY
            } else {
                slopes.iter().sum::<f64>() / slopes.len() as f64
            }
        }
        SlopeMode::Direct => {
            let (a, b) = (points[0], points[points.len() - 1]);
            if (b.x - a.x).abs() > MIN_DX {
                (b.y - a.y) / (b.x - a.x)
            } else {
                f64::INFINITY
            }
        }
    };

    let direction = if slope.is_finite() {
        let norm = (1.0 + slope * slope).sqrt();
        Coord { x: 1.0 / norm, y: slope / norm }
    } else {
        Coord { x: 0.0, y: 1.0 }
    };
    (direction, slope)
}

/// Which crossings bound the transect through `anchor`, if any.
///
/// Exactly two crossings are used directly. More than two means the line
/// re-enters the polygon, so the inside piece containing the anchor is
/// used. Fewer than two is tangent or a miss.
fn bounding_crossings(
    line: Line<f64>,
    anchor: Coord<f64>,
    bank: &BankPolygon,
    diagnostics: &mut Diagnostics,
) -> Option<(Crossing, Crossing)> {
    let crossings = line_ring_crossings(line, bank.polygon.ring());
    match crossings.len() {
        0 | 1 => {
            tracing::trace!(
                x = anchor.x,
                y = anchor.y,
                hits = crossings.len(),
                "transect misses channel"
            );
            None
        }
        2 => Some((crossings[0], crossings[1])),
        _ => {
            if !point_in_polygon(bank.polygon.polygon(), anchor) {
                diagnostics.record(DataQualityEvent::AnchorOutsidePolygon { anchor });
                return None;
            }
            // the anchor sits at the middle of the line
            let containing: Vec<(Crossing, Crossing)> =
                split_line_inside(line, bank.polygon.polygon())
                    .into_iter()
                    .filter(|(a, b)| a.t <= 0.5 && 0.5 <= b.t)
                    .collect();
            match containing.as_slice() {
                [piece] => Some(*piece),
                _ => {
                    diagnostics.record(DataQualityEvent::AmbiguousSplit { anchor });
                    None
                }
            }
        }
    }
}

/// Build width transects along a centerline.
///
/// Degenerate windows are skipped, so the result may be partial. Transects
/// touching a closure boundary, crossing one bank twice, or anchored
/// outside the channel are dropped and recorded in `diagnostics`.
///
/// # Errors
/// [`Error::InvalidParameter`] when `span < 3`.
pub fn compute_width_transects(
    centerline: &Centerline,
    bank: &BankPolygon,
    params: &WidthParams,
    ellipsoid: &Ellipsoid,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Transect>> {
    if params.span < 3 {
        return Err(Error::invalid_parameter("span", params.span, "must be at least 3"));
    }

    let coords = centerline.coords();
    let Some(frame) = LocalProjector::centered_on(&bank.polygon.ring().0, ellipsoid) else {
        return Ok(Vec::new());
    };
    let reach = match envelope(&frame.project_all(&bank.polygon.ring().0)) {
        Some(r) => (r.width().powi(2) + r.height().powi(2)).sqrt(),
        None => return Ok(Vec::new()),
    };

    let mut transects = Vec::new();
    for start in window_starts(coords.len(), params.span) {
        let end = (start + params.span).min(coords.len());
        let window = &coords[start..end];
        let mid = window.len() / 2;
        let anchor = window[mid];

        let projector = LocalProjector::new(anchor, ellipsoid);
        let projected = projector.project_all(window);
        let (direction, slope) = window_direction(&projected, params.slope_mode);

        // perpendicular through the anchor (the projector origin)
        let normal = Coord { x: -direction.y, y: direction.x };
        let line = Line::new(
            projector.unproject(Coord { x: -normal.x * reach, y: -normal.y * reach }),
            projector.unproject(Coord { x: normal.x * reach, y: normal.y * reach }),
        );

        let Some((a, b)) = bounding_crossings(line, anchor, bank, diagnostics) else {
            continue;
        };

        let touches_closure = [a, b].iter().any(|x| {
            matches!(bank.polygon.side_of_segment(x.segment), BankSide::Top | BankSide::Bottom)
                || bank.top.distance_to(x.point) < CLOSURE_TOLERANCE
                || bank.bottom.distance_to(x.point) < CLOSURE_TOLERANCE
        });
        if touches_closure {
            diagnostics.record(DataQualityEvent::ClosureArtifact { anchor });
            continue;
        }

        let (left, right) = match (
            bank.polygon.side_of_segment(a.segment),
            bank.polygon.side_of_segment(b.segment),
        ) {
            (BankSide::Left, BankSide::Right) => (a.point, b.point),
            (BankSide::Right, BankSide::Left) => (b.point, a.point),
            _ => {
                diagnostics.record(DataQualityEvent::SameBankCrossing { anchor });
                continue;
            }
        };

        transects.push(Transect {
            anchor,
            centerline_index: start + mid,
            left,
            right,
            slope,
        });
    }

    tracing::debug!(
        windows = window_starts(coords.len(), params.span).count(),
        transects = transects.len(),
        "computed width transects"
    );
    Ok(transects)
}
