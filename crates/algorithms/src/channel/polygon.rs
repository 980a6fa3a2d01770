//! Bank polygon construction
//!
//! Closes two ordered bank polylines into a single channel ring:
//! `left ++ reverse(right) ++ [left[0]]`. The two segments that join the
//! banks are synthetic closure boundaries, "top" (last left → last right)
//! and "bottom" (first right → first left).

use geo::{Coord, LineString, Polygon};
use meander_core::geometry::{point_segment_distance, ring_self_intersections};
use meander_core::{DataQualityEvent, Diagnostics, Error, Result};
use serde::{Deserialize, Serialize};

/// Which part of the channel ring a ring segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BankSide {
    Left,
    Right,
    /// Synthetic closure at the downstream end
    Top,
    /// Synthetic closure at the upstream end
    Bottom,
}

/// Ordered left/right bank coordinates (`x = lon`, `y = lat`).
#[derive(Debug, Clone, PartialEq)]
pub struct BankLines {
    pub left: Vec<Coord<f64>>,
    pub right: Vec<Coord<f64>>,
}

impl BankLines {
    /// Validate and wrap the two banks. Both must be non-empty.
    pub fn new(left: Vec<Coord<f64>>, right: Vec<Coord<f64>>) -> Result<Self> {
        if left.is_empty() {
            return Err(Error::EmptyBank("left"));
        }
        if right.is_empty() {
            return Err(Error::EmptyBank("right"));
        }
        Ok(Self { left, right })
    }

    /// Insert `n` evenly spaced points between each consecutive pair of
    /// points on both banks.
    pub fn densified(&self, n: usize) -> Self {
        Self {
            left: densify(&self.left, n),
            right: densify(&self.right, n),
        }
    }

    /// All bank points, left bank first.
    pub fn all_points(&self) -> Vec<Coord<f64>> {
        self.left.iter().chain(self.right.iter()).copied().collect()
    }
}

/// Parameters for bank preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankParams {
    /// Points inserted between each pair of consecutive bank points before
    /// polygon and skeleton construction. 0 disables densification.
    pub densify: usize,
}

impl Default for BankParams {
    fn default() -> Self {
        Self { densify: 5 }
    }
}

/// Linear densification of a polyline.
pub fn densify(coords: &[Coord<f64>], n: usize) -> Vec<Coord<f64>> {
    if n == 0 || coords.len() < 2 {
        return coords.to_vec();
    }
    let mut out = Vec::with_capacity((coords.len() - 1) * (n + 1) + 1);
    for w in coords.windows(2) {
        let (a, b) = (w[0], w[1]);
        out.push(a);
        for k in 1..=n {
            let t = k as f64 / (n + 1) as f64;
            out.push(Coord { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) });
        }
    }
    if let Some(&last) = coords.last() {
        out.push(last);
    }
    out
}

/// A synthetic segment closing the bank ring at one end of the channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClosureBoundary {
    pub start: Coord<f64>,
    pub end: Coord<f64>,
}

impl ClosureBoundary {
    /// Planar distance from a coordinate to this boundary segment.
    pub fn distance_to(&self, c: Coord<f64>) -> f64 {
        point_segment_distance(c, self.start, self.end)
    }
}

/// Closed channel ring with knowledge of which segments are real bank.
#[derive(Debug, Clone)]
pub struct ChannelPolygon {
    polygon: Polygon<f64>,
    left_len: usize,
    right_len: usize,
    self_intersections: usize,
}

impl ChannelPolygon {
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Closed exterior ring
    pub fn ring(&self) -> &LineString<f64> {
        self.polygon.exterior()
    }

    /// Whether the ring is simple (no self-intersections).
    pub fn is_valid(&self) -> bool {
        self.self_intersections == 0
    }

    pub fn self_intersections(&self) -> usize {
        self.self_intersections
    }

    /// Classify ring segment `i` (`ring[i] -> ring[i + 1]`).
    pub fn side_of_segment(&self, i: usize) -> BankSide {
        let l = self.left_len;
        let r = self.right_len;
        if i + 1 < l {
            BankSide::Left
        } else if i + 1 == l {
            BankSide::Top
        } else if i + 1 < l + r {
            BankSide::Right
        } else {
            BankSide::Bottom
        }
    }
}

/// Output of [`build_channel_polygon`].
#[derive(Debug, Clone)]
pub struct BankPolygon {
    pub polygon: ChannelPolygon,
    pub top: ClosureBoundary,
    pub bottom: ClosureBoundary,
}

/// Build the channel polygon and its two closure boundaries.
///
/// A self-intersecting ring is not an error: it is recorded as
/// [`DataQualityEvent::InvalidPolygon`] and returned as-is so the later
/// stages can still make a best-effort attempt.
pub fn build_channel_polygon(
    left: &[Coord<f64>],
    right: &[Coord<f64>],
    diagnostics: &mut Diagnostics,
) -> Result<BankPolygon> {
    let (first_left, last_left) = match (left.first(), left.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(Error::EmptyBank("left")),
    };
    let (first_right, last_right) = match (right.first(), right.last()) {
        (Some(f), Some(l)) => (*f, *l),
        _ => return Err(Error::EmptyBank("right")),
    };

    let mut ring: Vec<Coord<f64>> = Vec::with_capacity(left.len() + right.len() + 1);
    ring.extend_from_slice(left);
    ring.extend(right.iter().rev().copied());
    ring.push(first_left);

    let ring = LineString::new(ring);
    let self_intersections = ring_self_intersections(&ring);
    if self_intersections > 0 {
        diagnostics.record(DataQualityEvent::InvalidPolygon { self_intersections });
    }

    tracing::debug!(
        left = left.len(),
        right = right.len(),
        valid = self_intersections == 0,
        "built channel polygon"
    );

    Ok(BankPolygon {
        polygon: ChannelPolygon {
            polygon: Polygon::new(ring, vec![]),
            left_len: left.len(),
            right_len: right.len(),
            self_intersections,
        },
        top: ClosureBoundary { start: last_left, end: last_right },
        bottom: ClosureBoundary { start: first_right, end: first_left },
    })
}
