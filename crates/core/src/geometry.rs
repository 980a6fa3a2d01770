//! Planar geometry primitives
//!
//! Thin helpers over `geo` types used by the channel algorithms: point
//! membership, segment/ring crossings, splitting a line by a polygon and a
//! simple-ring check. All work in whatever planar frame the inputs share.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{BoundingRect, Contains, Coord, Intersects, Line, LineString, Polygon, Rect};

/// Crossings closer than this (as a fraction of the line length) are merged.
const MERGE_TOLERANCE: f64 = 1e-10;

/// A point where a line meets a ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub point: Coord<f64>,
    /// Position along the line, 0 at `line.start`, 1 at `line.end`
    pub t: f64,
    /// Index of the ring segment (`ring.0[i] -> ring.0[i + 1]`) that was hit
    pub segment: usize,
}

/// Strict interior test. Points on the boundary are outside.
pub fn point_in_polygon(polygon: &Polygon<f64>, c: Coord<f64>) -> bool {
    polygon.contains(&c)
}

/// Parameter of the orthogonal projection of `p` onto `line`.
#[inline]
fn line_parameter(line: &Line<f64>, p: Coord<f64>) -> f64 {
    let d = line.delta();
    let len_sq = d.x * d.x + d.y * d.y;
    if len_sq == 0.0 {
        return 0.0;
    }
    ((p.x - line.start.x) * d.x + (p.y - line.start.y) * d.y) / len_sq
}

/// All points where `line` meets `ring`, ordered along the line.
///
/// Collinear overlaps contribute both ends of the overlap. Hits at a shared
/// ring vertex are reported once.
pub fn line_ring_crossings(line: Line<f64>, ring: &LineString<f64>) -> Vec<Crossing> {
    let mut crossings = Vec::new();

    for (segment, edge) in ring.lines().enumerate() {
        if edge.start == edge.end {
            continue;
        }
        match line_intersection(line, edge) {
            Some(LineIntersection::SinglePoint { intersection, .. }) => {
                crossings.push(Crossing {
                    point: intersection,
                    t: line_parameter(&line, intersection),
                    segment,
                });
            }
            Some(LineIntersection::Collinear { intersection }) => {
                for point in [intersection.start, intersection.end] {
                    crossings.push(Crossing { point, t: line_parameter(&line, point), segment });
                }
            }
            None => {}
        }
    }

    crossings.sort_by(|a, b| a.t.total_cmp(&b.t).then(a.segment.cmp(&b.segment)));
    crossings.dedup_by(|next, kept| (next.t - kept.t).abs() < MERGE_TOLERANCE);
    crossings
}

/// Pieces of `line` lying inside `polygon`, as pairs of bounding crossings.
///
/// The line is cut at every boundary crossing; a piece is kept when its
/// midpoint is strictly inside the polygon.
pub fn split_line_inside(line: Line<f64>, polygon: &Polygon<f64>) -> Vec<(Crossing, Crossing)> {
    let crossings = line_ring_crossings(line, polygon.exterior());
    crossings
        .windows(2)
        .filter(|w| {
            let mid = Coord {
                x: (w[0].point.x + w[1].point.x) / 2.0,
                y: (w[0].point.y + w[1].point.y) / 2.0,
            };
            point_in_polygon(polygon, mid)
        })
        .map(|w| (w[0], w[1]))
        .collect()
}

/// Number of intersecting pairs of non-adjacent segments in a closed ring.
///
/// Zero means the ring is simple. Consecutive duplicate vertices are
/// ignored.
pub fn ring_self_intersections(ring: &LineString<f64>) -> usize {
    let edges: Vec<Line<f64>> = ring.lines().filter(|l| l.start != l.end).collect();
    let n = edges.len();
    if n < 4 {
        return 0;
    }
    let closed = ring.is_closed();

    let mut count = 0;
    for i in 0..n {
        for j in (i + 2)..n {
            if closed && i == 0 && j == n - 1 {
                continue;
            }
            if edges[i].intersects(&edges[j]) {
                count += 1;
            }
        }
    }
    count
}

/// Whether two segments share at least one point.
#[inline]
pub fn segments_intersect(a: &Line<f64>, b: &Line<f64>) -> bool {
    a.intersects(b)
}

/// Planar distance from `p` to the segment `a`–`b`.
pub fn point_segment_distance(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let t = line_parameter(&Line::new(a, b), p).clamp(0.0, 1.0);
    let proj = Coord { x: a.x + t * (b.x - a.x), y: a.y + t * (b.y - a.y) };
    ((p.x - proj.x).powi(2) + (p.y - proj.y).powi(2)).sqrt()
}

/// Planar segment length.
#[inline]
pub fn planar_length(a: Coord<f64>, b: Coord<f64>) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

/// Axis-aligned envelope of a set of coordinates.
pub fn envelope(coords: &[Coord<f64>]) -> Option<Rect<f64>> {
    LineString::from(coords.to_vec()).bounding_rect()
}
