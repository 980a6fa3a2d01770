//! Skeleton graph extraction
//!
//! Builds the perpendicular-bisector (Voronoi) diagram of all bank points
//! as the dual of a Delaunay triangulation, then keeps only the part that
//! describes the channel's through-going skeleton:
//!
//! 1. Triangulate the bank points (incremental Bowyer-Watson)
//! 2. Diagram vertices are triangle circumcenters; a finite ridge joins the
//!    circumcenters of two triangles sharing an edge. Hull edges would give
//!    rays to infinity and are dropped.
//! 3. Circumcenters that coincide (co-circular bank points) are merged
//! 4. Keep ridges with both endpoints strictly inside the channel polygon
//! 5. Drop ridges touching an endpoint of degree < 2 (leaf spurs)
//!
//! Everything is a pure function of the input order: no randomization, and
//! node indices follow the sorted ridge list.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use geo::Coord;
use meander_core::geometry::point_in_polygon;
use meander_core::{DataQualityEvent, Diagnostics, Ellipsoid};

use super::polygon::ChannelPolygon;
use crate::maybe_rayon::*;

/// Relative slack for the in-circumcircle test; co-circular points are
/// treated as outside.
const IN_CIRCLE_EPS: f64 = 1e-9;
/// Circumcenters closer than this fraction of the point-set extent are merged.
const MERGE_EPS: f64 = 1e-9;
const SUPER_TRIANGLE_SCALE: f64 = 20.0;

/// Circumcircle of a triangle
#[derive(Debug, Clone, Copy)]
struct Circumcircle {
    cx: f64,
    cy: f64,
    radius_sq: f64,
}

/// A triangle defined by three vertex indices, with its cached circumcircle
#[derive(Debug, Clone, Copy)]
struct Triangle {
    v: [usize; 3],
    cc: Option<Circumcircle>,
}

impl Triangle {
    fn new(v: [usize; 3], vertices: &[Coord<f64>]) -> Self {
        let cc = circumcircle(vertices[v[0]], vertices[v[1]], vertices[v[2]]);
        Self { v, cc }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        [(self.v[0], self.v[1]), (self.v[1], self.v[2]), (self.v[2], self.v[0])]
    }
}

#[inline]
fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Compute the circumcircle of three points
fn circumcircle(p0: Coord<f64>, p1: Coord<f64>, p2: Coord<f64>) -> Option<Circumcircle> {
    let (ax, ay) = (p0.x, p0.y);
    let (bx, by) = (p1.x, p1.y);
    let (cx, cy) = (p2.x, p2.y);

    let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
    if d.abs() < 1e-12 {
        return None; // Degenerate triangle
    }

    let ux = ((ax * ax + ay * ay) * (by - cy)
        + (bx * bx + by * by) * (cy - ay)
        + (cx * cx + cy * cy) * (ay - by))
        / d;

    let uy = ((ax * ax + ay * ay) * (cx - bx)
        + (bx * bx + by * by) * (ax - cx)
        + (cx * cx + cy * cy) * (bx - ax))
        / d;

    let dx = ax - ux;
    let dy = ay - uy;

    Some(Circumcircle { cx: ux, cy: uy, radius_sq: dx * dx + dy * dy })
}

/// Build Delaunay triangulation using Bowyer-Watson algorithm.
///
/// Returns vertex-index triples into `points`. Points should be translated
/// close to the origin for numerical stability.
fn delaunay(points: &[Coord<f64>]) -> Vec<[usize; 3]> {
    if points.len() < 3 {
        return Vec::new();
    }

    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for p in points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }

    let dx = max_x - min_x;
    let dy = max_y - min_y;
    let delta = dx.max(dy);
    if delta <= 0.0 {
        return Vec::new();
    }
    let k = SUPER_TRIANGLE_SCALE;

    // Super-triangle vertices occupy indices 0, 1, 2
    let mut vertices: Vec<Coord<f64>> = vec![
        Coord { x: min_x - k * delta, y: min_y - delta },
        Coord { x: min_x + 0.5 * dx, y: max_y + k * delta },
        Coord { x: max_x + k * delta, y: min_y - delta },
    ];
    vertices.extend_from_slice(points);

    let mut triangles: Vec<Triangle> = vec![Triangle::new([0, 1, 2], &vertices)];

    for vi in 3..vertices.len() {
        let point = vertices[vi];

        let in_circle = |tri: &Triangle, slack: f64| {
            tri.cc.is_some_and(|cc| {
                let dx = point.x - cc.cx;
                let dy = point.y - cc.cy;
                dx * dx + dy * dy < cc.radius_sq * (1.0 + slack)
            })
        };

        let mut bad: Vec<usize> = (0..triangles.len())
            .filter(|&ti| in_circle(&triangles[ti], -IN_CIRCLE_EPS))
            .collect();
        if bad.is_empty() {
            bad = (0..triangles.len())
                .filter(|&ti| in_circle(&triangles[ti], IN_CIRCLE_EPS))
                .collect();
        }
        if bad.is_empty() {
            tracing::debug!(x = point.x, y = point.y, "point not inserted into triangulation");
            continue;
        }

        // Boundary of the cavity: edges used by exactly one bad triangle
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for &bi in &bad {
            for (a, b) in triangles[bi].edges() {
                *edge_count.entry(edge_key(a, b)).or_insert(0) += 1;
            }
        }
        let boundary: Vec<(usize, usize)> = bad
            .iter()
            .flat_map(|&bi| triangles[bi].edges())
            .filter(|&(a, b)| edge_count[&edge_key(a, b)] == 1)
            .collect();

        // Remove bad triangles (in reverse order to preserve indices)
        bad.sort_unstable_by(|a, b| b.cmp(a));
        for bi in bad {
            triangles.swap_remove(bi);
        }

        for (a, b) in boundary {
            triangles.push(Triangle::new([a, b, vi], &vertices));
        }
    }

    // Drop triangles touching the super-triangle, remap to input indices
    triangles
        .into_iter()
        .filter(|t| t.v.iter().all(|&v| v >= 3))
        .map(|t| [t.v[0] - 3, t.v[1] - 3, t.v[2] - 3])
        .collect()
}

/// Minimal union-find; the smaller index always becomes the root.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra < rb {
            self.parent[rb] = ra;
        } else if rb < ra {
            self.parent[ra] = rb;
        }
    }
}

/// Undirected weighted skeleton graph stored as a node arena.
///
/// Node `i` sits at `node(i)`; `neighbors(i)` lists `(j, meters)` sorted by
/// `j`. Edge weights are geodesic distances between the endpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkeletonGraph {
    nodes: Vec<Coord<f64>>,
    adjacency: Vec<Vec<(usize, f64)>>,
}

impl SkeletonGraph {
    /// Build a graph from node coordinates and undirected edges.
    ///
    /// Edge weights are geodesic distances on `ellipsoid`. Duplicate edges
    /// and self-loops are ignored.
    pub fn from_edges(
        nodes: Vec<Coord<f64>>,
        edges: impl IntoIterator<Item = (usize, usize)>,
        ellipsoid: &Ellipsoid,
    ) -> Self {
        let unique: BTreeSet<(usize, usize)> = edges
            .into_iter()
            .filter(|&(a, b)| a != b && a < nodes.len() && b < nodes.len())
            .map(|(a, b)| edge_key(a, b))
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (a, b) in unique {
            let w = ellipsoid.distance(nodes[a], nodes[b]);
            adjacency[a].push((b, w));
            adjacency[b].push((a, w));
        }
        for list in &mut adjacency {
            list.sort_by_key(|&(j, _)| j);
        }
        Self { nodes, adjacency }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.edge_count() == 0
    }

    pub fn node(&self, i: usize) -> Coord<f64> {
        self.nodes[i]
    }

    pub fn nodes(&self) -> &[Coord<f64>] {
        &self.nodes
    }

    pub fn neighbors(&self, i: usize) -> &[(usize, f64)] {
        &self.adjacency[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Each undirected edge once, as `(a, b, meters)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.adjacency.iter().enumerate().flat_map(|(a, list)| {
            list.iter().filter(move |&&(b, _)| a < b).map(move |&(b, w)| (a, b, w))
        })
    }
}

/// Extract the channel skeleton from the bank points.
///
/// # Arguments
/// * `left`, `right` - Bank coordinates (lon/lat)
/// * `polygon` - Channel polygon built from the same banks
/// * `ellipsoid` - Model for edge weights
/// * `diagnostics` - Receives [`DataQualityEvent::EmptySkeleton`] when nothing survives
pub fn extract_skeleton_graph(
    left: &[Coord<f64>],
    right: &[Coord<f64>],
    polygon: &ChannelPolygon,
    ellipsoid: &Ellipsoid,
    diagnostics: &mut Diagnostics,
) -> SkeletonGraph {
    // Unique finite input points, first occurrence wins
    let mut seen = HashSet::new();
    let points: Vec<Coord<f64>> = left
        .iter()
        .chain(right.iter())
        .filter(|c| c.x.is_finite() && c.y.is_finite())
        .filter(|c| seen.insert((c.x.to_bits(), c.y.to_bits())))
        .copied()
        .collect();

    if points.len() < 3 {
        diagnostics.record(DataQualityEvent::EmptySkeleton);
        return SkeletonGraph::default();
    }

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
    for p in &points {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    let origin = Coord { x: min_x, y: min_y };
    let extent = (max_x - min_x).max(max_y - min_y);

    let local: Vec<Coord<f64>> = points
        .iter()
        .map(|p| Coord { x: p.x - origin.x, y: p.y - origin.y })
        .collect();
    let triangles = delaunay(&local);

    // Diagram vertices in input coordinates
    let centers: Vec<Option<Coord<f64>>> = triangles
        .iter()
        .map(|t| {
            circumcircle(local[t[0]], local[t[1]], local[t[2]])
                .map(|cc| Coord { x: cc.cx + origin.x, y: cc.cy + origin.y })
        })
        .collect();

    // Delaunay edge -> adjacent triangles
    let mut edge_triangles: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();
    for (ti, t) in triangles.iter().enumerate() {
        for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
            edge_triangles.entry(edge_key(a, b)).or_default().push(ti);
        }
    }

    // Finite ridges join the circumcenters of two triangles
    let ridges: Vec<(usize, usize)> = edge_triangles
        .values()
        .filter(|tris| tris.len() == 2)
        .filter(|tris| centers[tris[0]].is_some() && centers[tris[1]].is_some())
        .map(|tris| (tris[0], tris[1]))
        .collect();

    let merge_tol = MERGE_EPS * extent;
    let mut sets = DisjointSet::new(triangles.len());
    for &(a, b) in &ridges {
        if let (Some(ca), Some(cb)) = (centers[a], centers[b]) {
            if (ca.x - cb.x).hypot(ca.y - cb.y) <= merge_tol {
                sets.union(a, b);
            }
        }
    }
    let roots: Vec<usize> = (0..triangles.len()).map(|i| sets.find(i)).collect();

    let shape = polygon.polygon();
    let inside: Vec<bool> = (0..triangles.len())
        .into_par_iter()
        .map(|i| match centers[i] {
            Some(c) if roots[i] == i => point_in_polygon(shape, c),
            _ => false,
        })
        .collect();

    let kept: BTreeSet<(usize, usize)> = ridges
        .iter()
        .map(|&(a, b)| (roots[a], roots[b]))
        .filter(|&(a, b)| a != b && inside[a] && inside[b])
        .map(|(a, b)| edge_key(a, b))
        .collect();

    let mut degree = vec![0usize; triangles.len()];
    for &(a, b) in &kept {
        degree[a] += 1;
        degree[b] += 1;
    }

    // Node arena in order of first appearance in the sorted ridge list
    let mut index_of: BTreeMap<usize, usize> = BTreeMap::new();
    let mut nodes: Vec<Coord<f64>> = Vec::new();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    for &(a, b) in kept.iter().filter(|&&(a, b)| degree[a] >= 2 && degree[b] >= 2) {
        let mut node_for = |root: usize| {
            *index_of.entry(root).or_insert_with(|| {
                nodes.push(centers[root].unwrap_or(origin));
                nodes.len() - 1
            })
        };
        let na = node_for(a);
        let nb = node_for(b);
        edges.push((na, nb));
    }

    let graph = SkeletonGraph::from_edges(nodes, edges, ellipsoid);

    tracing::debug!(
        points = points.len(),
        triangles = triangles.len(),
        ridges = ridges.len(),
        inside = kept.len(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "extracted skeleton graph"
    );

    if graph.is_empty() {
        diagnostics.record(DataQualityEvent::EmptySkeleton);
    }
    graph
}
