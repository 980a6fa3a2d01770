//! Centerline path finding
//!
//! Picks the skeleton node nearest each closure boundary as the start/end
//! anchor, then runs Dijkstra over the geodesic edge weights.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::Coord;
use meander_core::{DataQualityEvent, Diagnostics};

use super::centerline::{Centerline, CenterlineKind};
use super::polygon::ClosureBoundary;
use super::skeleton::SkeletonGraph;

/// A node in the priority queue, ordered by distance (min-heap via reversed Ord).
#[derive(Debug, Clone, Copy)]
struct State {
    cost: f64,
    node: usize,
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.node == other.node
    }
}

impl Eq for State {}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse: lower cost has higher priority, then lower index
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Outcome of [`find_centerline`].
///
/// All fields are `None` when no path exists.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterlinePath {
    pub start: Option<Coord<f64>>,
    pub end: Option<Coord<f64>>,
    pub centerline: Option<Centerline>,
}

impl CenterlinePath {
    fn none() -> Self {
        Self { start: None, end: None, centerline: None }
    }
}

/// Nodes nearest the top and bottom closure boundaries.
///
/// Only nodes with at least one neighbor are candidates. Distances are
/// planar, to the closure segment. Ties go to the lowest node index.
pub fn select_anchors(
    graph: &SkeletonGraph,
    top: &ClosureBoundary,
    bottom: &ClosureBoundary,
) -> Option<(usize, usize)> {
    let mut start: Option<(usize, f64)> = None;
    let mut end: Option<(usize, f64)> = None;

    for i in (0..graph.node_count()).filter(|&i| graph.degree(i) > 0) {
        let c = graph.node(i);
        let d_top = top.distance_to(c);
        let d_bottom = bottom.distance_to(c);
        if start.map_or(true, |(_, best)| d_top < best) {
            start = Some((i, d_top));
        }
        if end.map_or(true, |(_, best)| d_bottom < best) {
            end = Some((i, d_bottom));
        }
    }

    Some((start?.0, end?.0))
}

/// Shortest weighted path from `start` to `end` as a node index list.
pub fn shortest_path(graph: &SkeletonGraph, start: usize, end: usize) -> Option<Vec<usize>> {
    let n = graph.node_count();
    if start >= n || end >= n {
        return None;
    }

    let mut dist = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    let mut heap = BinaryHeap::new();

    dist[start] = 0.0;
    heap.push(State { cost: 0.0, node: start });

    while let Some(State { cost, node }) = heap.pop() {
        if node == end {
            break;
        }
        if cost > dist[node] {
            continue;
        }
        for &(next, w) in graph.neighbors(node) {
            let candidate = cost + w;
            if candidate < dist[next] {
                dist[next] = candidate;
                prev[next] = Some(node);
                heap.push(State { cost: candidate, node: next });
            }
        }
    }

    if !dist[end].is_finite() {
        return None;
    }

    let mut path = vec![end];
    let mut current = end;
    while let Some(p) = prev[current] {
        path.push(p);
        current = p;
    }
    path.reverse();
    Some(path)
}

/// Find the raw (Voronoi) centerline between the two closure boundaries.
///
/// A disconnected skeleton is not an error: it is recorded in `diagnostics`
/// and reported as an all-`None` [`CenterlinePath`]. An empty skeleton gives
/// the same result without a new event, since [`extract_skeleton_graph`]
/// has already recorded it.
///
/// [`extract_skeleton_graph`]: super::skeleton::extract_skeleton_graph
pub fn find_centerline(
    graph: &SkeletonGraph,
    top: &ClosureBoundary,
    bottom: &ClosureBoundary,
    diagnostics: &mut Diagnostics,
) -> CenterlinePath {
    let Some((start, end)) = select_anchors(graph, top, bottom) else {
        tracing::debug!("no skeleton nodes to anchor a centerline");
        return CenterlinePath::none();
    };

    let path = shortest_path(graph, start, end).filter(|p| p.len() >= 2);
    let Some(path) = path else {
        diagnostics.record(DataQualityEvent::DisconnectedSkeleton {
            start: graph.node(start),
            end: graph.node(end),
        });
        return CenterlinePath::none();
    };

    tracing::debug!(start, end, nodes = path.len(), "found centerline path");

    let coords: Vec<Coord<f64>> = path.iter().map(|&i| graph.node(i)).collect();
    CenterlinePath {
        start: Some(graph.node(start)),
        end: Some(graph.node(end)),
        centerline: Some(Centerline::new(CenterlineKind::Voronoi, coords)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meander_core::Ellipsoid;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn closures() -> (ClosureBoundary, ClosureBoundary) {
        (
            ClosureBoundary { start: c(0.0, 0.01), end: c(0.01, 0.01) },
            ClosureBoundary { start: c(0.01, 0.0), end: c(0.0, 0.0) },
        )
    }

    /// Ladder: a short direct rung and a longer detour
    fn diamond() -> SkeletonGraph {
        let nodes = vec![
            c(0.005, 0.009), // 0 near top
            c(0.004, 0.005), // 1 direct
            c(0.009, 0.005), // 2 detour
            c(0.005, 0.001), // 3 near bottom
        ];
        SkeletonGraph::from_edges(nodes, vec![(0, 1), (1, 3), (0, 2), (2, 3)], &Ellipsoid::WGS84)
    }

    #[test]
    fn test_anchors() {
        let (top, bottom) = closures();
        assert_eq!(select_anchors(&diamond(), &top, &bottom), Some((0, 3)));
    }

    #[test]
    fn test_anchor_tie_goes_to_first_node() {
        let (top, bottom) = closures();
        let nodes = vec![c(0.003, 0.008), c(0.007, 0.008), c(0.005, 0.002)];
        let g = SkeletonGraph::from_edges(nodes, vec![(0, 1), (1, 2), (0, 2)], &Ellipsoid::WGS84);
        assert_eq!(select_anchors(&g, &top, &bottom), Some((0, 2)));
    }

    #[test]
    fn test_shortest_path_prefers_direct() {
        assert_eq!(shortest_path(&diamond(), 0, 3), Some(vec![0, 1, 3]));
    }

    #[test]
    fn test_find_centerline() {
        let (top, bottom) = closures();
        let mut diag = Diagnostics::new();
        let result = find_centerline(&diamond(), &top, &bottom, &mut diag);
        let line = result.centerline.unwrap();
        assert_eq!(line.kind(), CenterlineKind::Voronoi);
        assert_eq!(line.coords(), &[c(0.005, 0.009), c(0.004, 0.005), c(0.005, 0.001)]);
        assert_eq!(result.start, Some(c(0.005, 0.009)));
        assert_eq!(result.end, Some(c(0.005, 0.001)));
        assert!(diag.is_empty());
    }

    #[test]
    fn test_disconnected_is_not_an_error() {
        let (top, bottom) = closures();
        let nodes = vec![c(0.005, 0.009), c(0.005, 0.008), c(0.005, 0.002), c(0.005, 0.001)];
        let g = SkeletonGraph::from_edges(nodes, vec![(0, 1), (2, 3)], &Ellipsoid::WGS84);
        let mut diag = Diagnostics::new();
        let result = find_centerline(&g, &top, &bottom, &mut diag);
        assert_eq!(result, CenterlinePath { start: None, end: None, centerline: None });
        assert_eq!(diag.count("disconnected_skeleton"), 1);
    }

    #[test]
    fn test_empty_graph() {
        let (top, bottom) = closures();
        let mut diag = Diagnostics::new();
        let result = find_centerline(&SkeletonGraph::default(), &top, &bottom, &mut diag);
        assert!(result.centerline.is_none());
        assert!(result.start.is_none() && result.end.is_none());
        // reported by the skeleton stage, not here
        assert!(diag.is_empty());
    }
}
