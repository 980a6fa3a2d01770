//! Transect conflict resolution
//!
//! On tight bends neighbouring transects can cross each other. The conflict
//! graph links every pair of crossing transects; a greedy pass then removes
//! transects until no two retained ones intersect.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};

use meander_core::geometry::segments_intersect;

use super::width::Transect;
use crate::maybe_rayon::*;

/// Undirected "segments intersect" graph over a set of transects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictGraph {
    adjacency: Vec<BTreeSet<usize>>,
}

impl ConflictGraph {
    /// Pairwise intersection test over all transects, O(n²).
    pub fn build(transects: &[Transect]) -> Self {
        let lines: Vec<_> = transects.iter().map(Transect::line).collect();
        let n = lines.len();

        let pairs: Vec<Vec<usize>> = (0..n)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..n)
                    .filter(|&j| segments_intersect(&lines[i], &lines[j]))
                    .collect()
            })
            .collect();

        let mut adjacency = vec![BTreeSet::new(); n];
        for (i, hits) in pairs.into_iter().enumerate() {
            for j in hits {
                adjacency[i].insert(j);
                adjacency[j].insert(i);
            }
        }
        Self { adjacency }
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[i].iter().copied()
    }

    pub fn degree(&self, i: usize) -> usize {
        self.adjacency[i].len()
    }

    /// Number of intersecting pairs.
    pub fn conflict_count(&self) -> usize {
        self.adjacency.iter().map(BTreeSet::len).sum::<usize>() / 2
    }
}

/// Indices of the transects the greedy policy removes.
///
/// Repeatedly takes the transect with the highest live degree (lowest index
/// on ties). Above degree one it is removed outright. At degree one the
/// longer of it and its sole neighbour is removed, the higher index on
/// equal lengths.
pub fn conflicting_transects(transects: &[Transect], graph: &ConflictGraph) -> BTreeSet<usize> {
    let n = graph.len();
    let mut degree: Vec<usize> = (0..n).map(|i| graph.degree(i)).collect();
    let mut removed = vec![false; n];
    let mut heap: BinaryHeap<(usize, Reverse<usize>)> =
        (0..n).filter(|&i| degree[i] > 0).map(|i| (degree[i], Reverse(i))).collect();

    while let Some((d, Reverse(i))) = heap.pop() {
        // stale entry
        if removed[i] || d != degree[i] || d == 0 {
            continue;
        }

        let victim = if d > 1 {
            i
        } else {
            let Some(j) = graph.neighbors(i).find(|&j| !removed[j]) else {
                continue;
            };
            let (wi, wj) = (transects[i].width_coord(), transects[j].width_coord());
            if wi > wj || (wi == wj && i > j) {
                i
            } else {
                j
            }
        };

        removed[victim] = true;
        degree[victim] = 0;
        for j in graph.neighbors(victim) {
            if !removed[j] {
                degree[j] -= 1;
                if degree[j] > 0 {
                    heap.push((degree[j], Reverse(j)));
                }
            }
        }
    }

    (0..n).filter(|&i| removed[i]).collect()
}

/// Drop transects until no two retained ones intersect.
///
/// Input order is preserved in the output.
pub fn resolve_conflicts(transects: &[Transect]) -> Vec<Transect> {
    let graph = ConflictGraph::build(transects);
    if graph.conflict_count() == 0 {
        return transects.to_vec();
    }

    let removed = conflicting_transects(transects, &graph);
    tracing::debug!(
        transects = transects.len(),
        conflicts = graph.conflict_count(),
        removed = removed.len(),
        "resolved transect conflicts"
    );

    transects
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, t)| *t)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;

    fn t(index: usize, left: (f64, f64), right: (f64, f64)) -> Transect {
        let left = Coord { x: left.0, y: left.1 };
        let right = Coord { x: right.0, y: right.1 };
        Transect {
            anchor: Coord { x: (left.x + right.x) / 2.0, y: (left.y + right.y) / 2.0 },
            centerline_index: index,
            left,
            right,
            slope: 0.0,
        }
    }

    fn indices(ts: &[Transect]) -> Vec<usize> {
        ts.iter().map(|t| t.centerline_index).collect()
    }

    #[test]
    fn test_parallel_transects_untouched() {
        let ts: Vec<_> = (0..5).map(|i| t(i, (0.0, i as f64), (1.0, i as f64))).collect();
        let graph = ConflictGraph::build(&ts);
        assert_eq!(graph.conflict_count(), 0);
        assert_eq!(resolve_conflicts(&ts), ts);
    }

    #[test]
    fn test_pair_removes_longer() {
        let ts = vec![
            t(0, (0.0, 0.0), (1.0, 1.0)),
            t(1, (0.0, 1.5), (1.5, -0.5)),
            t(2, (0.0, 5.0), (1.0, 5.0)),
        ];
        assert_eq!(indices(&resolve_conflicts(&ts)), vec![0, 2]);
    }

    #[test]
    fn test_pair_tie_removes_higher_index() {
        let ts = vec![t(0, (0.0, 0.0), (1.0, 1.0)), t(1, (0.0, 1.0), (1.0, 0.0))];
        assert_eq!(indices(&resolve_conflicts(&ts)), vec![0]);
    }

    #[test]
    fn test_hub_removed_first() {
        // one diagonal crossing three short parallel transects
        let mut ts: Vec<_> = (0..3)
            .map(|i| {
                let y = 1.0 + i as f64;
                t(i, (0.0, y), (1.0, y))
            })
            .collect();
        ts.push(t(3, (0.0, 0.0), (1.0, 4.0)));

        let graph = ConflictGraph::build(&ts);
        assert_eq!(graph.degree(3), 3);
        assert_eq!(graph.conflict_count(), 3);
        assert_eq!(indices(&resolve_conflicts(&ts)), vec![0, 1, 2]);
    }

    #[test]
    fn test_star_leaves_no_conflicts() {
        let ts: Vec<_> = (0..6)
            .map(|i| {
                let a = i as f64 * std::f64::consts::PI / 6.0;
                let r = 1.0 + 0.1 * i as f64;
                t(i, (-r * a.cos(), -r * a.sin()), (r * a.cos(), r * a.sin()))
            })
            .collect();
        assert_eq!(ConflictGraph::build(&ts).conflict_count(), 15);

        let kept = resolve_conflicts(&ts);
        assert_eq!(kept.len(), 1);
        assert_eq!(ConflictGraph::build(&kept).conflict_count(), 0);
    }

    #[test]
    fn test_empty() {
        assert!(resolve_conflicts(&[]).is_empty());
        assert!(ConflictGraph::build(&[]).is_empty());
    }
}
