//! Temporal edges between the nodes of consecutive frames.
//!
//! Nodes are linked through the instance ID they share. One-to-one and
//! one-to-many patterns are linked directly; every other pattern is resolved by
//! greedy nearest-centroid matching. Equal distances are ordered by
//! `(prev, next)` node id, so the result never depends on hash or sort
//! stability.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use log::{debug, trace, warn};
use nalgebra as na;
use ndarray::prelude::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::centroid::find_centroids;
use crate::correspondence::Correspondence;
use crate::error::Error;
use crate::frame::{check_same_shape, Frame};
use crate::{Label, NodeId};

/// Directed link from a node in frame `z` to a node in frame `z + 1`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub prev: NodeId,
    pub next: NodeId,
}

impl Edge {
    #[inline]
    pub fn new(prev: NodeId, next: NodeId) -> Self {
        Self { prev, next }
    }
}

impl From<(NodeId, NodeId)> for Edge {
    #[inline]
    fn from((prev, next): (NodeId, NodeId)) -> Self {
        Self::new(prev, next)
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist: f64,
    prev: NodeId,
    next: NodeId,
}

impl Candidate {
    fn order(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then(self.prev.cmp(&other.prev))
            .then(self.next.cmp(&other.next))
    }
}

/// Greedy two-pass matching of `prev` onto `next` by centroid distance.
///
/// The first pass links mutually unused pairs closest first. The second pass
/// gives every still unlinked next node its closest prev node, used or not.
/// Prev nodes left over after the first pass get no edge.
pub fn match_nearest(
    prev: &[NodeId],
    next: &[NodeId],
    centers: &HashMap<NodeId, na::Point2<f64>>,
) -> Vec<Edge> {
    let mut pairs = Vec::with_capacity(prev.len() * next.len());
    for &p in prev {
        for &n in next {
            let dist = match (centers.get(&p), centers.get(&n)) {
                (Some(a), Some(b)) => na::distance(a, b),
                _ => f64::INFINITY,
            };
            pairs.push(Candidate { dist, prev: p, next: n });
        }
    }
    pairs.sort_by(Candidate::order);

    let mut free_prev: BTreeSet<NodeId> = prev.iter().copied().collect();
    let mut free_next: BTreeSet<NodeId> = next.iter().copied().collect();
    let mut edges = Vec::with_capacity(next.len());

    for c in &pairs {
        if free_prev.contains(&c.prev) && free_next.contains(&c.next) {
            edges.push(Edge::new(c.prev, c.next));
            free_prev.remove(&c.prev);
            free_next.remove(&c.next);
        }
    }

    for c in &pairs {
        if free_next.remove(&c.next) {
            edges.push(Edge::new(c.prev, c.next));
        }
    }

    if !free_prev.is_empty() {
        warn!(
            "{} predecessor node(s) {:?} end without successor: merge is not represented",
            free_prev.len(),
            free_prev
        );
    }

    edges
}

/// Edges from frame `prev` to frame `next`.
pub fn find_edges_between<T: Label>(prev: &Frame<'_, T>, next: &Frame<'_, T>) -> Vec<Edge> {
    let corr_prev = Correspondence::from_frame(prev);
    let corr_next = Correspondence::from_frame(next);

    let ids: BTreeSet<T> = corr_prev.ids().chain(corr_next.ids()).collect();

    let mut centers: Option<HashMap<NodeId, na::Point2<f64>>> = None;
    let mut edges = Vec::new();

    for id in ids {
        let prev_nodes = corr_prev.nodes(id);
        let next_nodes = corr_next.nodes(id);

        match (prev_nodes, next_nodes) {
            ([], _) => trace!("z={}: id {:?} starts", next.z, id),
            (_, []) => trace!("z={}: id {:?} ends", prev.z, id),
            ([p], [n]) => edges.push(Edge::new(*p, *n)),
            ([p], ns) => {
                trace!("z={}: id {:?} splits into {}", prev.z, id, ns.len());
                edges.extend(ns.iter().map(|&n| Edge::new(*p, n)));
            }
            (ps, ns) => {
                trace!(
                    "z={}: id {:?} is ambiguous ({} -> {} nodes)",
                    prev.z,
                    id,
                    ps.len(),
                    ns.len()
                );

                let centers = centers.get_or_insert_with(|| {
                    let mut map = find_centroids(prev.nodes);
                    map.extend(find_centroids(next.nodes));
                    map
                });

                edges.extend(match_nearest(ps, ns, centers));
            }
        }
    }

    edges
}

fn transition<T: Label>(
    ids: &ArrayView3<'_, T>,
    nodes: &ArrayView3<'_, NodeId>,
    z: usize,
) -> Vec<Edge> {
    let prev = Frame::at(ids, nodes, z - 1);
    let next = Frame::at(ids, nodes, z);

    find_edges_between(&prev, &next)
}

#[cfg(feature = "rayon")]
fn transitions<T: Label>(ids: &ArrayView3<'_, T>, nodes: &ArrayView3<'_, NodeId>) -> Vec<Vec<Edge>> {
    (1..ids.len_of(Axis(0)))
        .into_par_iter()
        .map(|z| transition(ids, nodes, z))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn transitions<T: Label>(ids: &ArrayView3<'_, T>, nodes: &ArrayView3<'_, NodeId>) -> Vec<Vec<Edge>> {
    (1..ids.len_of(Axis(0)))
        .map(|z| transition(ids, nodes, z))
        .collect()
}

/// Edge lists for every transition `z -> z + 1`, ordered by `z`.
pub fn find_edges<T: Label>(
    ids: ArrayView3<'_, T>,
    nodes: ArrayView3<'_, NodeId>,
) -> Result<Vec<Vec<Edge>>, Error> {
    check_same_shape(&ids, &nodes)?;

    let edges = transitions(&ids, &nodes);

    debug!(
        "found {} edges over {} transitions",
        edges.iter().map(Vec::len).sum::<usize>(),
        edges.len()
    );

    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn centers(points: &[(NodeId, f64, f64)]) -> HashMap<NodeId, na::Point2<f64>> {
        points
            .iter()
            .map(|&(n, x, y)| (n, na::Point2::new(x, y)))
            .collect()
    }

    #[test]
    fn greedy_matches_closest_first() {
        let c = centers(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 9.0, 0.0), (4, 1.0, 0.0)]);
        let edges = match_nearest(&[1, 2], &[3, 4], &c);

        assert_eq!(edges, vec![Edge::new(1, 4), Edge::new(2, 3)]);
    }

    #[test]
    fn leftover_next_nodes_attach_to_closest_prev() {
        let c = centers(&[
            (1, 0.0, 0.0),
            (2, 10.0, 0.0),
            (3, 0.0, 1.0),
            (4, 10.0, 1.0),
            (5, 11.0, 0.0),
        ]);
        let edges = match_nearest(&[1, 2], &[3, 4, 5], &c);

        assert_eq!(
            edges,
            vec![Edge::new(1, 3), Edge::new(2, 4), Edge::new(2, 5)]
        );
    }

    #[test]
    fn surplus_prev_nodes_get_no_edge() {
        let c = centers(&[(1, 0.0, 0.0), (2, 10.0, 0.0), (3, 9.0, 0.0)]);
        let edges = match_nearest(&[1, 2], &[3], &c);

        assert_eq!(edges, vec![Edge::new(2, 3)]);
    }

    #[test]
    fn equal_distances_break_on_node_ids() {
        // both prev nodes are equally far from both next nodes
        let c = centers(&[(1, 0.0, 0.0), (2, 2.0, 0.0), (3, 1.0, 1.0), (4, 1.0, -1.0)]);
        let edges = match_nearest(&[2, 1], &[4, 3], &c);

        assert_eq!(edges, vec![Edge::new(1, 3), Edge::new(2, 4)]);
    }

    #[test]
    fn transition_patterns() {
        // id 1 continues, id 2 splits, id 3 ends, id 4 starts
        let ids = array![
            [[1u32, 0, 2, 2, 0, 3]],
            [[1u32, 0, 2, 0, 2, 4]],
        ];
        let nodes = array![
            [[1u64, 0, 2, 2, 0, 3]],
            [[4u64, 0, 5, 0, 6, 7]],
        ];

        let edges = find_edges(ids.view(), nodes.view()).unwrap();

        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0],
            vec![Edge::new(1, 4), Edge::new(2, 5), Edge::new(2, 6)]
        );
    }

    #[test]
    fn transitions_stay_ordered_by_frame() {
        // one object walking right, one node per frame
        let ids = Array3::from_shape_fn((6, 1, 6), |(z, _, c)| u16::from(c == z));
        let nodes = Array3::from_shape_fn((6, 1, 6), |(z, _, c)| {
            if c == z {
                z as NodeId + 1
            } else {
                0
            }
        });

        let edges = find_edges(ids.view(), nodes.view()).unwrap();

        let expected: Vec<Vec<Edge>> = (1..6).map(|z| vec![Edge::new(z, z + 1)]).collect();
        assert_eq!(edges, expected);
    }

    #[test]
    fn mismatched_volumes_are_rejected() {
        let ids = Array3::<u8>::zeros((2, 3, 3));
        let nodes = Array3::<NodeId>::zeros((2, 3, 4));

        assert!(matches!(
            find_edges(ids.view(), nodes.view()),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
