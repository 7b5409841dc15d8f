//! Contraction of the temporal node graph into tracks.
//!
//! Frames are visited in order and the node-to-track assignment is threaded
//! through a fold. A node continues the track of its single predecessor unless
//! it was already given a track by a split one frame earlier. A node with more
//! than one successor closes its track and opens one child track per successor
//! right away, so the successors are owned before their frame is visited.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::{debug, warn};
use ndarray::prelude::*;

use crate::edge::Edge;
use crate::error::Error;
use crate::frame::node_ids;
use crate::track::Track;
use crate::NodeId;

#[derive(Debug, Clone)]
struct Pending {
    label: NodeId,
    start: usize,
    end: Option<usize>,
    parent: Option<usize>,
}

/// Track arena plus node ownership, carried from frame to frame.
#[derive(Debug, Clone, Default)]
pub struct Contraction {
    tracks: Vec<Pending>,
    owner: HashMap<NodeId, usize>,
}

fn adjacency(edges: &[Edge], key: fn(&Edge) -> (NodeId, NodeId)) -> HashMap<NodeId, Vec<NodeId>> {
    let mut map: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    for edge in edges {
        let (from, to) = key(edge);
        map.entry(from).or_default().push(to);
    }
    map
}

impl Contraction {
    fn open(&mut self, node: NodeId, start: usize, parent: Option<usize>) -> usize {
        let idx = self.tracks.len();
        self.tracks.push(Pending {
            label: node,
            start,
            end: None,
            parent,
        });
        self.owner.insert(node, idx);
        idx
    }

    /// Classifies the nodes of frame `z`.
    ///
    /// `incoming` are the edges of transition `z - 1 -> z`, `outgoing` those of
    /// `z -> z + 1`.
    pub fn step(
        mut self,
        z: usize,
        frame_nodes: &BTreeSet<NodeId>,
        incoming: &[Edge],
        outgoing: &[Edge],
    ) -> Result<Self, Error> {
        if let Some(e) = incoming.iter().find(|e| !frame_nodes.contains(&e.next)) {
            return Err(Error::UnknownNode { node: e.next, frame: z });
        }
        if let Some(e) = outgoing.iter().find(|e| !frame_nodes.contains(&e.prev)) {
            return Err(Error::UnknownNode { node: e.prev, frame: z });
        }

        let mut seen = HashSet::new();
        if let Some(e) = outgoing.iter().find(|e| !seen.insert(**e)) {
            return Err(Error::DuplicateEdge { prev: e.prev, next: e.next, frame: z });
        }
        seen.clear();
        if let Some(e) = incoming.iter().find(|e| !seen.insert(**e)) {
            return Err(Error::DuplicateEdge {
                prev: e.prev,
                next: e.next,
                frame: z.saturating_sub(1),
            });
        }

        let preds = adjacency(incoming, |e| (e.next, e.prev));
        let succs = adjacency(outgoing, |e| (e.prev, e.next));

        for &node in frame_nodes {
            let ins = preds.get(&node).map(Vec::as_slice).unwrap_or(&[]);
            let outs = succs.get(&node).map(Vec::as_slice).unwrap_or(&[]);

            let track = match (self.owner.get(&node).copied(), ins) {
                (Some(track), _) => track,
                (None, []) => self.open(node, z, None),
                (None, [pred]) => {
                    let track = *self.owner.get(pred).ok_or(Error::UnknownNode {
                        node: *pred,
                        frame: z.saturating_sub(1),
                    })?;
                    self.owner.insert(node, track);
                    track
                }
                (None, many) => {
                    warn!(
                        "z={}: node {} has {} predecessors {:?}, starting a new track",
                        z,
                        node,
                        many.len(),
                        many
                    );
                    self.open(node, z, None)
                }
            };

            if outs.len() > 1 {
                self.tracks[track].end = Some(z);
                for &succ in outs {
                    self.open(succ, z + 1, Some(track));
                }
            } else if outs.is_empty() {
                self.tracks[track].end = Some(z);
            }
        }

        Ok(self)
    }

    /// Distributes the nodes onto their tracks.
    pub fn finish(self) -> Vec<Track> {
        let mut members: Vec<Vec<NodeId>> = vec![Vec::new(); self.tracks.len()];
        for (&node, &track) in &self.owner {
            members[track].push(node);
        }

        let labels: Vec<NodeId> = self.tracks.iter().map(|t| t.label).collect();

        self.tracks
            .into_iter()
            .zip(members)
            .map(|(pending, mut nodes)| {
                nodes.sort_unstable();
                let end = pending
                    .end
                    .unwrap_or(pending.start + nodes.len().saturating_sub(1));

                Track {
                    label: pending.label,
                    start: pending.start,
                    end,
                    parent: pending.parent.map(|idx| labels[idx]),
                    nodes,
                }
            })
            .collect()
    }
}

/// Contracts the edge sequence over the node-label volume into tracks.
pub fn contract(edges: &[Vec<Edge>], nodes: ArrayView3<'_, NodeId>) -> Result<Vec<Track>, Error> {
    let depth = nodes.len_of(Axis(0));
    if edges.len() != depth.saturating_sub(1) {
        return Err(Error::TransitionCount {
            frames: depth,
            transitions: edges.len(),
        });
    }

    let state = (0..depth).try_fold(Contraction::default(), |state, z| {
        let frame_nodes = node_ids(nodes.index_axis(Axis(0), z));
        let incoming = match z {
            0 => &[][..],
            _ => edges[z - 1].as_slice(),
        };
        let outgoing = edges.get(z).map(Vec::as_slice).unwrap_or(&[]);

        state.step(z, &frame_nodes, incoming, outgoing)
    })?;

    let tracks = state.finish();

    debug!(
        "contracted {} frames into {} tracks, {} with a parent",
        depth,
        tracks.len(),
        tracks.iter().filter(|t| t.parent.is_some()).count()
    );

    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(nodes: &[NodeId]) -> BTreeSet<NodeId> {
        nodes.iter().copied().collect()
    }

    fn edges(pairs: &[(NodeId, NodeId)]) -> Vec<Edge> {
        pairs.iter().copied().map(Edge::from).collect()
    }

    fn by_label(mut tracks: Vec<Track>) -> Vec<Track> {
        tracks.sort_by_key(|t| t.label);
        tracks
    }

    #[test]
    fn split_child_is_owned_before_its_frame() {
        let out = edges(&[(1, 2), (1, 3)]);
        let state = Contraction::default()
            .step(0, &set(&[1]), &[], &out)
            .unwrap();

        assert_eq!(state.owner.len(), 3);
        assert_eq!(state.tracks.len(), 3);
        assert_eq!(state.tracks[0].end, Some(0));
        assert_eq!(state.tracks[1].parent, Some(0));
        assert_eq!(state.tracks[2].start, 1);
    }

    #[test]
    fn chain_with_split() {
        // 1 -> 2 -> {3, 4}, 3 -> 5
        let seq = vec![edges(&[(1, 2)]), edges(&[(2, 3), (2, 4)]), edges(&[(3, 5)])];
        let nodes = ndarray::array![[[1u64, 0]], [[2, 0]], [[3, 4]], [[5, 0]]];

        let tracks = by_label(contract(&seq, nodes.view()).unwrap());

        assert_eq!(
            tracks,
            vec![
                Track { label: 1, start: 0, end: 1, parent: None, nodes: vec![1, 2] },
                Track { label: 3, start: 2, end: 3, parent: Some(1), nodes: vec![3, 5] },
                Track { label: 4, start: 2, end: 2, parent: Some(1), nodes: vec![4] },
            ]
        );
    }

    #[test]
    fn consecutive_splits_keep_tracks_disjoint() {
        // 1 -> {2, 3}, 2 -> {4, 5}
        let seq = vec![edges(&[(1, 2), (1, 3)]), edges(&[(2, 4), (2, 5)])];
        let nodes = ndarray::array![[[1u64, 0, 0]], [[2, 3, 0]], [[4, 5, 0]]];

        let tracks = by_label(contract(&seq, nodes.view()).unwrap());

        assert_eq!(tracks.len(), 5);
        assert_eq!(tracks[1], Track { label: 2, start: 1, end: 1, parent: Some(1), nodes: vec![2] });
        assert_eq!(tracks[3].parent, Some(2));
        assert_eq!(tracks[4].parent, Some(2));
        for t in &tracks {
            assert_eq!(t.nodes.len(), t.span());
        }
    }

    #[test]
    fn isolated_node_is_singleton_track() {
        let nodes = ndarray::array![[[0u64, 7]]];
        let tracks = contract(&[], nodes.view()).unwrap();

        assert_eq!(tracks, vec![Track { label: 7, start: 0, end: 0, parent: None, nodes: vec![7] }]);
    }

    #[test]
    fn merge_starts_a_fresh_track() {
        let seq = vec![edges(&[(1, 3), (2, 3)])];
        let nodes = ndarray::array![[[1u64, 2]], [[3, 0]]];

        let tracks = by_label(contract(&seq, nodes.view()).unwrap());

        assert_eq!(tracks.len(), 3);
        assert_eq!((tracks[0].start, tracks[0].end), (0, 0));
        assert_eq!((tracks[1].start, tracks[1].end), (0, 0));
        assert_eq!(tracks[2], Track { label: 3, start: 1, end: 1, parent: None, nodes: vec![3] });
    }

    #[test]
    fn bad_edges_are_rejected() {
        let nodes = ndarray::array![[[1u64]], [[2]]];

        assert_eq!(
            contract(&[edges(&[(1, 9)])], nodes.view()).unwrap_err(),
            Error::UnknownNode { node: 9, frame: 1 }
        );
        assert_eq!(
            contract(&[], nodes.view()).unwrap_err(),
            Error::TransitionCount { frames: 2, transitions: 0 }
        );
    }

    #[test]
    fn repeated_edge_is_rejected() {
        let seq = vec![edges(&[(1, 2), (1, 2)])];
        let nodes = ndarray::array![[[1u64]], [[2]]];

        assert_eq!(
            contract(&seq, nodes.view()).unwrap_err(),
            Error::DuplicateEdge { prev: 1, next: 2, frame: 0 }
        );

        let incoming = edges(&[(1, 2), (1, 2)]);
        assert_eq!(
            Contraction::default()
                .step(1, &set(&[2]), &incoming, &[])
                .unwrap_err(),
            Error::DuplicateEdge { prev: 1, next: 2, frame: 0 }
        );
    }

    #[test]
    fn empty_volume_has_no_tracks() {
        let nodes = Array3::<NodeId>::zeros((0, 2, 2));
        assert!(contract(&[], nodes.view()).unwrap().is_empty());
    }
}
