use std::fmt;

use ndarray::Array3;
use serde_derive::{Deserialize, Serialize};

use crate::edge::Edge;
use crate::NodeId;

/// A chain of nodes, one per frame in `start..=end`, named after its first node.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub label: NodeId,
    pub start: usize,
    pub end: usize,
    pub parent: Option<NodeId>,
    pub nodes: Vec<NodeId>,
}

impl Track {
    /// Number of frames in `start..=end`.
    #[inline]
    pub fn span(&self) -> usize {
        self.end + 1 - self.start
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}, {}], nodes {:?}, parent track: ",
            self.label, self.start, self.end, self.nodes
        )?;

        match self.parent {
            Some(parent) => write!(f, "{}", parent),
            None => write!(f, "None"),
        }
    }
}

/// Result of the full pipeline.
#[derive(Debug, Clone)]
pub struct TrackGraph {
    pub tracks: Vec<Track>,
    /// Node-label volume.
    pub nodes: Array3<NodeId>,
    /// Edge lists per transition `z -> z + 1`.
    pub edges: Vec<Vec<Edge>>,
    /// Track-label volume.
    pub labels: Array3<NodeId>,
}

impl TrackGraph {
    pub fn track(&self, label: NodeId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.label == label)
    }

    pub fn track_of(&self, node: NodeId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.nodes.contains(&node))
    }

    pub fn children(&self, label: NodeId) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(move |t| t.parent == Some(label))
    }

    pub fn roots(&self) -> impl Iterator<Item = &Track> {
        self.tracks.iter().filter(|t| t.is_root())
    }

    /// Every track that ends in a split, with the labels of its children.
    pub fn splits(&self) -> Vec<(NodeId, Vec<NodeId>)> {
        self.tracks
            .iter()
            .filter_map(|t| {
                let children: Vec<_> = self.children(t.label).map(|c| c.label).collect();
                (!children.is_empty()).then_some((t.label, children))
            })
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
