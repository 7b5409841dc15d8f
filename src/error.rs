use thiserror::Error;

use crate::NodeId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Shape Mismatch: frame {frame} has shape {found:?}, expected {expected:?}")]
    ShapeMismatch {
        frame: usize,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Label Overflow: node ids of frame {frame} do not fit into u64")]
    LabelOverflow { frame: usize },

    #[error("Transition Count: {frames} frames need {} edge lists, got {transitions}", .frames.saturating_sub(1))]
    TransitionCount { frames: usize, transitions: usize },

    #[error("Duplicate Edge: {prev} -> {next} listed twice after frame {frame}")]
    DuplicateEdge {
        prev: NodeId,
        next: NodeId,
        frame: usize,
    },

    #[error("Unknown Node: edge references node {node} which is not in frame {frame}")]
    UnknownNode { node: NodeId, frame: usize },
}
