use std::collections::{BTreeMap, BTreeSet};

use ndarray::prelude::*;

use crate::frame::Frame;
use crate::{Label, NodeId};

/// Original instance ID to the nodes realizing it within one frame.
///
/// Both the ids and each node list are kept in ascending order, which fixes the
/// iteration order every later tie-break relies on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correspondence<T> {
    map: BTreeMap<T, Vec<NodeId>>,
}

impl<T: Label> Correspondence<T> {
    pub fn new(ids: ArrayView2<'_, T>, nodes: ArrayView2<'_, NodeId>) -> Self {
        let pairs: BTreeSet<(T, NodeId)> = ids
            .iter()
            .zip(nodes.iter())
            .filter(|&(id, &node)| !id.is_zero() && node != 0)
            .map(|(&id, &node)| (id, node))
            .collect();

        let mut map: BTreeMap<T, Vec<NodeId>> = BTreeMap::new();
        for (id, node) in pairs {
            map.entry(id).or_default().push(node);
        }

        Self { map }
    }

    #[inline]
    pub fn from_frame(frame: &Frame<'_, T>) -> Self {
        Self::new(frame.ids, frame.nodes)
    }

    /// Nodes realizing `id`, empty if the id does not occur.
    #[inline]
    pub fn nodes(&self, id: T) -> &[NodeId] {
        self.map.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    #[inline]
    pub fn ids(&self) -> impl Iterator<Item = T> + '_ {
        self.map.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
