use ndarray::prelude::*;

use crate::track::Track;
use crate::NodeId;

/// Dense lookup-table remap: `old[i]` becomes `new[i]`, every other value is kept.
pub fn remap<D: Dimension>(
    volume: ArrayView<'_, NodeId, D>,
    old: &[NodeId],
    new: &[NodeId],
) -> Array<NodeId, D> {
    let size = volume
        .iter()
        .chain(old)
        .copied()
        .max()
        .map_or(0, |max| max as usize + 1);

    let mut table: Vec<NodeId> = (0..size as NodeId).collect();
    for (&from, &to) in old.iter().zip(new) {
        table[from as usize] = to;
    }

    volume.mapv(|v| table[v as usize])
}

/// Track-label volume: every node replaced by the label of its track.
pub fn relabel(nodes: ArrayView3<'_, NodeId>, tracks: &[Track]) -> Array3<NodeId> {
    let (old, new): (Vec<NodeId>, Vec<NodeId>) = tracks
        .iter()
        .flat_map(|t| t.nodes.iter().map(move |&n| (n, t.label)))
        .unzip();

    remap(nodes, &old, &new)
}
