use std::collections::BTreeSet;

use ndarray::prelude::*;

use crate::error::Error;
use crate::{Label, NodeId};

/// One time-slice: the instance-ID mask together with its node-label mask.
pub struct Frame<'a, T> {
    pub z: usize,
    pub ids: ArrayView2<'a, T>,
    pub nodes: ArrayView2<'a, NodeId>,
}

impl<'a, T: Label> Frame<'a, T> {
    pub fn new(
        z: usize,
        ids: ArrayView2<'a, T>,
        nodes: ArrayView2<'a, NodeId>,
    ) -> Result<Self, Error> {
        if ids.shape() != nodes.shape() {
            return Err(Error::ShapeMismatch {
                frame: z,
                expected: ids.shape().to_vec(),
                found: nodes.shape().to_vec(),
            });
        }

        Ok(Self { z, ids, nodes })
    }

    /// `z`-th frame of a pair of volumes already checked to be of equal shape.
    #[inline]
    pub(crate) fn at(ids: &'a ArrayView3<'_, T>, nodes: &'a ArrayView3<'_, NodeId>, z: usize) -> Self {
        Self {
            z,
            ids: ids.index_axis(Axis(0), z),
            nodes: nodes.index_axis(Axis(0), z),
        }
    }

    /// Distinct non-zero node ids of this frame, ascending.
    #[inline]
    pub fn node_ids(&self) -> BTreeSet<NodeId> {
        node_ids(self.nodes)
    }
}

pub(crate) fn node_ids(nodes: ArrayView2<'_, NodeId>) -> BTreeSet<NodeId> {
    nodes.iter().copied().filter(|&n| n != 0).collect()
}

pub(crate) fn check_same_shape<A, B>(
    ids: &ArrayView3<'_, A>,
    nodes: &ArrayView3<'_, B>,
) -> Result<(), Error> {
    if ids.shape() == nodes.shape() {
        return Ok(());
    }

    let frame = ids
        .outer_iter()
        .zip(nodes.outer_iter())
        .position(|(a, b)| a.shape() != b.shape())
        .unwrap_or_else(|| ids.len_of(Axis(0)).min(nodes.len_of(Axis(0))));

    Err(Error::ShapeMismatch {
        frame,
        expected: ids.shape().to_vec(),
        found: nodes.shape().to_vec(),
    })
}

/// Stacks separately supplied frames into a `[Z, H, W]` volume.
pub fn stack_frames<T: Label>(frames: &[ArrayView2<'_, T>]) -> Result<Array3<T>, Error> {
    let Some(first) = frames.first() else {
        return Ok(Array3::zeros((0, 0, 0)));
    };

    let (h, w) = first.dim();
    let mut volume = Array3::zeros((frames.len(), h, w));

    for (z, frame) in frames.iter().enumerate() {
        if frame.dim() != (h, w) {
            return Err(Error::ShapeMismatch {
                frame: z,
                expected: vec![h, w],
                found: frame.shape().to_vec(),
            });
        }

        volume.index_axis_mut(Axis(0), z).assign(frame);
    }

    Ok(volume)
}
