//! Per-frame connected components under same-identity adjacency.
//!
//! Two neighbouring pixels belong to the same node iff both carry the same
//! non-zero instance ID. Components are grown in raster order, so local labels
//! are ordered by the first pixel of each component. Labeling runs in two
//! phases: every frame is labeled on its own, then a prefix sum over the
//! per-frame maxima shifts each frame into its own id range. With the `rayon`
//! feature the first phase runs on the thread pool.

use log::debug;
use ndarray::prelude::*;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::config::Connectivity;
use crate::error::Error;
use crate::{Label, NodeId};

/// Labels one frame with local ids `1..=max`. Returns the labels and `max`.
pub fn label_frame<T: Label>(
    ids: ArrayView2<'_, T>,
    connectivity: Connectivity,
) -> (Array2<NodeId>, NodeId) {
    let (h, w) = ids.dim();
    let mut nodes = Array2::<NodeId>::zeros((h, w));
    let mut last: NodeId = 0;
    let mut stack = Vec::new();

    for r in 0..h {
        for c in 0..w {
            let id = ids[[r, c]];
            if id.is_zero() || nodes[[r, c]] != 0 {
                continue;
            }

            last += 1;
            nodes[[r, c]] = last;
            stack.push((r, c));

            while let Some((pr, pc)) = stack.pop() {
                for &(dr, dc) in connectivity.offsets() {
                    let (Some(nr), Some(nc)) = (pr.checked_add_signed(dr), pc.checked_add_signed(dc))
                    else {
                        continue;
                    };

                    if nr >= h || nc >= w {
                        continue;
                    }

                    if nodes[[nr, nc]] == 0 && ids[[nr, nc]] == id {
                        nodes[[nr, nc]] = last;
                        stack.push((nr, nc));
                    }
                }
            }
        }
    }

    (nodes, last)
}

#[cfg(feature = "rayon")]
fn label_frames<T: Label>(
    ids: ArrayView3<'_, T>,
    connectivity: Connectivity,
) -> Vec<(Array2<NodeId>, NodeId)> {
    let frames: Vec<_> = ids.outer_iter().collect();

    frames
        .into_par_iter()
        .map(|frame| label_frame(frame, connectivity))
        .collect()
}

#[cfg(not(feature = "rayon"))]
fn label_frames<T: Label>(
    ids: ArrayView3<'_, T>,
    connectivity: Connectivity,
) -> Vec<(Array2<NodeId>, NodeId)> {
    ids.outer_iter()
        .map(|frame| label_frame(frame, connectivity))
        .collect()
}

/// Offset of every frame: the sum of the local maxima of all earlier frames.
pub fn cumulative_offsets<I>(maxima: I) -> Result<Vec<NodeId>, Error>
where
    I: IntoIterator<Item = NodeId>,
{
    let mut total: NodeId = 0;
    let mut offsets = Vec::new();

    for (frame, max) in maxima.into_iter().enumerate() {
        offsets.push(total);
        total = total
            .checked_add(max)
            .ok_or(Error::LabelOverflow { frame })?;
    }

    Ok(offsets)
}

/// Node-label volume for `ids`: globally unique positive ids, `0` kept for background.
pub fn find_components<T: Label>(
    ids: ArrayView3<'_, T>,
    connectivity: Connectivity,
) -> Result<Array3<NodeId>, Error> {
    let locals = label_frames(ids, connectivity);

    let offsets = cumulative_offsets(locals.iter().map(|(_, max)| *max))?;

    let mut nodes = Array3::<NodeId>::zeros(ids.raw_dim());
    for (z, ((local, _), offset)) in locals.iter().zip(offsets).enumerate() {
        nodes
            .index_axis_mut(Axis(0), z)
            .zip_mut_with(local, |dst, &src| {
                *dst = if src == 0 { 0 } else { src + offset };
            });
    }

    debug!(
        "labeled {} frames into {} nodes",
        locals.len(),
        locals.iter().map(|(_, max)| *max).sum::<NodeId>()
    );

    Ok(nodes)
}
