use std::collections::HashMap;

use nalgebra as na;
use ndarray::prelude::*;

use crate::NodeId;

/// Pixel-mass centroids of the nodes of one frame, `x` = column, `y` = row.
pub fn find_centroids(nodes: ArrayView2<'_, NodeId>) -> HashMap<NodeId, na::Point2<f64>> {
    let mut sums: HashMap<NodeId, (f64, f64, f64)> = HashMap::new();

    for ((r, c), &node) in nodes.indexed_iter() {
        if node == 0 {
            continue;
        }

        let acc = sums.entry(node).or_insert((0.0, 0.0, 0.0));
        acc.0 += c as f64;
        acc.1 += r as f64;
        acc.2 += 1.0;
    }

    sums.into_iter()
        .map(|(node, (sx, sy, n))| (node, na::Point2::new(sx / n, sy / n)))
        .collect()
}
