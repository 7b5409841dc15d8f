pub mod centroid;
pub mod config;
pub mod contract;
pub mod correspondence;
pub mod edge;
pub mod error;
pub mod frame;
pub mod label;
pub mod relabel;
pub mod track;

pub use config::{Connectivity, LineageConfig};
pub use edge::Edge;
pub use frame::{stack_frames, Frame};
pub use track::{Track, TrackGraph};

use error::Error;
use log::debug;
use ndarray::prelude::*;
use std::{fmt, hash::Hash};

/// Node ids and track labels.
pub type NodeId = u64;

/// Instance IDs of the input volume.
pub trait Label:
    num_traits::PrimInt + num_traits::Unsigned + Hash + fmt::Debug + Send + Sync + 'static
{
}

impl<T> Label for T where
    T: num_traits::PrimInt + num_traits::Unsigned + Hash + fmt::Debug + Send + Sync + 'static
{
}

pub trait Lineage {
    fn build<T: Label>(&self, ids: ArrayView3<'_, T>) -> Result<TrackGraph, Error>;
}

pub struct LineageBuilder {
    config: LineageConfig,
}

impl LineageBuilder {
    pub fn new(config: LineageConfig) -> Self {
        Self { config }
    }
}

impl Default for LineageBuilder {
    fn default() -> Self {
        Self::new(LineageConfig::default())
    }
}

impl crate::Lineage for LineageBuilder {
    fn build<T: Label>(&self, ids: ArrayView3<'_, T>) -> Result<TrackGraph, Error> {
        let nodes = label::find_components(ids, self.config.connectivity)?;
        let edges = edge::find_edges(ids, nodes.view())?;
        let tracks = contract::contract(&edges, nodes.view())?;
        let labels = relabel::relabel(nodes.view(), &tracks);

        debug!(
            "built lineage of {} tracks over volume {:?}",
            tracks.len(),
            ids.shape()
        );

        Ok(TrackGraph {
            tracks,
            nodes,
            edges,
            labels,
        })
    }
}
