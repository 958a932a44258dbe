//! Node-indexed store of layered states.
//!
//! Each node sits behind its own `parking_lot::Mutex`, so element assembly
//! can scatter into shared nodes from many worker threads. A caller never
//! holds two node locks at once: read one node, release it, then move on.

use parking_lot::{Mutex, MutexGuard};

use super::layered::LayeredState;
use super::quantity::Quantity;
use crate::types::{LayerIndex, NodeIndex};
use crate::vertical::DepthLevels;

/// All node states of a model plus the shared depth levels.
#[derive(Debug)]
pub struct LayeredStore {
    levels: DepthLevels,
    nodes: Vec<Mutex<LayeredState>>,
}

impl LayeredStore {
    /// Create one dry node per entry of `bottoms`.
    pub fn new(levels: DepthLevels, bottoms: impl IntoIterator<Item = f64>, roughness: f64) -> Self {
        let n_layers = levels.n_layers();
        let nodes = bottoms
            .into_iter()
            .map(|z| Mutex::new(LayeredState::new(n_layers, z, roughness)))
            .collect();
        Self { levels, nodes }
    }

    /// Number of nodes.
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of layers per node.
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.levels.n_layers()
    }

    /// Shared depth levels.
    #[inline]
    pub fn levels(&self) -> &DepthLevels {
        &self.levels
    }

    /// Lock a node for reading or writing.
    #[inline]
    pub fn lock(&self, node: usize) -> MutexGuard<'_, LayeredState> {
        self.nodes[node].lock()
    }

    /// Exclusive access without locking.
    #[inline]
    pub fn get_mut(&mut self, node: usize) -> &mut LayeredState {
        self.nodes[node].get_mut()
    }

    /// Copy of a node's full state.
    pub fn node(&self, node: NodeIndex) -> LayeredState {
        self.lock(node.get()).clone()
    }

    /// Read one channel value.
    pub fn get(&self, node: NodeIndex, layer: LayerIndex, q: Quantity) -> f64 {
        self.lock(node.get()).get(layer.get(), q)
    }

    /// Write one channel value.
    pub fn set(&self, node: NodeIndex, layer: LayerIndex, q: Quantity, value: f64) {
        self.lock(node.get()).set(layer.get(), q, value);
    }

    /// Smallest value of a channel over the layers of a node.
    pub fn min_over_layers(&self, node: NodeIndex, q: Quantity) -> f64 {
        self.lock(node.get()).min_over_layers(q)
    }

    /// Largest value of a channel over the layers of a node.
    pub fn max_over_layers(&self, node: NodeIndex, q: Quantity) -> f64 {
        self.lock(node.get()).max_over_layers(q)
    }

    /// Channel value at a fractional layer position.
    pub fn value_at(&self, node: NodeIndex, position: f64, q: Quantity) -> f64 {
        self.lock(node.get()).value_at(position, q)
    }

    /// Centred vertical difference of a channel.
    pub fn centered_difference(&self, node: NodeIndex, layer: LayerIndex, q: Quantity) -> f64 {
        self.lock(node.get()).centered_difference(layer.get(), q, &self.levels)
    }

    /// Forward (downward) vertical difference of a channel.
    pub fn forward_difference(&self, node: NodeIndex, layer: LayerIndex, q: Quantity) -> f64 {
        self.lock(node.get()).forward_difference(layer.get(), q, &self.levels)
    }

    /// Backward (upward) vertical difference of a channel.
    pub fn backward_difference(&self, node: NodeIndex, layer: LayerIndex, q: Quantity) -> f64 {
        self.lock(node.get()).backward_difference(layer.get(), q, &self.levels)
    }

    /// Set a node's water level, see [`LayeredState::set_water_level`].
    pub fn set_water_level(&self, node: NodeIndex, eta: f64, watt: f64) {
        self.lock(node.get()).set_water_level(eta, &self.levels, watt);
    }

    /// Move a node's bed, see [`LayeredState::set_bottom_level`].
    pub fn set_bottom_level(&self, node: NodeIndex, bottom: f64, watt: f64) {
        self.lock(node.get()).set_bottom_level(bottom, &self.levels, watt);
    }

    /// Run `f` on every node number, in parallel when the `parallel`
    /// feature is enabled.
    pub fn for_each_node<F>(&self, f: F)
    where
        F: Fn(usize) + Send + Sync,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..self.nodes.len()).into_par_iter().for_each(f);
        }
        #[cfg(not(feature = "parallel"))]
        {
            (0..self.nodes.len()).for_each(f);
        }
    }

    /// Water level of every node.
    pub fn water_levels(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.lock().eta).collect()
    }

    /// Water depth of every node.
    pub fn total_depths(&self) -> Vec<f64> {
        self.nodes.iter().map(|n| n.lock().total_depth).collect()
    }
}
