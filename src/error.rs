//! Error types for the current solver.
//!
//! Every fallible operation in the crate returns [`Result`], an alias over
//! [`SolverError`]. Divergence of the explicit integrator is reported as an
//! error rather than a panic so that callers can persist the failing state
//! before shutting down.

use crate::types::NodeIndex;
use thiserror::Error;

/// Errors raised while building or advancing a current model.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A node value became non-finite or exceeded the divergence threshold.
    #[error("numerical divergence at t = {time:.3} s on node {node}: value {value}")]
    Diverged {
        /// Simulation time of the failing step
        time: f64,
        /// First node found with an offending value
        node: NodeIndex,
        /// The offending value (may be NaN or infinite)
        value: f64,
    },

    /// The integrator stopped after a fatal step and refuses further work.
    #[error("integrator halted after a fatal step")]
    Halted,

    /// A per-node dataset does not match the mesh.
    #[error("{dataset}: expected {expected} node values, found {found}")]
    NodeCountMismatch {
        /// Name of the dataset being loaded
        dataset: &'static str,
        /// Number of mesh nodes
        expected: usize,
        /// Number of values supplied
        found: usize,
    },

    /// A boundary assignment referenced a node that does not exist.
    #[error("boundary assignment references unknown node {node}")]
    UnknownBoundaryNode {
        /// Raw node number as supplied by the caller
        node: usize,
    },

    /// The vertical depth-level sequence is unusable.
    #[error("invalid depth levels: {0}")]
    InvalidLevels(String),

    /// The horizontal mesh is unusable.
    #[error("invalid mesh: {0}")]
    InvalidMesh(String),

    /// A time function or spatial profile is malformed.
    #[error("invalid forcing: {0}")]
    InvalidForcing(String),

    /// A solver parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A time step that is not a positive finite number.
    #[error("invalid time step {0}")]
    InvalidTimeStep(f64),

    /// The roughness collaborator could not deliver its dataset.
    #[error("roughness source failed: {0}")]
    RoughnessSource(#[from] std::io::Error),
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, SolverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diverged_message_names_node() {
        let err = SolverError::Diverged {
            time: 12.5,
            node: NodeIndex::new(7),
            value: f64::NAN,
        };
        let msg = err.to_string();
        assert!(msg.contains("N7"));
        assert!(msg.contains("12.500"));
    }

    #[test]
    fn test_io_error_converts() {
        fn load() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"))?;
            Ok(())
        }
        assert!(matches!(load(), Err(SolverError::RoughnessSource(_))));
    }
}
