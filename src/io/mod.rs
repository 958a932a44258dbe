//! Model output: state snapshots and sinks that store or write them.
//!
//! - [`Snapshot`]: copy of levels, depths, layer velocities and bed shear
//! - [`SnapshotRecorder`]: in-memory sink, handy in tests and drivers
//!
//! File formats are left to the caller's [`SnapshotSink`](crate::coupling::SnapshotSink).

mod snapshot;

pub use snapshot::{LayerVelocity, Recording, Snapshot, SnapshotRecorder};
