//! Vertical discretization.
//!
//! The model uses fixed z-levels rather than terrain-following coordinates:
//! every node shares the same [`DepthLevels`], and the free surface and bed
//! cut through whichever layers they fall in.

mod levels;

pub use levels::DepthLevels;
