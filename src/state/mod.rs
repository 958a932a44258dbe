//! Per-node layered state and the shared, lock-per-node store.

mod layered;
mod quantity;
mod store;

pub use layered::LayeredState;
pub use quantity::Quantity;
pub use store::LayeredStore;
