//! Leaf storage and collection.

mod gc;
mod leaf_store;

pub use gc::*;
pub use leaf_store::*;
