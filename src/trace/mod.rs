//! Line-of-sight queries against the world.
//!
//! The trace tree keeps only what occlusion tests need from the BSP: split
//! planes and a blocking/passing verdict per leaf, decided once at build time.

pub mod node;
pub mod tree;

pub use node::{LeafClass, SplitKind, TraceChild, TraceNode};
pub use tree::TraceTree;
