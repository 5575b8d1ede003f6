//! B-link tree index.
//!
//! A B-tree whose pages also carry a right link to their next sibling, so
//! the leaves form an ordered chain and a descent that lands on a page
//! split behind its back can recover by moving right.
//!
//! # Components
//! - [`BTree`] - Search, insert and split propagation
//! - [`SharedBTree`] - Many readers, one writer across threads
//! - [`Iter`] - Ordered traversal along the leaf chain
//! - [`TreeStats`] - Operation counters

mod iter;
mod shared;
mod stats;
mod tree;
mod verify;

pub use iter::Iter;
pub use shared::SharedBTree;
pub use stats::{TreeStats, TreeStatsSnapshot};
pub use tree::BTree;
