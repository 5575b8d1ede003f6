//! pagetree - a paged B-link tree index over a bounded page pool.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagetree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                  │   │
//! │  │   BTree: search, insert, cascading split, root growth    │   │
//! │  │   SharedBTree: concurrent readers, single writer         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                   ↓ page ids, never references                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   PageAllocator (bounded pool) + Page (node layout)      │   │
//! │  │   PageHeader + page image codec (CRC32)                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, Error, config)
//! - [`storage`] - Page pool and page formats
//! - [`index`] - The B-link tree
//!
//! # Quick Start
//! ```
//! use pagetree::{BTree, BTreeConfig};
//!
//! let config = BTreeConfig::new().with_page_capacity(3).with_pool_capacity(10);
//! let mut tree = BTree::new(config).unwrap();
//!
//! tree.insert(1, "a").unwrap();
//! tree.insert(2, "b").unwrap();
//! assert_eq!(tree.search(&2).unwrap(), Some(&"b"));
//! assert_eq!(tree.search(&9).unwrap(), None);
//!
//! // Keys come back in order along the leaf chain.
//! let keys: Vec<i32> = tree.iter().unwrap().map(|e| *e.unwrap().0).collect();
//! assert_eq!(keys, vec![1, 2]);
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BTreeConfig, Error, PageId, Result};

pub use index::btree::{BTree, Iter, SharedBTree, TreeStats, TreeStatsSnapshot};
pub use storage::page::{decode_page, encode_page, Encode, Entry, Page, PageHeader, PageType, Payload};
pub use storage::PageAllocator;
