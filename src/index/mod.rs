//! Index structures built on the page pool.

pub mod btree;
