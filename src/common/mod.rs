//! Common types and utilities shared across the crate.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and [`BTreeConfig`]
//! - Error types
//! - Identifiers ([`PageId`])

pub mod config;
pub mod error;
mod page_id;

pub use config::BTreeConfig;
pub use error::{Error, Result};
pub use page_id::PageId;
