//! Storage layer - the page pool and page formats.
//!
//! This module handles page ownership and layout:
//! - [`PageAllocator`] - The bounded pool that owns every page
//! - [`page`] - Page nodes, headers and page images

pub mod page;
mod page_allocator;

pub use page_allocator::PageAllocator;
