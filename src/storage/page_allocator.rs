//! Page Allocator - the bounded page pool.
//!
//! The [`PageAllocator`] owns every page of a tree:
//! - Handing out fresh pages with new identifiers
//! - Resolving identifiers back to pages
//! - Refusing to grow past its configured capacity

use tracing::error;

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;

/// Owns a bounded pool of page slots.
///
/// # Pool Layout
/// Pages are stored in allocation order, so a page's identifier is also its
/// slot index:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬ ─ ─ ─ ─ ─ ┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │  free ...   capacity
/// └─────────┴─────────┴─────────┴─────────┴ ─ ─ ─ ─ ─ ┘
///                                        ▲
///                                  next free id
/// ```
///
/// Identifiers are never reused and pages are never moved or freed. The
/// allocator knows nothing about tree structure; it only stores pages.
///
/// # Thread Safety
/// `PageAllocator` is **single-threaded**. Shared access goes through
/// [`SharedBTree`](crate::SharedBTree), which serializes writers.
#[derive(Debug)]
pub struct PageAllocator<K, V> {
    pages: Vec<Page<K, V>>,
    /// Maximum number of pages in the pool.
    capacity: u32,
    /// Entries per page, handed to every page created here.
    page_capacity: usize,
}

impl<K: Ord, V> PageAllocator<K, V> {
    /// Create an empty pool.
    ///
    /// # Arguments
    /// * `capacity` - Number of page slots in the pool
    /// * `page_capacity` - Entries at which a page splits
    pub fn new(capacity: u32, page_capacity: usize) -> Self {
        Self {
            pages: Vec::new(),
            capacity,
            page_capacity,
        }
    }

    /// Allocate the next page identifier and register an empty leaf for it.
    ///
    /// # Errors
    /// Returns `Error::OutOfSpace` when every slot has been handed out.
    pub fn alloc_page(&mut self) -> Result<&mut Page<K, V>> {
        let next = self.next_free_id();
        if next.0 >= self.capacity {
            return Err(Error::OutOfSpace {
                capacity: self.capacity,
            });
        }

        self.pages.push(Page::new(next, self.page_capacity));
        Ok(&mut self.pages[next.as_index()])
    }

    /// Check that `count` more pages can be allocated.
    ///
    /// # Errors
    /// Returns `Error::OutOfSpace` if fewer than `count` slots remain.
    pub fn ensure_available(&self, count: u32) -> Result<()> {
        if self.remaining() < count {
            return Err(Error::OutOfSpace {
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Resolve a page identifier.
    ///
    /// # Errors
    /// Returns `Error::UnknownPage` if `page_id` was never allocated.
    pub fn get_page(&self, page_id: PageId) -> Result<&Page<K, V>> {
        self.pages
            .get(page_id.as_index())
            .ok_or_else(|| unknown_page(page_id))
    }

    /// Resolve a page identifier for mutation.
    ///
    /// # Errors
    /// Returns `Error::UnknownPage` if `page_id` was never allocated.
    pub fn get_page_mut(&mut self, page_id: PageId) -> Result<&mut Page<K, V>> {
        self.pages
            .get_mut(page_id.as_index())
            .ok_or_else(|| unknown_page(page_id))
    }

    /// Borrow two distinct pages mutably at once (a page and its new sibling
    /// during a split).
    ///
    /// # Errors
    /// - `Error::Corrupted` if `a == b`
    /// - `Error::UnknownPage` if either page was never allocated
    pub(crate) fn get_pair_mut(
        &mut self,
        a: PageId,
        b: PageId,
    ) -> Result<(&mut Page<K, V>, &mut Page<K, V>)> {
        if a == b {
            return Err(Error::corrupted(a, "page paired with itself"));
        }
        for pid in [a, b] {
            if pid.as_index() >= self.pages.len() {
                return Err(unknown_page(pid));
            }
        }

        let (lo, hi) = (a.as_index().min(b.as_index()), a.as_index().max(b.as_index()));
        let (head, tail) = self.pages.split_at_mut(hi);
        let (lo_page, hi_page) = (&mut head[lo], &mut tail[0]);
        if a.as_index() < b.as_index() {
            Ok((lo_page, hi_page))
        } else {
            Ok((hi_page, lo_page))
        }
    }

    /// Identifier the next allocation will receive.
    #[inline]
    pub fn next_free_id(&self) -> PageId {
        PageId(self.pages.len() as u32)
    }

    /// Number of pages allocated so far.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Slots still available for allocation.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.capacity - self.page_count()
    }

    #[inline]
    pub fn page_capacity(&self) -> usize {
        self.page_capacity
    }

    /// All allocated pages in allocation order.
    pub fn pages(&self) -> impl Iterator<Item = &Page<K, V>> {
        self.pages.iter()
    }
}

fn unknown_page(page_id: PageId) -> Error {
    error!(page = page_id.0, "dereferenced a page that was never allocated");
    Error::UnknownPage(page_id)
}
