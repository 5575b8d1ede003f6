//! Page identifier type.

use std::fmt;

/// Identifies a page in the page pool.
///
/// Identifiers are handed out by [`PageAllocator`](crate::storage::PageAllocator)
/// in allocation order starting at 0 and are never reused. Tree pages refer to
/// each other only through these identifiers, never through references, so the
/// page graph has no ownership cycles.
///
/// "No page" is expressed as `Option<PageId>::None` rather than a sentinel.
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert_eq!(page_id.0, 42);
/// assert_eq!(page_id.as_index(), 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Position of this page in the allocator's slot vector.
    #[inline]
    pub fn as_index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Page({})", self.0)
    }
}
