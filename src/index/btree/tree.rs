//! B-link tree - search and insert over the page graph.
//!
//! The [`BTree`] owns the root reference and drives every structural change:
//! - Descent from the root to a leaf, following right links when a page has
//!   been split under the reader
//! - Leaf insertion with cascading splits along the recorded path
//! - Growing a new root when the old one splits

use tracing::{debug, trace, warn};

use crate::common::config::{DEFAULT_PAGE_CAPACITY, DEFAULT_POOL_CAPACITY};
use crate::common::{BTreeConfig, Error, PageId, Result};
use crate::index::btree::TreeStats;
use crate::storage::page::Payload;
use crate::storage::PageAllocator;

/// An ordered index over pages drawn from a bounded [`PageAllocator`].
///
/// # Structure
/// ```text
///                       ┌──────────┐
///                       │ root [3] │
///                       └──┬────┬──┘
///               ┌──────────┘    └──────────┐
///          ┌────▼────┐   right_link   ┌────▼────┐
///          │ [1, 2]  │ ─────────────▶ │ [3, 4]  │ ──▶ none
///          └─────────┘                └─────────┘
/// ```
///
/// Every leaf sits at the same depth. Pages reference each other only by
/// [`PageId`], and every page is owned by the allocator.
///
/// # Duplicate Keys
/// Inserting a key that is already present replaces its payload in place.
/// No page changes shape and no page is allocated.
///
/// # Failure Atomicity
/// An insert works out how many pages its split cascade needs before it
/// touches anything. If the pool cannot supply them the insert fails with
/// `Error::OutOfSpace` and the tree is unchanged.
///
/// # Example
/// ```
/// use pagetree::{BTree, BTreeConfig};
///
/// let mut tree = BTree::new(BTreeConfig::new().with_page_capacity(3)).unwrap();
/// for key in 1..=4u32 {
///     tree.insert(key, key * 10).unwrap();
/// }
///
/// assert_eq!(tree.search(&2).unwrap(), Some(&20));
/// assert_eq!(tree.search(&5).unwrap(), None);
/// assert_eq!(tree.height(), 2);
/// ```
#[derive(Debug)]
pub struct BTree<K, V> {
    pub(super) allocator: PageAllocator<K, V>,
    pub(super) root: Option<PageId>,
    /// Number of levels; 0 for an empty tree.
    pub(super) height: usize,
    /// Number of distinct keys.
    pub(super) len: usize,
    pub(super) stats: TreeStats,
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Create an empty tree.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if the config fails validation.
    pub fn new(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            allocator: PageAllocator::new(config.pool_capacity, config.page_capacity),
            root: None,
            height: 0,
            len: 0,
            stats: TreeStats::new(),
        })
    }

    // ========================================================================
    // Public API
    // ========================================================================

    /// Look up the payload stored under `key`.
    ///
    /// Returns `Ok(None)` when the key is absent, including on an empty tree.
    ///
    /// # Errors
    /// `Error::UnknownPage` if the descent hits a dangling page reference.
    pub fn search(&self, key: &K) -> Result<Option<&V>> {
        TreeStats::bump(&self.stats.searches);

        let path = self.descend(key)?;
        match path.last() {
            None => Ok(None),
            Some(&leaf) => Ok(self.allocator.get_page(leaf)?.get(key)),
        }
    }

    /// Insert `key`, or replace its payload if it is already present.
    ///
    /// # Errors
    /// - `Error::OutOfSpace` if the pool cannot supply the pages this insert
    ///   needs; the tree is left untouched
    /// - `Error::UnknownPage` on a dangling page reference
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let Some(root) = self.root else {
            return self.insert_first(key, value);
        };

        let path = self.descend(&key)?;
        let Some(&leaf_id) = path.last() else {
            return Err(Error::corrupted(root, "descent produced an empty path"));
        };

        if self.allocator.get_page(leaf_id)?.contains_key(&key) {
            self.allocator
                .get_page_mut(leaf_id)?
                .insert_entry(key, Payload::Value(value));
            TreeStats::bump(&self.stats.updates);
            return Ok(());
        }

        let needed = self.pages_needed(&path)?;
        if let Err(e) = self.allocator.ensure_available(needed) {
            warn!(
                needed,
                remaining = self.allocator.remaining(),
                "insert rejected, page pool exhausted"
            );
            return Err(e);
        }

        // From here on every allocation is covered by the check above.
        self.absorb(leaf_id, key, Payload::Value(value))?;
        self.len += 1;
        TreeStats::bump(&self.stats.inserts);

        let mut pending: Option<(K, PageId)> = None;
        for &page_id in path.iter().rev() {
            if let Some((separator, right_id)) = pending.take() {
                self.absorb(page_id, separator, Payload::Child(right_id))?;
            }
            if !self.allocator.get_page(page_id)?.is_full() {
                return Ok(());
            }
            pending = Some(self.split_page(page_id)?);
        }

        if let Some((separator, right_id)) = pending {
            self.grow_root(path[0], separator, right_id)?;
        }
        Ok(())
    }

    /// Number of distinct keys in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels from root to leaf; 0 for an empty tree.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Current root page, or `None` for an empty tree.
    #[inline]
    pub fn root(&self) -> Option<PageId> {
        self.root
    }

    /// Read-only access to the page pool.
    #[inline]
    pub fn allocator(&self) -> &PageAllocator<K, V> {
        &self.allocator
    }

    #[inline]
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// First leaf of the leaf chain.
    pub fn leftmost_leaf(&self) -> Result<Option<PageId>> {
        let Some(mut current) = self.root else {
            return Ok(None);
        };
        while let Some(child) = self.allocator.get_page(current)?.left_child() {
            current = child;
        }
        Ok(Some(current))
    }

    // ========================================================================
    // Descent
    // ========================================================================

    /// Walk from the root to the leaf whose range holds `key`.
    ///
    /// Returns the visited pages, root first. Empty for an empty tree.
    pub(super) fn descend(&self, key: &K) -> Result<Vec<PageId>> {
        let Some(root) = self.root else {
            return Ok(Vec::new());
        };

        let mut path = Vec::with_capacity(self.height);
        let mut current = root;
        loop {
            current = self.move_right(current, key)?;
            path.push(current);
            match self.allocator.get_page(current)?.child_for(key) {
                Some(child) => {
                    trace!(from = current.0, to = child.0, "descend");
                    current = child;
                }
                None => return Ok(path),
            }
        }
    }

    /// Follow right links while the sibling's range starts at or below `key`.
    ///
    /// A page split whose separator has not reached the parent yet leaves
    /// the upper keys only reachable through the split page's right link.
    fn move_right(&self, page_id: PageId, key: &K) -> Result<PageId> {
        let mut current = page_id;
        while let Some(next) = self.allocator.get_page(current)?.right_link() {
            if !self.allocator.get_page(next)?.starts_at_or_before(key) {
                break;
            }
            trace!(from = current.0, to = next.0, "move right");
            TreeStats::bump(&self.stats.right_link_moves);
            current = next;
        }
        Ok(current)
    }

    // ========================================================================
    // Insert helpers
    // ========================================================================

    fn insert_first(&mut self, key: K, value: V) -> Result<()> {
        let page = self.allocator.alloc_page().inspect_err(|_| {
            warn!("insert rejected, page pool exhausted");
        })?;
        page.insert_entry(key, Payload::Value(value));
        let root = page.id();

        self.root = Some(root);
        self.height = 1;
        self.len = 1;
        TreeStats::bump(&self.stats.inserts);
        debug!(root = root.0, "created root leaf");
        Ok(())
    }

    /// Pages the split cascade for a new key will allocate.
    ///
    /// Walks the path bottom-up: each page that the incoming entry fills
    /// costs one page for its right half, and a split root costs one more
    /// for the new root.
    fn pages_needed(&self, path: &[PageId]) -> Result<u32> {
        let mut needed = 0;
        for &page_id in path.iter().rev() {
            let page = self.allocator.get_page(page_id)?;
            if page.len() + 1 < page.capacity() {
                return Ok(needed);
            }
            needed += 1;
        }
        Ok(needed + 1)
    }

    fn absorb(&mut self, page_id: PageId, key: K, payload: Payload<V>) -> Result<()> {
        if self
            .allocator
            .get_page_mut(page_id)?
            .insert_entry(key, payload)
        {
            Ok(())
        } else {
            Err(Error::corrupted(page_id, "page rejected the entry"))
        }
    }

    /// Split a full page into a freshly allocated right sibling.
    pub(super) fn split_page(&mut self, page_id: PageId) -> Result<(K, PageId)> {
        let right_id = self.allocator.alloc_page()?.id();
        let (page, right) = self.allocator.get_pair_mut(page_id, right_id)?;

        let leaf = page.is_leaf();
        let separator = page.split(right);

        if leaf {
            TreeStats::bump(&self.stats.leaf_splits);
        } else {
            TreeStats::bump(&self.stats.internal_splits);
        }
        debug!(page = page_id.0, right = right_id.0, leaf, "split page");
        Ok((separator, right_id))
    }

    /// Put a new root above the two halves of the old one.
    fn grow_root(&mut self, left: PageId, separator: K, right: PageId) -> Result<()> {
        let root = self.allocator.alloc_page()?;
        root.set_left_child(left);
        root.insert_entry(separator, Payload::Child(right));
        let root_id = root.id();

        self.root = Some(root_id);
        self.height += 1;
        TreeStats::bump(&self.stats.root_splits);
        debug!(root = root_id.0, height = self.height, "grew new root");
        Ok(())
    }
}

impl<K: Ord + Clone, V> Default for BTree<K, V> {
    fn default() -> Self {
        Self {
            allocator: PageAllocator::new(DEFAULT_POOL_CAPACITY, DEFAULT_PAGE_CAPACITY),
            root: None,
            height: 0,
            len: 0,
            stats: TreeStats::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
