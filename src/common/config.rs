//! Configuration constants and construction-time settings.

use super::{Error, Result};

/// Size of a page image in bytes (4KB).
///
/// Pages live in memory as typed nodes; this is the size of the byte image
/// produced by [`encode_page`](crate::storage::page::encode_page) for an
/// external persistence layer.
pub const PAGE_SIZE: usize = 4096;

/// Smallest page capacity that still permits a meaningful split.
pub const MIN_PAGE_CAPACITY: usize = 2;

/// Largest page capacity a page image header can record.
pub const MAX_PAGE_CAPACITY: usize = u16::MAX as usize;

/// Default entries per page (tree order).
pub const DEFAULT_PAGE_CAPACITY: usize = 3;

/// Default number of page slots in the pool.
pub const DEFAULT_POOL_CAPACITY: u32 = 10;

/// Construction-time settings for a [`BTree`](crate::BTree).
///
/// # Example
/// ```
/// use pagetree::BTreeConfig;
///
/// let config = BTreeConfig::new()
///     .with_page_capacity(4)
///     .with_pool_capacity(128);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    /// Number of entries at which a page splits.
    pub page_capacity: usize,
    /// Maximum number of pages the pool can hand out.
    pub pool_capacity: u32,
}

impl BTreeConfig {
    /// Create a config with the default capacities.
    pub fn new() -> Self {
        Self {
            page_capacity: DEFAULT_PAGE_CAPACITY,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Set the page capacity.
    pub fn with_page_capacity(mut self, page_capacity: usize) -> Self {
        self.page_capacity = page_capacity;
        self
    }

    /// Set the pool capacity.
    pub fn with_pool_capacity(mut self, pool_capacity: u32) -> Self {
        self.pool_capacity = pool_capacity;
        self
    }

    /// Check that both capacities are usable.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if `page_capacity` is outside
    /// `2..=MAX_PAGE_CAPACITY` or the pool has no slots.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PAGE_CAPACITY..=MAX_PAGE_CAPACITY).contains(&self.page_capacity) {
            return Err(Error::InvalidConfig(format!(
                "page_capacity must be in {}..={}, got {}",
                MIN_PAGE_CAPACITY, MAX_PAGE_CAPACITY, self.page_capacity
            )));
        }
        if self.pool_capacity == 0 {
            return Err(Error::InvalidConfig(
                "pool_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}
