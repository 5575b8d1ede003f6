//! Ordered traversal along the leaf chain.

use crate::common::{Error, Result};
use crate::index::btree::BTree;
use crate::storage::page::Page;
use crate::storage::PageAllocator;

/// Iterator over `(key, value)` pairs in ascending key order.
///
/// Walks one leaf at a time and hops to the next leaf through its right
/// link, so it never revisits internal pages. A broken link is reported as
/// an `Err` item, after which the iterator is exhausted.
pub struct Iter<'a, K, V> {
    allocator: &'a PageAllocator<K, V>,
    page: Option<&'a Page<K, V>>,
    pos: usize,
}

impl<'a, K: Ord, V> Iterator for Iter<'a, K, V> {
    type Item = Result<(&'a K, &'a V)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let page = self.page?;

            if let Some(entry) = page.entries().get(self.pos) {
                self.pos += 1;
                return match entry.payload.value() {
                    Some(value) => Some(Ok((&entry.key, value))),
                    None => {
                        self.page = None;
                        Some(Err(Error::corrupted(
                            page.id(),
                            "internal page reached through the leaf chain",
                        )))
                    }
                };
            }

            let next = page.right_link()?;
            self.pos = 0;
            match self.allocator.get_page(next) {
                Ok(next_page) => self.page = Some(next_page),
                Err(e) => {
                    self.page = None;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Iterate over every entry in ascending key order.
    ///
    /// # Errors
    /// `Error::UnknownPage` if the way down to the leftmost leaf is broken.
    pub fn iter(&self) -> Result<Iter<'_, K, V>> {
        let page = match self.leftmost_leaf()? {
            Some(leaf) => Some(self.allocator.get_page(leaf)?),
            None => None,
        };
        Ok(Iter {
            allocator: &self.allocator,
            page,
            pos: 0,
        })
    }

    /// Iterate over entries with keys `>= start`, in ascending order.
    pub fn range_from(&self, start: &K) -> Result<Iter<'_, K, V>> {
        let path = self.descend(start)?;
        let (page, pos) = match path.last() {
            Some(&leaf) => {
                let page = self.allocator.get_page(leaf)?;
                let pos = page.find(start).unwrap_or_else(|insert_at| insert_at);
                (Some(page), pos)
            }
            None => (None, 0),
        };
        Ok(Iter {
            allocator: &self.allocator,
            page,
            pos,
        })
    }
}
