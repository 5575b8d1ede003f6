//! Structural verification of the page graph.

use std::collections::HashSet;

use crate::common::{Error, PageId, Result};
use crate::index::btree::BTree;

/// A page still to be checked, with the key range its parent assigned it.
struct Pending<'a, K> {
    page_id: PageId,
    lower: Option<&'a K>,
    upper: Option<&'a K>,
    depth: usize,
}

impl<K: Ord + Clone, V> BTree<K, V> {
    /// Check every structural invariant of the tree.
    ///
    /// - every page holds fewer than `capacity` entries, strictly ascending
    /// - internal pages have one more child than entries, leaves have none
    /// - every key lies inside the range its parent assigned
    /// - all leaves sit at depth `height()`
    /// - the leaf chain visits every leaf once, left to right, in key order
    /// - the number of leaf entries equals `len()`
    ///
    /// # Errors
    /// `Error::Corrupted` naming the first offending page, or
    /// `Error::UnknownPage` for a dangling reference.
    pub fn verify(&self) -> Result<()> {
        let Some(root) = self.root else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        let mut leaves = Vec::new();
        let mut entry_count = 0;
        let mut stack = vec![Pending {
            page_id: root,
            lower: None,
            upper: None,
            depth: 1,
        }];

        while let Some(Pending {
            page_id,
            lower,
            upper,
            depth,
        }) = stack.pop()
        {
            if !seen.insert(page_id) {
                return Err(Error::corrupted(page_id, "page reachable twice"));
            }
            let page = self.allocator.get_page(page_id)?;

            if page.len() >= page.capacity() {
                return Err(Error::corrupted(
                    page_id,
                    format!("{} entries with capacity {}", page.len(), page.capacity()),
                ));
            }
            let keys: Vec<&K> = page.keys().collect();
            if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(Error::corrupted(page_id, "keys not strictly ascending"));
            }
            if let (Some(lower), Some(&first)) = (lower, keys.first()) {
                if first < lower {
                    return Err(Error::corrupted(page_id, "key below parent range"));
                }
            }
            if let (Some(upper), Some(&last)) = (upper, keys.last()) {
                if last >= upper {
                    return Err(Error::corrupted(page_id, "key above parent range"));
                }
            }

            if page.is_leaf() {
                if page.entries().iter().any(|e| e.payload.child().is_some()) {
                    return Err(Error::corrupted(page_id, "leaf entry carries a child link"));
                }
                if depth != self.height {
                    return Err(Error::corrupted(
                        page_id,
                        format!("leaf at depth {}, tree height {}", depth, self.height),
                    ));
                }
                entry_count += page.len();
                leaves.push(page_id);
                continue;
            }

            let children = page.children();
            if children.len() != page.len() + 1 {
                return Err(Error::corrupted(
                    page_id,
                    format!("{} children for {} entries", children.len(), page.len()),
                ));
            }
            // Reverse push so the leftmost child is checked first and leaves
            // are collected in key order.
            for (i, &child) in children.iter().enumerate().rev() {
                stack.push(Pending {
                    page_id: child,
                    lower: if i == 0 { lower } else { Some(keys[i - 1]) },
                    upper: if i == keys.len() { upper } else { Some(keys[i]) },
                    depth: depth + 1,
                });
            }
        }

        if entry_count != self.len {
            return Err(Error::corrupted(
                root,
                format!("{} leaf entries, tree reports {}", entry_count, self.len),
            ));
        }

        self.verify_leaf_chain(&leaves)
    }

    /// Walk right links from the leftmost leaf and match the tree order.
    fn verify_leaf_chain(&self, leaves: &[PageId]) -> Result<()> {
        let mut expected = leaves.iter();
        let mut current = leaves.first().copied();
        let mut prev_key: Option<&K> = None;

        while let Some(page_id) = current {
            if expected.next() != Some(&page_id) {
                return Err(Error::corrupted(page_id, "leaf chain out of tree order"));
            }
            let page = self.allocator.get_page(page_id)?;
            for key in page.keys() {
                if prev_key.is_some_and(|prev| prev >= key) {
                    return Err(Error::corrupted(page_id, "leaf chain keys not ascending"));
                }
                prev_key = Some(key);
            }
            current = page.right_link();
        }

        match expected.next() {
            Some(&missed) => Err(Error::corrupted(missed, "leaf not on the leaf chain")),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::BTreeConfig;
    use crate::storage::page::{Page, Payload};

    fn filled(n: u32) -> BTree<u32, u32> {
        let mut tree = BTree::new(
            BTreeConfig::new()
                .with_page_capacity(4)
                .with_pool_capacity(256),
        )
        .unwrap();
        for k in 0..n {
            tree.insert(k * 7 % 101, k).unwrap();
        }
        tree
    }

    #[test]
    fn test_verify_accepts_valid_trees() {
        filled(0).verify().unwrap();
        filled(1).verify().unwrap();
        filled(100).verify().unwrap();
    }

    #[test]
    fn test_verify_detects_unordered_keys() {
        let mut tree = filled(50);
        let leaf = tree.leftmost_leaf().unwrap().unwrap();
        let page = tree.allocator.get_page_mut(leaf).unwrap();
        let mut reversed = page.entries().to_vec();
        reversed.reverse();
        *page = Page::from_parts(page.id(), page.capacity(), reversed, None, page.right_link());

        assert!(matches!(tree.verify(), Err(Error::Corrupted { page, .. }) if page == leaf));
    }

    #[test]
    fn test_verify_detects_broken_leaf_chain() {
        let mut tree = filled(50);
        let leaf = tree.leftmost_leaf().unwrap().unwrap();
        tree.allocator
            .get_page_mut(leaf)
            .unwrap()
            .set_right_link(None);

        assert!(matches!(tree.verify(), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_verify_detects_unpropagated_split() {
        let mut tree = filled(3);
        let root = tree.root().unwrap();
        tree.allocator
            .get_page_mut(root)
            .unwrap()
            .insert_entry(1000, Payload::Value(0));
        tree.split_page(root).unwrap();

        assert!(matches!(tree.verify(), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_verify_detects_wrong_length() {
        let mut tree = filled(10);
        tree.len += 1;
        assert!(matches!(tree.verify(), Err(Error::Corrupted { .. })));
    }
}
