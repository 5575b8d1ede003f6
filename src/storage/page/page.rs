//! Page - a single node of the tree.
//!
//! A [`Page`] holds a sorted run of [`Entry`] values. Leaves map keys to
//! payloads; internal pages map separator keys to child page identifiers.
//! Pages never own other pages: every relation is a [`PageId`] resolved
//! through the [`PageAllocator`](crate::storage::PageAllocator).

use crate::common::PageId;

use super::page_header::PageType;

/// What an entry carries: a user value in a leaf, a child link in an
/// internal page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload<V> {
    /// Leaf payload.
    Value(V),
    /// Internal link to the child holding keys `>=` this entry's key
    /// (and `<` the next entry's key).
    Child(PageId),
}

impl<V> Payload<V> {
    /// The user value, if this is a leaf payload.
    #[inline]
    pub fn value(&self) -> Option<&V> {
        match self {
            Payload::Value(v) => Some(v),
            Payload::Child(_) => None,
        }
    }

    /// The child page, if this is an internal link.
    #[inline]
    pub fn child(&self) -> Option<PageId> {
        match self {
            Payload::Value(_) => None,
            Payload::Child(pid) => Some(*pid),
        }
    }
}

/// A `(key, payload)` pair stored in a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    pub key: K,
    pub payload: Payload<V>,
}

/// A fixed-capacity tree node.
///
/// # Layout
/// ```text
///  internal:   left_child | k0 → c1 | k1 → c2 | ... | kn → cn+1
///  leaf:       k0 → v0 | k1 → v1 | ... | kn → vn     ──right_link──▶
/// ```
///
/// An internal page with `n` entries has `n + 1` children: `left_child` for
/// keys below `k0`, and the child on entry `i` for keys in `[ki, ki+1)`.
/// A page is a leaf exactly when `left_child` is `None`.
///
/// # Capacity
/// A page reaches `capacity` entries only transiently, inside an insert; the
/// tree splits it before the insert returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<K, V> {
    id: PageId,
    entries: Vec<Entry<K, V>>,
    capacity: usize,
    left_child: Option<PageId>,
    right_link: Option<PageId>,
}

impl<K: Ord, V> Page<K, V> {
    /// Create an empty leaf page.
    ///
    /// Entry storage grows on demand; `capacity` only bounds it.
    pub fn new(id: PageId, capacity: usize) -> Self {
        Self {
            id,
            entries: Vec::new(),
            capacity,
            left_child: None,
            right_link: None,
        }
    }

    /// Rebuild a page from its parts (used by the page image decoder).
    pub(crate) fn from_parts(
        id: PageId,
        capacity: usize,
        entries: Vec<Entry<K, V>>,
        left_child: Option<PageId>,
        right_link: Option<PageId>,
    ) -> Self {
        Self {
            id,
            entries,
            capacity,
            left_child,
            right_link,
        }
    }

    #[inline]
    pub fn id(&self) -> PageId {
        self.id
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the page holds `capacity` entries and must be split.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left_child.is_none()
    }

    /// Page kind as recorded in a page image header.
    pub fn page_type(&self) -> PageType {
        if self.is_leaf() {
            PageType::Leaf
        } else {
            PageType::Internal
        }
    }

    #[inline]
    pub fn entries(&self) -> &[Entry<K, V>] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    #[inline]
    pub fn first_key(&self) -> Option<&K> {
        self.entries.first().map(|e| &e.key)
    }

    /// Largest key in this page.
    #[inline]
    pub fn last_key(&self) -> Option<&K> {
        self.entries.last().map(|e| &e.key)
    }

    #[inline]
    pub fn left_child(&self) -> Option<PageId> {
        self.left_child
    }

    /// Turn this page into an internal page by giving it a leftmost child.
    ///
    /// Only meaningful on an empty page.
    pub(crate) fn set_left_child(&mut self, child: PageId) {
        debug_assert!(self.entries.is_empty(), "left child set on a populated page");
        self.left_child = Some(child);
    }

    #[inline]
    pub fn right_link(&self) -> Option<PageId> {
        self.right_link
    }

    pub(crate) fn set_right_link(&mut self, right: Option<PageId>) {
        self.right_link = right;
    }

    /// All children in key order. Empty for a leaf.
    pub fn children(&self) -> Vec<PageId> {
        match self.left_child {
            None => Vec::new(),
            Some(first) => std::iter::once(first)
                .chain(self.entries.iter().filter_map(|e| e.payload.child()))
                .collect(),
        }
    }

    /// Binary search for `key` among this page's entries.
    #[inline]
    pub fn find(&self, key: &K) -> std::result::Result<usize, usize> {
        self.entries.binary_search_by(|e| e.key.cmp(key))
    }

    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_ok()
    }

    /// Look up the payload stored under `key` in a leaf.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key)
            .ok()
            .and_then(|idx| self.entries[idx].payload.value())
    }

    /// Pick the child of an internal page whose key range holds `key`.
    ///
    /// That is the child left of the first entry whose key is greater than
    /// `key`, or the rightmost child when `key` is `>=` every entry key.
    /// Returns `None` on a leaf.
    pub fn child_for(&self, key: &K) -> Option<PageId> {
        let left = self.left_child?;
        let idx = self.entries.partition_point(|e| e.key <= *key);
        if idx == 0 {
            Some(left)
        } else {
            self.entries[idx - 1].payload.child()
        }
    }

    /// Insert in sorted position.
    ///
    /// An existing key has its payload replaced and the call succeeds even on
    /// a full page. A new key is rejected with `false` when the page is
    /// already full; the caller must split first.
    ///
    /// A payload of the wrong kind (a child link on a leaf, a value on an
    /// internal page) is rejected with `false` and the page is unchanged.
    pub(crate) fn insert_entry(&mut self, key: K, payload: Payload<V>) -> bool {
        if self.is_leaf() != matches!(payload, Payload::Value(_)) {
            return false;
        }
        match self.find(&key) {
            Ok(idx) => {
                self.entries[idx].payload = payload;
                true
            }
            Err(_) if self.is_full() => false,
            Err(idx) => {
                self.entries.insert(idx, Entry { key, payload });
                true
            }
        }
    }

    /// Split a full page at its median, moving the upper half into `right`.
    ///
    /// `right` must be a freshly allocated, empty page. Returns the separator
    /// key the parent must record for `right`.
    ///
    /// - Leaf: the separator is a copy of `right`'s first key, and `right` is
    ///   spliced into the leaf chain between this page and its old successor.
    /// - Internal: the median entry moves up. Its key becomes the separator
    ///   and appears in neither half; its child becomes `right`'s leftmost
    ///   child.
    pub(crate) fn split(&mut self, right: &mut Page<K, V>) -> K
    where
        K: Clone,
    {
        debug_assert!(self.is_full(), "split of a page that is not full");
        debug_assert!(right.is_empty() && right.is_leaf(), "split target not fresh");

        let mid = self.entries.len() / 2;
        let upper = self.entries.split_off(mid);

        right.right_link = self.right_link;
        self.right_link = Some(right.id);

        if self.is_leaf() {
            right.entries = upper;
            right.entries[0].key.clone()
        } else {
            let mut upper = upper.into_iter();
            let median = upper
                .next()
                .expect("internal split of a full page leaves a median");
            right.left_child = median.payload.child();
            right.entries = upper.collect();
            median.key
        }
    }

    /// Compare `key` against the first key of this page.
    ///
    /// Used by the move-right check: a key ordering `>=` a sibling's first
    /// key belongs to that sibling or beyond.
    pub(crate) fn starts_at_or_before(&self, key: &K) -> bool {
        self.first_key().is_some_and(|first| first <= key)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(keys: &[u32], capacity: usize) -> Page<u32, String> {
        let mut page = Page::new(PageId::new(0), capacity);
        for &k in keys {
            assert!(page.insert_entry(k, Payload::Value(format!("v{}", k))));
        }
        page
    }

    fn keys_of(page: &Page<u32, String>) -> Vec<u32> {
        page.keys().copied().collect()
    }

    #[test]
    fn test_new_page_is_empty_leaf() {
        let page: Page<u32, String> = Page::new(PageId::new(7), 4);
        assert_eq!(page.id(), PageId::new(7));
        assert!(page.is_empty());
        assert!(page.is_leaf());
        assert!(!page.is_full());
        assert_eq!(page.page_type(), PageType::Leaf);
        assert!(page.children().is_empty());
    }

    #[test]
    fn test_huge_capacity_does_not_preallocate() {
        let mut page: Page<u32, String> = Page::new(PageId::new(0), usize::MAX);
        assert!(page.insert_entry(1, Payload::Value("v1".into())));
        assert_eq!(page.len(), 1);
        assert!(!page.is_full());
    }

    #[test]
    fn test_insert_keeps_sorted_order() {
        let page = leaf_with(&[5, 1, 3], 4);
        assert_eq!(keys_of(&page), vec![1, 3, 5]);
        assert_eq!(page.get(&3), Some(&"v3".to_string()));
        assert_eq!(page.get(&4), None);
    }

    #[test]
    fn test_insert_rejected_when_full() {
        let mut page = leaf_with(&[1, 2, 3], 3);
        assert!(page.is_full());
        assert!(!page.insert_entry(4, Payload::Value("v4".into())));
        assert_eq!(keys_of(&page), vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_key_updates_payload() {
        let mut page = leaf_with(&[1, 2], 3);
        assert!(page.insert_entry(2, Payload::Value("new".into())));
        assert_eq!(page.len(), 2);
        assert_eq!(page.get(&2), Some(&"new".to_string()));

        // Updating succeeds even on a full page.
        let mut full = leaf_with(&[1, 2, 3], 3);
        assert!(full.insert_entry(3, Payload::Value("x".into())));
        assert_eq!(full.get(&3), Some(&"x".to_string()));
    }

    #[test]
    fn test_payload_kind_must_match_page_kind() {
        let mut leaf = leaf_with(&[1], 4);
        assert!(!leaf.insert_entry(2, Payload::Child(PageId::new(5))));
        assert!(!leaf.insert_entry(1, Payload::Child(PageId::new(5))));
        assert_eq!(keys_of(&leaf), vec![1]);
        assert_eq!(leaf.get(&1), Some(&"v1".to_string()));

        let mut node: Page<u32, String> = Page::new(PageId::new(1), 4);
        node.set_left_child(PageId::new(100));
        assert!(!node.insert_entry(10, Payload::Value("v".into())));
        assert!(node.is_empty());
        assert!(node.insert_entry(10, Payload::Child(PageId::new(101))));
    }

    #[test]
    fn test_leaf_split_copies_separator_and_links_chain() {
        let mut left = leaf_with(&[10, 20, 30, 40], 4);
        left.set_right_link(Some(PageId::new(9)));
        let mut right = Page::new(PageId::new(1), 4);

        let separator = left.split(&mut right);

        assert_eq!(separator, 30);
        assert_eq!(keys_of(&left), vec![10, 20]);
        assert_eq!(keys_of(&right), vec![30, 40]);
        assert_eq!(left.right_link(), Some(PageId::new(1)));
        assert_eq!(right.right_link(), Some(PageId::new(9)));
        assert!(right.is_leaf());
    }

    #[test]
    fn test_leaf_split_odd_capacity() {
        let mut left = leaf_with(&[1, 2, 3], 3);
        let mut right = Page::new(PageId::new(1), 3);

        let separator = left.split(&mut right);

        assert_eq!(separator, 2);
        assert_eq!(keys_of(&left), vec![1]);
        assert_eq!(keys_of(&right), vec![2, 3]);
    }

    #[test]
    fn test_internal_split_promotes_median() {
        let mut node: Page<u32, String> = Page::new(PageId::new(0), 3);
        node.set_left_child(PageId::new(100));
        node.insert_entry(10, Payload::Child(PageId::new(101)));
        node.insert_entry(20, Payload::Child(PageId::new(102)));
        node.insert_entry(30, Payload::Child(PageId::new(103)));
        let mut right = Page::new(PageId::new(1), 3);

        let separator = node.split(&mut right);

        assert_eq!(separator, 20);
        assert_eq!(keys_of(&node), vec![10]);
        assert_eq!(node.children(), vec![PageId::new(100), PageId::new(101)]);
        assert_eq!(keys_of(&right), vec![30]);
        assert_eq!(right.children(), vec![PageId::new(102), PageId::new(103)]);
        assert!(!right.is_leaf());
        assert_eq!(node.right_link(), Some(PageId::new(1)));
    }

    #[test]
    fn test_internal_split_capacity_two_leaves_empty_right() {
        let mut node: Page<u32, String> = Page::new(PageId::new(0), 2);
        node.set_left_child(PageId::new(100));
        node.insert_entry(10, Payload::Child(PageId::new(101)));
        node.insert_entry(20, Payload::Child(PageId::new(102)));
        let mut right = Page::new(PageId::new(1), 2);

        let separator = node.split(&mut right);

        assert_eq!(separator, 20);
        assert_eq!(node.len(), 1);
        assert!(right.is_empty());
        assert_eq!(right.children(), vec![PageId::new(102)]);
    }

    #[test]
    fn test_child_for_routes_by_range() {
        let mut node: Page<u32, String> = Page::new(PageId::new(0), 4);
        node.set_left_child(PageId::new(100));
        node.insert_entry(10, Payload::Child(PageId::new(101)));
        node.insert_entry(20, Payload::Child(PageId::new(102)));

        assert_eq!(node.child_for(&5), Some(PageId::new(100)));
        assert_eq!(node.child_for(&10), Some(PageId::new(101)));
        assert_eq!(node.child_for(&15), Some(PageId::new(101)));
        assert_eq!(node.child_for(&20), Some(PageId::new(102)));
        assert_eq!(node.child_for(&99), Some(PageId::new(102)));

        let leaf = leaf_with(&[1], 4);
        assert_eq!(leaf.child_for(&1), None);
    }

    #[test]
    fn test_starts_at_or_before() {
        let page = leaf_with(&[10, 20], 4);
        assert!(page.starts_at_or_before(&10));
        assert!(page.starts_at_or_before(&15));
        assert!(!page.starts_at_or_before(&9));

        let empty: Page<u32, String> = Page::new(PageId::new(1), 4);
        assert!(!empty.starts_at_or_before(&0));
    }
}
