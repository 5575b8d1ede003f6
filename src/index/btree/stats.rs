//! Tree operation statistics.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters tracked by a [`BTree`](crate::BTree).
///
/// All fields are atomic so `search`, which only borrows the tree shared,
/// can still count itself.
///
/// # Memory Ordering
/// `Ordering::Relaxed` everywhere: counters are independent of each other
/// and of the page graph, and only need atomic increments.
///
/// # Example
/// ```
/// use pagetree::TreeStats;
/// use std::sync::atomic::Ordering;
///
/// let stats = TreeStats::new();
/// stats.leaf_splits.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(stats.snapshot().leaf_splits, 1);
/// ```
#[derive(Debug, Default)]
pub struct TreeStats {
    /// New keys added.
    pub inserts: AtomicU64,
    /// Inserts that replaced the payload of an existing key.
    pub updates: AtomicU64,
    /// Point lookups served.
    pub searches: AtomicU64,
    pub leaf_splits: AtomicU64,
    pub internal_splits: AtomicU64,
    /// Splits of the root, each of which added a level.
    pub root_splits: AtomicU64,
    /// Times a descent followed a right link instead of a child link.
    pub right_link_moves: AtomicU64,
}

impl TreeStats {
    /// Create a new stats tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a point-in-time copy of every counter.
    pub fn snapshot(&self) -> TreeStatsSnapshot {
        TreeStatsSnapshot {
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            searches: self.searches.load(Ordering::Relaxed),
            leaf_splits: self.leaf_splits.load(Ordering::Relaxed),
            internal_splits: self.internal_splits.load(Ordering::Relaxed),
            root_splits: self.root_splits.load(Ordering::Relaxed),
            right_link_moves: self.right_link_moves.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        for counter in [
            &self.inserts,
            &self.updates,
            &self.searches,
            &self.leaf_splits,
            &self.internal_splits,
            &self.root_splits,
            &self.right_link_moves,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

/// A point-in-time snapshot of tree statistics.
///
/// Unlike `TreeStats`, this is plain data and can be compared and printed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStatsSnapshot {
    pub inserts: u64,
    pub updates: u64,
    pub searches: u64,
    pub leaf_splits: u64,
    pub internal_splits: u64,
    pub root_splits: u64,
    pub right_link_moves: u64,
}

impl TreeStatsSnapshot {
    /// Total page splits at every level.
    pub fn splits(&self) -> u64 {
        self.leaf_splits + self.internal_splits
    }
}

impl fmt::Display for TreeStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ inserts: {}, updates: {}, searches: {}, splits: {} (root {}), moves: {} }}",
            self.inserts,
            self.updates,
            self.searches,
            self.splits(),
            self.root_splits,
            self.right_link_moves
        )
    }
}
