//! Thread-shareable tree handle.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use crate::common::{BTreeConfig, Result};
use crate::index::btree::{BTree, TreeStatsSnapshot};

/// A cloneable handle to one tree shared between threads.
///
/// # Thread Safety
/// - `search`: shared lock, any number of readers run at once
/// - `insert`: exclusive lock, one mutator at a time
///
/// Readers never observe a half-finished split: the exclusive lock is held
/// for the whole cascade.
///
/// # Example
/// ```
/// use pagetree::{BTreeConfig, SharedBTree};
/// use std::thread;
///
/// let tree = SharedBTree::new(BTreeConfig::new().with_pool_capacity(64)).unwrap();
/// tree.insert(1u64, "one".to_string()).unwrap();
///
/// let reader = tree.clone();
/// let found = thread::spawn(move || reader.search(&1).unwrap())
///     .join()
///     .unwrap();
/// assert_eq!(found.as_deref(), Some("one"));
/// ```
#[derive(Debug)]
pub struct SharedBTree<K, V> {
    inner: Arc<RwLock<BTree<K, V>>>,
}

impl<K, V> Clone for SharedBTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord + Clone, V> SharedBTree<K, V> {
    /// Create a shared handle around a new empty tree.
    pub fn new(config: BTreeConfig) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(config)?))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Insert under the exclusive lock. Same semantics as [`BTree::insert`].
    pub fn insert(&self, key: K, value: V) -> Result<()> {
        self.inner.write().insert(key, value)
    }

    /// Look up a key under the shared lock, returning a copy of its payload.
    pub fn search(&self, key: &K) -> Result<Option<V>>
    where
        V: Clone,
    {
        Ok(self.inner.read().search(key)?.cloned())
    }

    /// Hold the shared lock for several reads against one consistent tree.
    pub fn read(&self) -> RwLockReadGuard<'_, BTree<K, V>> {
        self.inner.read()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> TreeStatsSnapshot {
        self.inner.read().stats().snapshot()
    }

    /// Run [`BTree::verify`] under the shared lock.
    pub fn verify(&self) -> Result<()> {
        self.inner.read().verify()
    }
}
