//! DirectHashMap: chained hash table whose bucket is chosen by a pluggable
//! 32-bit hash, by default used directly as the array index.

use crate::bucket::{Buckets, Chains, Entry};
use crate::config::{Indexing, TableConfig};
use crate::error::TableError;
use crate::hash::{ByteHash, KeyHasher};
use crate::reentrancy::DebugReentrancy;
use core::borrow::Borrow;
use core::fmt;
use tracing::{debug, trace};

pub struct DirectHashMap<K, V, H = ByteHash> {
    hasher: H,
    config: TableConfig,
    buckets: Buckets<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K, V> DirectHashMap<K, V>
where
    K: Eq + AsRef<[u8]>,
{
    /// Empty table of `DEFAULT_BUCKETS` slots hashing keys with `ByteHash`.
    pub fn new() -> Self {
        Self::with_hasher(ByteHash)
    }
}

impl<K, V> Default for DirectHashMap<K, V>
where
    K: Eq + AsRef<[u8]>,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Makes `hash` addressable under `config.indexing`, growing the array if
/// needed, and returns its bucket. On error the array is untouched.
fn reserve_bucket<K, V>(
    buckets: &mut Buckets<K, V>,
    config: &TableConfig,
    hash: u32,
) -> Result<usize, TableError> {
    let capacity = buckets.capacity();
    match config.indexing {
        Indexing::Direct => {
            let index = hash as usize;
            if index >= capacity {
                let requested = index
                    .checked_add(1)
                    .filter(|&n| n <= config.max_buckets)
                    .ok_or(TableError::AllocationFailure {
                        requested: index.saturating_add(1),
                    })?;
                debug!(from = capacity, to = requested, "growing bucket array");
                buckets.grow_to(requested)?;
            }
            Ok(index)
        }
        Indexing::Modulo => {
            let load = buckets.len().saturating_add(1).saturating_mul(4);
            if load > capacity.saturating_mul(3) && capacity < config.max_buckets {
                let to = capacity.saturating_mul(2).min(config.max_buckets).max(1);
                debug!(
                    from = capacity,
                    to,
                    len = buckets.len(),
                    "redistributing bucket array"
                );
                buckets.redistribute(to, Indexing::Modulo)?;
            }
            let capacity = buckets.capacity();
            Indexing::Modulo
                .slot_for(hash, capacity)
                .ok_or(TableError::OutOfRangeIndex {
                    index: hash as usize,
                    capacity,
                })
        }
    }
}

impl<K, V, H> DirectHashMap<K, V, H> {
    pub fn len(&self) -> usize {
        self.buckets.len()
    }
    pub fn is_empty(&self) -> bool {
        self.buckets.len() == 0
    }

    /// Current length of the bucket array.
    pub fn capacity(&self) -> usize {
        self.buckets.capacity()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Number of entries chained in bucket `index`; zero when the bucket is
    /// empty or outside the array.
    pub fn bucket_len(&self, index: usize) -> usize {
        self.buckets.chain_len(index)
    }

    /// Entries in bucket order: slot 0 upward, each head before its chain.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.chains(),
        }
    }

    /// Removes every entry. The bucket array keeps its length and the table
    /// stays usable.
    pub fn clear(&mut self) {
        trace!(
            len = self.buckets.len(),
            capacity = self.buckets.capacity(),
            "clearing table"
        );
        self.buckets.clear();
    }

    /// Releases every entry and the bucket array, consuming the table.
    pub fn teardown(mut self) {
        debug!(
            len = self.buckets.len(),
            capacity = self.buckets.capacity(),
            "tearing down table"
        );
        self.buckets.release();
    }
}

impl<K, V, H> DirectHashMap<K, V, H>
where
    K: Eq,
    H: KeyHasher<K>,
{
    /// Empty table of `DEFAULT_BUCKETS` slots, direct indexing, using `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        let config = TableConfig::default();
        Self {
            buckets: Buckets::new(config.initial_buckets),
            hasher,
            config,
            reentrancy: DebugReentrancy::new(),
        }
    }

    pub fn with_config(config: TableConfig, hasher: H) -> Result<Self, TableError> {
        let initial = config.effective_initial_buckets();
        if initial > config.max_buckets {
            return Err(TableError::AllocationFailure { requested: initial });
        }
        Ok(Self {
            buckets: Buckets::try_new(initial)?,
            hasher,
            config,
            reentrancy: DebugReentrancy::new(),
        })
    }

    fn slot_for_hash(&self, hash: u32) -> Option<usize> {
        let capacity = self.buckets.capacity();
        let index = self.config.indexing.slot_for(hash, capacity);
        if index.is_none() {
            trace!(hash, capacity, "hash is beyond the bucket array");
        }
        index
    }

    /// Bucket `q` maps to under the current capacity.
    pub fn bucket_index<Q>(&self, q: &Q) -> Result<usize, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter();
        let hash = <H as KeyHasher<Q>>::hash(&self.hasher, q);
        let capacity = self.buckets.capacity();
        self.config
            .indexing
            .slot_for(hash, capacity)
            .ok_or(TableError::OutOfRangeIndex {
                index: hash as usize,
                capacity,
            })
    }

    /// Stores `value` under `key`, replacing the value of an equal key, and
    /// returns the stored value.
    ///
    /// Under direct indexing a hash at or beyond the capacity grows the array
    /// to `hash + 1` slots first. Growth that cannot be satisfied returns
    /// `AllocationFailure` and leaves the table unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<&mut V, TableError> {
        let _g = self.reentrancy.enter();
        let hash = <H as KeyHasher<K>>::hash(&self.hasher, &key);
        let index = reserve_bucket(&mut self.buckets, &self.config, hash)?;
        self.buckets.insert(index, Entry::new(key, value, hash))
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter();
        let index = self.slot_for_hash(<H as KeyHasher<Q>>::hash(&self.hasher, q))?;
        self.buckets
            .get(index, |k| k.borrow() == q)
            .map(|e| &e.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter();
        let index = self.slot_for_hash(<H as KeyHasher<Q>>::hash(&self.hasher, q))?;
        self.buckets
            .get_mut(index, |k| k.borrow() == q)
            .map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        self.get(q).is_some()
    }

    /// Removes `q` and returns its value. Absent keys, including ones whose
    /// hash lies beyond the array, are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
        H: KeyHasher<Q>,
    {
        let _g = self.reentrancy.enter();
        let index = self.slot_for_hash(<H as KeyHasher<Q>>::hash(&self.hasher, q))?;
        self.buckets
            .remove(index, |k| k.borrow() == q)
            .map(|e| (e.key, e.value))
    }
}

impl<K, V, H> fmt::Debug for DirectHashMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over entries of a `DirectHashMap` in bucket order.
pub struct Iter<'a, K, V> {
    inner: Chains<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|e| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, H> IntoIterator for &'a DirectHashMap<K, V, H> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
