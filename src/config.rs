//! Table construction parameters.

/// Number of buckets a freshly constructed table starts with.
pub const DEFAULT_BUCKETS: usize = 100;

/// Default ceiling on the bucket array length. With direct indexing a single
/// large hash would otherwise force an allocation proportional to the hash
/// value itself.
pub const DEFAULT_MAX_BUCKETS: usize = 1 << 24;

/// How a 32-bit hash selects a bucket.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Indexing {
    /// The hash is the bucket index. The array grows to `hash + 1` slots
    /// whenever an insert needs it.
    #[default]
    Direct,
    /// The hash is reduced modulo the capacity; the array doubles once the
    /// load exceeds 3/4 and every entry is redistributed.
    Modulo,
}

impl Indexing {
    /// Bucket for `hash` in an array of `capacity` slots, or `None` when the
    /// hash cannot be addressed without growing.
    #[inline]
    pub fn slot_for(self, hash: u32, capacity: usize) -> Option<usize> {
        let hash = hash as usize;
        match self {
            Indexing::Direct => (hash < capacity).then_some(hash),
            Indexing::Modulo => (capacity > 0).then(|| hash % capacity),
        }
    }
}

/// Construction parameters for `DirectHashMap::with_config`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableConfig {
    pub(crate) initial_buckets: usize,
    pub(crate) max_buckets: usize,
    pub(crate) indexing: Indexing,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            max_buckets: DEFAULT_MAX_BUCKETS,
            indexing: Indexing::Direct,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default parameters with modulo indexing.
    pub fn modulo() -> Self {
        Self::default().indexing(Indexing::Modulo)
    }

    pub fn initial_buckets(mut self, n: usize) -> Self {
        self.initial_buckets = n;
        self
    }

    /// Upper bound on the bucket array length. Use `1 << 32` to let direct
    /// indexing address every possible hash.
    pub fn max_buckets(mut self, n: usize) -> Self {
        self.max_buckets = n;
        self
    }

    pub fn indexing(mut self, indexing: Indexing) -> Self {
        self.indexing = indexing;
        self
    }

    pub fn get_initial_buckets(&self) -> usize {
        self.initial_buckets
    }

    pub fn get_max_buckets(&self) -> usize {
        self.max_buckets
    }

    pub fn get_indexing(&self) -> Indexing {
        self.indexing
    }

    /// Initial length actually allocated: modulo indexing needs at least one
    /// bucket to reduce into.
    pub(crate) fn effective_initial_buckets(&self) -> usize {
        match self.indexing {
            Indexing::Direct => self.initial_buckets,
            Indexing::Modulo => self.initial_buckets.max(1),
        }
    }
}
