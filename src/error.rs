use thiserror::Error;

/// Errors reported by `DirectHashMap`.
///
/// Lookups and removals never surface these; they treat an unreachable
/// bucket as an absent key. Only growth and explicit index queries do.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// The key's hash does not address a bucket of the current array.
    #[error("bucket index {index} is out of range for capacity {capacity}")]
    OutOfRangeIndex { index: usize, capacity: usize },

    /// The bucket array could not be grown to `requested` slots. The table
    /// is left exactly as it was before the call.
    #[error("cannot allocate a bucket array of {requested} slots")]
    AllocationFailure { requested: usize },
}
