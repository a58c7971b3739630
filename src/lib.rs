//! direct-hashmap: a single-threaded chained hash map whose bucket is
//! selected by a pluggable 32-bit hash, by default used directly as the
//! bucket array index.
//!
//! Internal Design:
//!
//! Summary
//! - `DirectHashMap<K, V, H>` owns a bucket array and a hash function
//!   `H: KeyHasher<K>` (key to `u32`). Keys compare with `Eq`.
//! - Layers:
//!   - `bucket::Buckets<K, V>`: the storage. Each slot embeds the head
//!     entry of its chain inline; colliding entries live in a `SlotMap`
//!     arena and are linked by arena key.
//!   - `DirectHashMap`: hashing, indexing policy, growth, and the public
//!     API on top of `Buckets`.
//!
//! Indexing
//! - `Indexing::Direct` (default): bucket = hash. An insert whose hash is
//!   `>= capacity` grows the array to `hash + 1` slots. The array never
//!   shrinks, so memory follows the largest hash seen, not the entry count.
//!   `TableConfig::max_buckets` bounds that growth.
//! - `Indexing::Modulo`: bucket = hash % capacity; the array doubles once
//!   the load exceeds 3/4 and entries move by their stored hash.
//!
//! Hasher invariants
//! - Each entry stores the `u32` computed at insert. Redistribution uses
//!   the stored value and never calls the hash function again.
//! - Lookups for a key whose hash lies beyond the array report "absent";
//!   only `bucket_index` surfaces `TableError::OutOfRangeIndex`.
//!
//! Failure model
//! - Growth reserves the new storage before moving anything. If that
//!   fails (allocator refusal, ceiling, `usize` overflow) the insert
//!   returns `TableError::AllocationFailure` and the table is unchanged.
//! - Absent keys on `get`/`remove`, duplicate inserts, and clearing an
//!   empty table are not errors.
//!
//! Reentrancy
//! - The hash function and `K: Eq` run while a chain is being walked. A
//!   debug-only guard panics if either re-enters the same table.
//!
//! Notes and non-goals
//! - Single-threaded: `!Send`/`!Sync`. Wrap in a lock for shared use.
//! - Iteration order is bucket order and nothing more.
//! - `teardown(self)` releases everything explicitly; dropping the table
//!   releases the same memory.

mod bucket;
pub mod config;
pub mod direct_hash_map;
mod direct_hash_map_proptest;
pub mod error;
pub mod hash;
mod reentrancy;

// Public surface
pub use config::{Indexing, TableConfig, DEFAULT_BUCKETS, DEFAULT_MAX_BUCKETS};
pub use direct_hash_map::{DirectHashMap, Iter};
pub use error::TableError;
pub use hash::{BuildHasherHash, ByteHash, KeyHasher};
