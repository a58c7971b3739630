//! Hash functions: key to `u32`.

use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// A deterministic, pure function from a key to a 32-bit hash.
///
/// Implemented for every `Fn(&K) -> u32`, so closures and fn items can be
/// passed to `DirectHashMap::with_hasher` directly.
pub trait KeyHasher<K: ?Sized> {
    fn hash(&self, key: &K) -> u32;
}

impl<K: ?Sized, F> KeyHasher<K> for F
where
    F: Fn(&K) -> u32,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        self(key)
    }
}

/// Default hash: XOR of the key's bytes up to the first NUL.
///
/// Each byte is widened like a signed C `char`, so bytes `>= 0x80` become
/// `0xFFFF_FF80..=0xFFFF_FFFF`. Under direct indexing such keys need a
/// bucket array close to `u32::MAX` slots; see `TableConfig::max_buckets`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ByteHash;

impl ByteHash {
    pub fn hash_bytes(bytes: &[u8]) -> u32 {
        let mut hash: u32 = 0;
        // Rotation step of the accumulator. Runs once, on zero.
        let high = hash & 0xF800_0000;
        hash <<= 5;
        hash ^= high >> 27;

        for &b in bytes.iter().take_while(|&&b| b != 0) {
            hash ^= b as i8 as u32;
        }
        hash
    }
}

impl<K> KeyHasher<K> for ByteHash
where
    K: AsRef<[u8]> + ?Sized,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        Self::hash_bytes(key.as_ref())
    }
}

/// Adapts a `BuildHasher` to `KeyHasher` by folding its 64-bit digest.
///
/// Produces values spread over the whole `u32` range, so pair it with
/// `Indexing::Modulo`.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherHash<S = DefaultHashBuilder> {
    build: S,
}

impl<S> BuildHasherHash<S> {
    pub fn new(build: S) -> Self {
        Self { build }
    }
}

impl<K, S> KeyHasher<K> for BuildHasherHash<S>
where
    K: Hash + ?Sized,
    S: BuildHasher,
{
    #[inline]
    fn hash(&self, key: &K) -> u32 {
        let h = self.build.hash_one(key);
        (h ^ (h >> 32)) as u32
    }
}
