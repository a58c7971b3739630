#![cfg(test)]

// Property tests for DirectHashMap kept inside the crate so they can use
// internal helpers without widening the public surface.

use crate::config::{Indexing, TableConfig};
use crate::direct_hash_map::DirectHashMap;
use crate::hash::{BuildHasherHash, ByteHash, KeyHasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::hash_map::RandomState;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}
impl AsRef<[u8]> for Key {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

// Hash by length only: every key of equal length shares a bucket.
#[derive(Clone, Copy)]
struct LenHash;
impl KeyHasher<str> for LenHash {
    fn hash(&self, key: &str) -> u32 {
        key.len() as u32
    }
}
impl KeyHasher<Key> for LenHash {
    fn hash(&self, key: &Key) -> u32 {
        key.0.len() as u32
    }
}

// Pool-indexed operations so shrinking moves toward earlier keys and
// shorter op lists.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Get(usize),
    Remove(usize),
    Mutate(usize, i32),
    Contains(String),
    Clear,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Get),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => Just(OpI::Clear),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Invariants checked after every op:
// - `get`/`contains_key` agree with the model; `remove` returns the model's value.
// - Re-insert overwrites in place; `len` matches the model.
// - Chain lengths across all buckets sum to `len`.
// - Capacity never shrinks (clear included).
// - Iteration yields each live entry exactly once.
fn run_state_machine<H>(
    mut sut: DirectHashMap<Key, i32, H>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError>
where
    H: KeyHasher<Key> + KeyHasher<str>,
{
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        let capacity_before = sut.capacity();
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let stored = *sut.insert(k.clone(), v).expect("small hashes always fit");
                prop_assert_eq!(stored, v);
                model.insert(k, v);
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.remove(&k), model.remove(&k));
                prop_assert!(sut.get(&k).is_none());
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(s), Some(m)) => {
                        *s = s.saturating_add(d);
                        *m = m.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), capacity_before);
            }
            OpI::Iterate => {
                let seen: BTreeMap<Key, i32> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let expected: BTreeMap<Key, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(sut.iter().count(), model.len());
                prop_assert_eq!(seen, expected);
            }
        }

        prop_assert!(sut.capacity() >= capacity_before);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        let chained: usize = (0..sut.capacity()).map(|i| sut.bucket_len(i)).sum();
        prop_assert_eq!(chained, sut.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    // Default byte hash with direct indexing. XOR folding of short ASCII
    // keys collides often, so chains get exercised too.
    #[test]
    fn prop_state_machine_byte_hash((pool, ops) in arb_scenario()) {
        let sut: DirectHashMap<Key, i32> = DirectHashMap::with_hasher(ByteHash);
        run_state_machine(sut, &pool, ops)?;
    }

    // Length-only hash from a zero-bucket start: every insert of a longer
    // key grows the array, every equal-length key collides.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let config = TableConfig::new().initial_buckets(0);
        let sut = DirectHashMap::with_config(config, LenHash).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }

    // Modulo indexing over a full-range hash, starting tiny so the array
    // is redistributed repeatedly.
    #[test]
    fn prop_state_machine_modulo((pool, ops) in arb_scenario()) {
        let config = TableConfig::new().indexing(Indexing::Modulo).initial_buckets(1);
        let sut = DirectHashMap::with_config(config, BuildHasherHash::new(RandomState::new())).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}
