use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use direct_hashmap::{BuildHasherHash, DirectHashMap, TableConfig};
use std::time::Duration;

fn lcg(mut s: u64) -> impl Iterator<Item = u64> {
    std::iter::from_fn(move || {
        s = s.wrapping_mul(6364136223846793005).wrapping_add(1);
        Some(s)
    })
}

fn key(n: u64) -> String {
    format!("k{:016x}", n)
}

// The default byte hash folds short hex keys into a few dozen buckets, so
// this measures chain walking more than indexing.
fn bench_insert_byte_hash(c: &mut Criterion) {
    let keys: Vec<_> = lcg(1).take(2_000).map(key).collect();
    c.bench_function("direct_hashmap_insert_2k_byte_hash", |b| {
        b.iter_batched(
            || (DirectHashMap::<String, u64>::new(), keys.clone()),
            |(mut m, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    m.insert(k, i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_insert_modulo(c: &mut Criterion) {
    let keys: Vec<_> = lcg(3).take(10_000).map(key).collect();
    c.bench_function("direct_hashmap_insert_10k_modulo", |b| {
        b.iter_batched(
            || {
                let m = DirectHashMap::with_config(TableConfig::modulo(), <BuildHasherHash>::default())
                    .unwrap();
                (m, keys.clone())
            },
            |(mut m, keys)| {
                for (i, k) in keys.into_iter().enumerate() {
                    m.insert(k, i as u64).unwrap();
                }
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_get_hit(c: &mut Criterion) {
    c.bench_function("direct_hashmap_get_hit_modulo", |b| {
        let mut m = DirectHashMap::with_config(TableConfig::modulo(), <BuildHasherHash>::default())
            .unwrap();
        let keys: Vec<_> = lcg(7).take(20_000).map(key).collect();
        for (i, k) in keys.iter().cloned().enumerate() {
            m.insert(k, i as u64).unwrap();
        }
        let mut it = keys.iter().cycle();
        b.iter(|| {
            let k = it.next().unwrap();
            black_box(m.get(k.as_str()));
        })
    });
}

fn bench_get_miss(c: &mut Criterion) {
    c.bench_function("direct_hashmap_get_miss_direct", |b| {
        // Identity hash over u32 keys: misses land in range or beyond it.
        let mut m = DirectHashMap::with_hasher(|k: &u32| -> u32 { *k });
        for k in (0..10_000u32).step_by(2) {
            m.insert(k, k).unwrap();
        }
        let mut miss = lcg(0xdead_beef).map(|x| (x % 20_000) as u32 | 1);
        b.iter(|| {
            let k = miss.next().unwrap();
            black_box(m.get(&k));
        })
    });
}

fn bench_clear(c: &mut Criterion) {
    c.bench_function("direct_hashmap_clear_5k", |b| {
        b.iter_batched(
            || {
                let mut m = DirectHashMap::with_hasher(|k: &u32| -> u32 { *k % 512 });
                for k in 0..5_000u32 {
                    m.insert(k, k).unwrap();
                }
                m
            },
            |mut m| {
                m.clear();
                black_box(m)
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_config() -> Criterion {
    Criterion::default()
        .sample_size(50)
        .measurement_time(Duration::from_secs(8))
        .warm_up_time(Duration::from_secs(2))
}

criterion_group! {
    name = benches;
    config = bench_config();
    targets = bench_insert_byte_hash, bench_insert_modulo, bench_get_hit, bench_get_miss, bench_clear
}
criterion_main!(benches);
