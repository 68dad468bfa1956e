use criterion::{criterion_group, criterion_main, Criterion};
use jsonkv::Store;
use rand::prelude::*;
use serde_json::json;
use tempfile::TempDir;

fn filled_store(n: usize) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let store: Store = Store::open_path(temp_dir.path()).unwrap();
    for i in 0..n {
        store
            .set(&format!("key{}", i), json!({ "value": i }))
            .unwrap();
    }
    (temp_dir, store)
}

fn write_bench(c: &mut Criterion) {
    c.bench_function("write", |b| {
        b.iter_batched(
            || filled_store(0),
            |(_dir, store)| {
                for i in 0..100 {
                    store
                        .set(&format!("key{}", i), json!({ "value": i }))
                        .unwrap();
                }
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

fn read_bench(c: &mut Criterion) {
    let (_dir, store) = filled_store(100);
    c.bench_function("read", |b| {
        let mut rng = thread_rng();
        b.iter(|| {
            for _ in 0..100 {
                let key = format!("key{}", rng.gen_range(0..100));
                store.get(&key).unwrap();
            }
        });
    });
}

fn enumerate_bench(c: &mut Criterion) {
    let (_dir, store) = filled_store(100);
    c.bench_function("entries", |b| {
        b.iter(|| store.entries().unwrap());
    });
}

criterion_group!(benches, write_bench, read_bench, enumerate_bench);
criterion_main!(benches);
