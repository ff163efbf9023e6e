use brent_table::{Config, QueryMode, SecondaryHash};
use criterion::{criterion_group, criterion_main, Criterion};

fn table_fill_clustered(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill clustered keys");

    for strategy in [SecondaryHash::Modulo, SecondaryHash::BitReversal] {
        group.bench_function(strategy.to_string(), |b| {
            b.iter(|| {
                let mut table = Config::new()
                    .secondary_hash(strategy)
                    .build()
                    .expect("default capacity is prime");

                for j in 1..=126 {
                    let res = table.query(j * 127 * 125, QueryMode::Add, None);
                    assert!(res.slot.is_some());
                }
            });
        });
    }

    group.finish();
}

fn table_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup hit");

    for strategy in [SecondaryHash::Modulo, SecondaryHash::BitReversal] {
        let mut table = Config::new()
            .secondary_hash(strategy)
            .build()
            .expect("default capacity is prime");

        for j in 1..=126 {
            table.query(j * 127, QueryMode::Add, None);
        }

        group.bench_function(strategy.to_string(), |b| {
            b.iter(|| {
                for j in 1..=126 {
                    let res = table.query(j * 127, QueryMode::Lookup, None);
                    assert!(res.found);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, table_fill_clustered, table_lookup_hit);
criterion_main!(benches);
