use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use std::sync::Arc;

use keepsake::host::Origin;
use keepsake::theme::RootElement;
use keepsake::{FavoriteSet, RecencyList, Signal, StorageStore, ThemeStore};

fn slot(origin: &Origin, key: &str) -> StorageStore {
    let tab = Arc::new(origin.open_tab());
    StorageStore::new(key, tab.clone(), tab)
}

fn snapshot_read_benchmark(c: &mut Criterion) {
    let origin = Origin::new();
    let store = slot(&origin, "k");
    store.write(|_| "value".to_string());

    c.bench_function("snapshot_read", |b| {
        b.iter(|| {
            black_box(store.read());
        });
    });
}

fn add_recent_benchmark(c: &mut Criterion) {
    let origin = Origin::new();
    let recent = RecencyList::new(slot(&origin, "recent-tools"), 5);
    let ids = ["a", "b", "c", "d", "e", "f", "g"];

    c.bench_function("add_recent", |b| {
        let mut i = 0;
        b.iter(|| {
            recent.add_recent(black_box(ids[i % ids.len()]));
            i += 1;
        });
    });
}

fn toggle_favorite_benchmark(c: &mut Criterion) {
    let origin = Origin::new();
    let favorites = FavoriteSet::new(slot(&origin, "favorite-tools"));

    c.bench_function("toggle_favorite", |b| {
        b.iter(|| {
            black_box(favorites.toggle_favorite(black_box("emi-calculator")));
        });
    });
}

fn os_signal_flip_benchmark(c: &mut Criterion) {
    let origin = Origin::new();
    let os_dark = Signal::new(false);
    let theme = ThemeStore::new(
        slot(&origin, "theme"),
        os_dark.clone(),
        Arc::new(RootElement::default()),
    );

    c.bench_function("os_signal_flip", |b| {
        let mut dark = false;
        b.iter(|| {
            dark = !dark;
            os_dark.set(dark);
            black_box(theme.is_dark());
        });
    });
}

fn write_subscribe_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_subscribe");

    for subscriber_count in [1, 10, 100].iter() {
        let origin = Origin::new();
        let store = slot(&origin, "k");

        let _subscriptions: Vec<_> = (0..*subscriber_count)
            .map(|_| {
                store.subscribe(|| {
                    // Empty subscriber
                })
            })
            .collect();

        group.bench_with_input(
            BenchmarkId::from_parameter(subscriber_count),
            subscriber_count,
            |b, _| {
                let mut i = 0usize;
                b.iter(|| {
                    store.write(|_| black_box(i).to_string());
                    i += 1;
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    snapshot_read_benchmark,
    add_recent_benchmark,
    toggle_favorite_benchmark,
    os_signal_flip_benchmark,
    write_subscribe_benchmark,
);
criterion_main!(benches);
