use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use presentationer::{
    FileSessionStore, InMemorySessionStore, Page, PageKind, Session, SessionStore,
};
use serde_json::json;

fn bench_pages(count: usize) -> Vec<Page> {
    (0..count)
        .map(|i| {
            Page::new(
                format!("page-{i}"),
                format!("Slide {i}: overview"),
                PageKind::Code,
                json!({"lang": "rust", "source": "fn main() {}".repeat(8)}),
            )
        })
        .collect()
}

fn file_benches(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = FileSessionStore::new(tmp.path());
    store
        .create(&Session::new("bench").with_pages(bench_pages(20)))
        .expect("seed session");

    c.bench_function("file_get_20_pages", |b| {
        b.iter(|| black_box(store.get("bench").expect("get")));
    });

    c.bench_function("file_update_page", |b| {
        let mut revision = 0u64;
        b.iter(|| {
            revision += 1;
            let page = Page::new("page-10", "Slide 10: overview", PageKind::Code, json!(revision));
            store.update_page("bench", page).expect("update page");
        });
    });

    c.bench_function("file_create_then_delete_page", |b| {
        b.iter(|| {
            let page = Page::new("scratch", "Scratch", PageKind::ChatThread, json!([]));
            store.create_page("bench", page).expect("create page");
            store.delete_page("bench", "scratch").expect("delete page");
        });
    });

    c.bench_function("file_list", |b| {
        b.iter(|| black_box(store.list().expect("list")));
    });
}

fn inmemory_benches(c: &mut Criterion) {
    let store = InMemorySessionStore::new();

    c.bench_function("inmemory_update_session", |b| {
        b.iter_batched(
            || Session::new("bench").with_pages(bench_pages(20)),
            |session| store.update(&session).expect("update"),
            BatchSize::SmallInput,
        );
    });

    c.bench_function("inmemory_get", |b| {
        b.iter(|| black_box(store.get("bench").expect("get")));
    });
}

criterion_group!(session_ops, file_benches, inmemory_benches);
criterion_main!(session_ops);
