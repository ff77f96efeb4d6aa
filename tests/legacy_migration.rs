use std::fs;

use presentationer::layout::MARKER_FILE;
use presentationer::migration::{LEGACY_PAGES_FILE, MIGRATED_PAGES_FILE};
use presentationer::{FileSessionStore, Page, PageKind, Session, SessionStore};
use serde_json::json;

fn legacy_session(root: &std::path::Path, name: &str, document: serde_json::Value) {
    let dir = root.join(name);
    fs::create_dir_all(&dir).expect("session dir");
    fs::write(dir.join(MARKER_FILE), b"").expect("marker");
    fs::write(
        dir.join(LEGACY_PAGES_FILE),
        serde_json::to_vec(&document).expect("json"),
    )
    .expect("legacy doc");
}

#[test]
fn wrapped_and_bare_documents_are_converted() {
    let tmp = tempfile::tempdir().expect("tempdir");
    legacy_session(
        tmp.path(),
        "wrapped",
        json!({"pages": [
            {"id": "a", "title": "Intro", "kind": "code", "content": {"src": "x"}},
            {"id": "b", "title": "Chat", "kind": "chat_thread", "content": []}
        ]}),
    );
    legacy_session(
        tmp.path(),
        "bare",
        json!([
            {"id": "only", "title": "Only", "kind": "code"},
            {"id": "broken", "kind": "nonsense"}
        ]),
    );

    let store = FileSessionStore::new(tmp.path());
    let report = store.migrate_legacy_layouts().expect("migrate");
    assert_eq!(report.migrated, ["bare", "wrapped"]);
    assert!(report.skipped.is_empty());

    let wrapped = store.get("wrapped").expect("get");
    assert_eq!(
        wrapped.pages,
        [
            Page::new("a", "Intro", PageKind::Code, json!({"src": "x"})),
            Page::new("b", "Chat", PageKind::ChatThread, json!([])),
        ]
    );
    let bare = store.get("bare").expect("get");
    assert_eq!(bare.pages.len(), 1);
    assert_eq!(bare.pages[0].content, serde_json::Value::Null);

    let dir = tmp.path().join("wrapped");
    assert!(!dir.join(LEGACY_PAGES_FILE).exists());
    assert!(dir.join(MIGRATED_PAGES_FILE).is_file());

    let again = store.migrate_legacy_layouts().expect("second run");
    assert!(again.is_empty());
}

#[test]
fn sessions_with_page_files_are_left_alone() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = FileSessionStore::new(tmp.path());
    store
        .create(&Session::new("current").with_pages(vec![Page::new(
            "new",
            "New",
            PageKind::Code,
            json!(null),
        )]))
        .expect("create");
    fs::write(
        tmp.path().join("current").join(LEGACY_PAGES_FILE),
        br#"{"pages": [{"id": "old", "title": "Old", "kind": "code"}]}"#,
    )
    .expect("stale legacy doc");

    let report = store.migrate_legacy_layouts().expect("migrate");
    assert_eq!(report.skipped, ["current"]);
    let ids: Vec<_> = store
        .get("current")
        .expect("get")
        .pages
        .into_iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(ids, ["new"]);
    assert!(tmp.path().join("current").join(LEGACY_PAGES_FILE).is_file());
}

#[test]
fn missing_root_is_a_no_op() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let store = FileSessionStore::new(tmp.path().join("absent"));
    assert!(store.migrate_legacy_layouts().expect("migrate").is_empty());
}

#[test]
fn unreadable_document_does_not_block_other_sessions() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let bad = tmp.path().join("bad");
    fs::create_dir_all(&bad).expect("session dir");
    fs::write(bad.join(MARKER_FILE), b"").expect("marker");
    fs::write(bad.join(LEGACY_PAGES_FILE), b"{not json").expect("corrupt doc");
    legacy_session(
        tmp.path(),
        "good",
        json!([{"id": "a", "title": "Intro", "kind": "code", "content": 1}]),
    );

    let store = FileSessionStore::new(tmp.path());
    let report = store.migrate_legacy_layouts().expect("migrate");
    assert_eq!(report.migrated, ["good"]);
    assert_eq!(report.failed, ["bad"]);
    assert!(report.skipped.is_empty());

    assert_eq!(store.get("good").expect("get").pages.len(), 1);
    assert!(bad.join(LEGACY_PAGES_FILE).is_file());
    assert!(store.get("bad").expect("get").pages.is_empty());
}
