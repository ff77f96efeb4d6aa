use std::collections::HashSet;

use presentationer::layout::{
    page_file_name, page_index, sanitize_title, MAX_TITLE_BYTES, UNTITLED,
};
use presentationer::{FileSessionStore, Page, PageKind, Session, SessionStore};
use proptest::collection::vec;
use proptest::prelude::*;
use serde_json::json;

fn arb_page() -> impl Strategy<Value = Page> {
    (
        "[a-z0-9]{1,8}",
        "\\PC{0,24}",
        prop_oneof![Just(PageKind::Code), Just(PageKind::ChatThread)],
        any::<i64>(),
        "\\PC{0,16}",
    )
        .prop_map(|(id, title, kind, n, text)| {
            Page::new(id, title, kind, json!({"n": n, "text": text}))
        })
}

/// Pages with distinct ids and titles, as the store requires for a whole list.
fn arb_pages() -> impl Strategy<Value = Vec<Page>> {
    vec(arb_page(), 0..12).prop_map(|pages| {
        let mut ids = HashSet::new();
        let mut titles = HashSet::new();
        pages
            .into_iter()
            .filter(|p| !p.title.is_empty())
            .filter(|p| ids.insert(p.id.clone()) && titles.insert(p.title.clone()))
            .collect()
    })
}

proptest! {
    #[test]
    fn sanitized_titles_are_filename_safe(title in "\\PC*") {
        let clean = sanitize_title(&title);
        prop_assert!(!clean.is_empty());
        prop_assert!(clean.len() <= MAX_TITLE_BYTES);
        prop_assert!(clean
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ')));
        prop_assert_eq!(clean.trim(), clean.as_str());
        if title.chars().all(|c| c == ' ') {
            prop_assert_eq!(clean.as_str(), UNTITLED);
        }
    }

    #[test]
    fn file_names_parse_back_to_position(position in 1usize..5000, title in "\\PC{0,32}") {
        prop_assert_eq!(page_index(&page_file_name(position, &title)), position);
    }

    #[test]
    fn update_then_get_round_trips(pages in arb_pages()) {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::new(tmp.path());
        store
            .update(&Session::new("prop").with_pages(pages.clone()))
            .expect("update");
        let read = store.get("prop").expect("get").pages;
        prop_assert_eq!(read, pages);
    }
}
