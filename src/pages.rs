//! Page-list mutations shared by every backend.
//!
//! Backends read the whole ordered list, apply one of these functions and write the whole list
//! back. Each function either mutates the list or returns an error with the list untouched.

use std::collections::HashSet;

use crate::error::{conflict, invalid_argument, not_found, SessionResult};
use crate::model::Page;

/// Appends `page` unless its id or title is already present.
pub fn insert_page(pages: &mut Vec<Page>, page: Page) -> SessionResult<()> {
    if page.id.is_empty() {
        return Err(invalid_argument("page id is required"));
    }
    if page.title.is_empty() {
        return Err(invalid_argument("page title is required"));
    }
    if pages.iter().any(|p| p.id == page.id) {
        return Err(conflict(format!("page id {} already exists", page.id)));
    }
    if pages.iter().any(|p| p.title == page.title) {
        return Err(conflict(format!("page title {} already exists", page.title)));
    }
    pages.push(page);
    Ok(())
}

/// Replaces the page sharing `page.id`, keeping its position.
pub fn replace_page(pages: &mut [Page], page: Page) -> SessionResult<()> {
    if page.id.is_empty() {
        return Err(invalid_argument("page id is required"));
    }
    if page.title.is_empty() {
        return Err(invalid_argument("page title is required"));
    }
    let index = position_of(pages, &page.id)?;
    if pages[index].title != page.title
        && pages
            .iter()
            .any(|p| p.id != page.id && p.title == page.title)
    {
        return Err(conflict(format!("page title {} already exists", page.title)));
    }
    pages[index] = page;
    Ok(())
}

/// Checks a whole page list before it replaces a session's pages.
pub fn validate_pages(pages: &[Page]) -> SessionResult<()> {
    let mut ids = HashSet::with_capacity(pages.len());
    let mut titles = HashSet::with_capacity(pages.len());
    for page in pages {
        if page.id.is_empty() {
            return Err(invalid_argument("page id is required"));
        }
        if page.title.is_empty() {
            return Err(invalid_argument("page title is required"));
        }
        if !ids.insert(page.id.as_str()) {
            return Err(conflict(format!("page id {} appears twice", page.id)));
        }
        if !titles.insert(page.title.as_str()) {
            return Err(conflict(format!("page title {} appears twice", page.title)));
        }
    }
    Ok(())
}

/// Removes the page with `page_id` and returns it.
pub fn remove_page(pages: &mut Vec<Page>, page_id: &str) -> SessionResult<Page> {
    let index = position_of(pages, page_id)?;
    Ok(pages.remove(index))
}

fn position_of(pages: &[Page], page_id: &str) -> SessionResult<usize> {
    pages
        .iter()
        .position(|p| p.id == page_id)
        .ok_or_else(|| not_found(format!("page {page_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::model::PageKind;
    use serde_json::json;

    fn page(id: &str, title: &str) -> Page {
        Page::new(id, title, PageKind::Code, json!({"id": id}))
    }

    fn ids(pages: &[Page]) -> Vec<&str> {
        pages.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn insert_rejects_duplicates_without_mutating() {
        let mut pages = vec![page("p1", "Intro")];

        let err = insert_page(&mut pages, page("p1", "Other")).expect_err("dup id");
        assert_eq!(err.code, ErrorCode::Conflict);
        let err = insert_page(&mut pages, page("p2", "Intro")).expect_err("dup title");
        assert_eq!(err.code, ErrorCode::Conflict);
        assert_eq!(ids(&pages), ["p1"]);

        insert_page(&mut pages, page("p2", "Body")).expect("insert");
        assert_eq!(ids(&pages), ["p1", "p2"]);
    }

    #[test]
    fn insert_requires_id_and_title() {
        let mut pages = Vec::new();
        let err = insert_page(&mut pages, page("", "Intro")).expect_err("no id");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        let err = insert_page(&mut pages, page("p1", "")).expect_err("no title");
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn replace_requires_id_and_title() {
        let mut pages = vec![page("a", "One")];
        let err = replace_page(&mut pages, page("", "One")).expect_err("no id");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        let err = replace_page(&mut pages, page("a", "")).expect_err("no title");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert_eq!(pages[0].title, "One");
    }

    #[test]
    fn whole_lists_must_be_unique_and_complete() {
        validate_pages(&[]).expect("empty list");
        validate_pages(&[page("a", "One"), page("b", "Two")]).expect("distinct");

        let err = validate_pages(&[page("a", "One"), page("a", "Two")]).expect_err("dup id");
        assert_eq!(err.code, ErrorCode::Conflict);
        let err = validate_pages(&[page("a", "One"), page("b", "One")]).expect_err("dup title");
        assert_eq!(err.code, ErrorCode::Conflict);
        let err = validate_pages(&[page("a", "One"), page("", "Two")]).expect_err("no id");
        assert_eq!(err.code, ErrorCode::InvalidInput);
        let err = validate_pages(&[page("a", "")]).expect_err("no title");
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn replace_keeps_position_and_checks_title() {
        let mut pages = vec![page("a", "One"), page("b", "Two"), page("c", "Three")];

        let err = replace_page(&mut pages, page("b", "Three")).expect_err("title taken");
        assert_eq!(err.code, ErrorCode::Conflict);

        replace_page(&mut pages, page("b", "Two")).expect("same title is fine");
        replace_page(&mut pages, page("b", "Deux")).expect("rename");
        assert_eq!(ids(&pages), ["a", "b", "c"]);
        assert_eq!(pages[1].title, "Deux");

        let err = replace_page(&mut pages, page("zz", "New")).expect_err("missing");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut pages = vec![page("a", "One"), page("b", "Two"), page("c", "Three")];
        let removed = remove_page(&mut pages, "b").expect("remove");
        assert_eq!(removed.title, "Two");
        assert_eq!(ids(&pages), ["a", "c"]);

        let err = remove_page(&mut pages, "b").expect_err("already gone");
        assert!(err.is_not_found());
    }
}
