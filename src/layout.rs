//! On-disk naming for the per-page session layout.
//!
//! ```text
//! <root>/<session>/.presentationer
//! <root>/<session>/pages/<N>.<title>.json
//! <root>/<session>/avatars/<avatar>
//! ```

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{invalid_argument, SessionResult};

/// Empty marker file whose presence turns a directory into a session.
pub const MARKER_FILE: &str = ".presentationer";
pub const PAGES_DIR: &str = "pages";
pub const AVATARS_DIR: &str = "avatars";
pub const PAGE_EXTENSION: &str = ".json";
/// Title used when sanitising leaves nothing behind.
pub const UNTITLED: &str = "Untitled";
/// Longest sanitised title kept in a page file name, in bytes.
pub const MAX_TITLE_BYTES: usize = 100;
/// Sort key for page files whose position prefix does not parse.
pub const UNORDERED_INDEX: usize = 9999;

fn unsafe_title_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9\-_ ]+").expect("static title pattern"))
}

/// Reduces a page title to characters safe for a filename, at most [`MAX_TITLE_BYTES`] long.
pub fn sanitize_title(title: &str) -> String {
    let replaced = unsafe_title_chars().replace_all(title, "_");
    let mut cut = replaced.trim_start();
    if cut.len() > MAX_TITLE_BYTES {
        let mut end = MAX_TITLE_BYTES;
        while !cut.is_char_boundary(end) {
            end -= 1;
        }
        cut = &cut[..end];
    }
    let trimmed = cut.trim_end();
    if trimmed.is_empty() {
        UNTITLED.to_owned()
    } else {
        trimmed.to_owned()
    }
}

/// File name of the page at 1-based `position`.
pub fn page_file_name(position: usize, title: &str) -> String {
    format!("{position}.{}{PAGE_EXTENSION}", sanitize_title(title))
}

/// Position prefix of a page file name, or [`UNORDERED_INDEX`] when it does not parse.
pub fn page_index(file_name: &str) -> usize {
    file_name
        .split('.')
        .next()
        .and_then(|prefix| prefix.parse().ok())
        .unwrap_or(UNORDERED_INDEX)
}

pub fn is_page_file(file_name: &str) -> bool {
    file_name.ends_with(PAGE_EXTENSION)
}

/// Checks that `name` can be joined onto a directory without escaping it.
pub fn validate_segment(field: &str, name: &str) -> SessionResult<()> {
    if name.is_empty() {
        return Err(invalid_argument(format!("{field} is required")));
    }
    if name == "." || name == ".." || name.contains(['/', '\\', '\0']) {
        return Err(invalid_argument(format!(
            "{field} {name:?} is not a valid name"
        )));
    }
    Ok(())
}
