//! Upgrade from the aggregated `pages.json` layout to per-page files.
//!
//! Older builds kept every page of a session in one `<session>/pages.json` document, either
//! `{"pages": [...]}` or a bare array. The upgrade is an explicit step run once at startup;
//! regular reads only understand the per-page layout.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::backends::FileSessionStore;
use crate::error::{io_error, serde_error, SessionResult};
use crate::layout::{is_page_file, PAGES_DIR};
use crate::model::Page;

pub const LEGACY_PAGES_FILE: &str = "pages.json";
/// Name the legacy document is moved to once its pages have been rewritten.
pub const MIGRATED_PAGES_FILE: &str = "pages.json.migrated";

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyDocument {
    Wrapped { pages: Vec<Value> },
    Bare(Vec<Value>),
}

impl LegacyDocument {
    fn into_pages(self) -> Vec<Value> {
        match self {
            LegacyDocument::Wrapped { pages } | LegacyDocument::Bare(pages) => pages,
        }
    }
}

/// Outcome of [`FileSessionStore::migrate_legacy_layouts`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Sessions whose legacy document was converted.
    pub migrated: Vec<String>,
    /// Sessions with a legacy document that were left alone because page files already exist.
    pub skipped: Vec<String>,
    /// Sessions whose legacy document could not be read or rewritten. They are left as found.
    pub failed: Vec<String>,
}

impl MigrationReport {
    pub fn is_empty(&self) -> bool {
        self.migrated.is_empty() && self.skipped.is_empty() && self.failed.is_empty()
    }
}

enum Outcome {
    Migrated(usize),
    Skipped,
}

fn has_page_files(dir: &Path) -> SessionResult<bool> {
    let pages_dir = dir.join(PAGES_DIR);
    let entries = match fs::read_dir(&pages_dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(io_error(err, format!("list {}", pages_dir.display()))),
    };
    for entry in entries {
        let entry = entry.map_err(|err| io_error(err, format!("list {}", pages_dir.display())))?;
        if is_page_file(&entry.file_name().to_string_lossy()) {
            return Ok(true);
        }
    }
    Ok(false)
}

fn read_legacy_pages(path: &Path) -> SessionResult<Vec<Page>> {
    let data = fs::read(path).map_err(|err| io_error(err, format!("read {}", path.display())))?;
    let document: LegacyDocument = serde_json::from_slice(&data).map_err(serde_error)?;

    let mut pages = Vec::new();
    for raw in document.into_pages() {
        match serde_json::from_value::<Page>(raw) {
            Ok(page) => pages.push(page),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "dropping malformed legacy page");
            }
        }
    }
    Ok(pages)
}

impl FileSessionStore {
    /// Converts every session still using the aggregated layout. Running it again is a no-op.
    ///
    /// A session that fails to convert is logged and reported; the rest still run.
    pub fn migrate_legacy_layouts(&self) -> SessionResult<MigrationReport> {
        let mut report = MigrationReport::default();
        let entries = match fs::read_dir(self.root()) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(report),
            Err(err) => return Err(io_error(err, format!("list {}", self.root().display()))),
        };

        let mut dirs = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| io_error(err, format!("list {}", self.root().display())))?;
            let dir = entry.path();
            if dir.is_dir() && Self::is_session(&dir) && dir.join(LEGACY_PAGES_FILE).is_file() {
                dirs.push((entry.file_name().to_string_lossy().into_owned(), dir));
            }
        }
        dirs.sort();

        for (name, dir) in dirs {
            match Self::migrate_session(&dir) {
                Ok(Outcome::Migrated(pages)) => {
                    info!(session = %name, pages, "migrated legacy page layout");
                    report.migrated.push(name);
                }
                Ok(Outcome::Skipped) => {
                    warn!(session = %name, "legacy pages.json ignored; page files already present");
                    report.skipped.push(name);
                }
                Err(err) => {
                    warn!(session = %name, error = %err, "legacy page layout not migrated");
                    report.failed.push(name);
                }
            }
        }
        Ok(report)
    }

    fn migrate_session(dir: &Path) -> SessionResult<Outcome> {
        if has_page_files(dir)? {
            return Ok(Outcome::Skipped);
        }
        let legacy = dir.join(LEGACY_PAGES_FILE);
        let pages = read_legacy_pages(&legacy)?;
        Self::write_pages(dir, &pages)?;
        fs::rename(&legacy, dir.join(MIGRATED_PAGES_FILE))
            .map_err(|err| io_error(err, format!("retire {}", legacy.display())))?;
        Ok(Outcome::Migrated(pages.len()))
    }
}
