use std::cmp::Reverse;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::error::{conflict, io_error, not_found, serde_error, SessionResult};
use crate::layout::{
    is_page_file, page_file_name, page_index, validate_segment, AVATARS_DIR, MARKER_FILE,
    PAGES_DIR,
};
use crate::model::{Page, Session, SessionSummary};
use crate::pages::{insert_page, remove_page, replace_page, validate_pages};
use crate::store::SessionStore;

/// Session store that keeps one directory per session under a root directory.
///
/// Pages are individual JSON files whose names carry their 1-based position, so every page
/// mutation rewrites the whole `pages/` directory. Avatars are raw files under `avatars/`.
#[derive(Clone, Debug)]
pub struct FileSessionStore {
    root: PathBuf,
}

impl FileSessionStore {
    /// Creates a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn session_dir(&self, name: &str) -> SessionResult<PathBuf> {
        validate_segment("session name", name)?;
        Ok(self.root.join(name))
    }

    fn avatar_path(&self, session: &str, name: &str) -> SessionResult<PathBuf> {
        validate_segment("avatar name", name)?;
        Ok(self.session_dir(session)?.join(AVATARS_DIR).join(name))
    }

    /// The marker may also be a directory, as written by early builds.
    pub(crate) fn is_session(dir: &Path) -> bool {
        dir.join(MARKER_FILE).exists()
    }

    fn ensure_root(&self) -> SessionResult<()> {
        fs::create_dir_all(&self.root)
            .map_err(|err| io_error(err, format!("create root {}", self.root.display())))
    }

    /// Directory of an existing session, or `NotFound`.
    fn existing_session_dir(&self, name: &str) -> SessionResult<PathBuf> {
        let dir = self.session_dir(name)?;
        if !Self::is_session(&dir) {
            return Err(not_found(format!("session {name}")));
        }
        Ok(dir)
    }

    fn write_marker(dir: &Path) -> SessionResult<()> {
        let marker = dir.join(MARKER_FILE);
        fs::write(&marker, b"")
            .map_err(|err| io_error(err, format!("write marker {}", marker.display())))
    }

    fn create_dir(path: &Path) -> SessionResult<()> {
        fs::create_dir_all(path).map_err(|err| io_error(err, format!("create {}", path.display())))
    }

    fn last_modified(dir: &Path) -> SessionResult<OffsetDateTime> {
        let metadata = fs::metadata(dir.join(PAGES_DIR))
            .or_else(|_| fs::metadata(dir))
            .map_err(|err| io_error(err, format!("stat {}", dir.display())))?;
        let modified = metadata
            .modified()
            .map_err(|err| io_error(err, format!("mtime {}", dir.display())))?;
        Ok(OffsetDateTime::from(modified))
    }

    /// Listing entry for `dir`, or `None` when it disappeared after being seen.
    fn summarize(dir: &Path, name: String) -> Option<SessionSummary> {
        match Self::last_modified(dir) {
            Ok(last_modified) => Some(SessionSummary {
                name,
                last_modified,
            }),
            Err(err) => {
                debug!(session = %name, error = %err, "session vanished while listing");
                None
            }
        }
    }

    /// Reads the pages of a session directory in presentation order. Unreadable or malformed
    /// page files are skipped.
    pub(crate) fn read_pages(dir: &Path) -> SessionResult<Vec<Page>> {
        let pages_dir = dir.join(PAGES_DIR);
        let entries = match fs::read_dir(&pages_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(err, format!("list {}", pages_dir.display()))),
        };

        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| io_error(err, format!("list {}", pages_dir.display())))?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if is_file && is_page_file(&file_name) {
                files.push(file_name);
            }
        }
        files.sort_by(|a, b| page_index(a).cmp(&page_index(b)).then_with(|| a.cmp(b)));

        let mut pages = Vec::with_capacity(files.len());
        for file_name in files {
            let path = pages_dir.join(&file_name);
            let data = match fs::read(&path) {
                Ok(data) => data,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable page file");
                    continue;
                }
            };
            match serde_json::from_slice::<Page>(&data) {
                Ok(page) => pages.push(page),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping malformed page file");
                }
            }
        }
        Ok(pages)
    }

    /// Writes `pages` in order, numbering from 1, and swaps them in for the current `pages/`.
    ///
    /// Files are staged in a sibling directory first, so a failed write leaves the previous
    /// page set in place.
    pub(crate) fn write_pages(dir: &Path, pages: &[Page]) -> SessionResult<()> {
        let pages_dir = dir.join(PAGES_DIR);
        let stamp = staging_stamp();
        let staging = dir.join(format!(".{PAGES_DIR}.tmp.{stamp}"));
        Self::create_dir(&staging)?;
        if let Err(err) = Self::write_page_files(&staging, pages) {
            discard_dir(&staging);
            return Err(err);
        }

        let retired = dir.join(format!(".{PAGES_DIR}.old.{stamp}"));
        let had_pages = match fs::rename(&pages_dir, &retired) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(err) => {
                discard_dir(&staging);
                return Err(io_error(err, format!("retire {}", pages_dir.display())));
            }
        };
        if let Err(err) = fs::rename(&staging, &pages_dir) {
            if had_pages {
                if let Err(restore) = fs::rename(&retired, &pages_dir) {
                    warn!(path = %retired.display(), error = %restore, "could not restore pages");
                }
            }
            discard_dir(&staging);
            return Err(io_error(err, format!("replace {}", pages_dir.display())));
        }
        if had_pages {
            discard_dir(&retired);
        }
        Ok(())
    }

    fn write_page_files(target: &Path, pages: &[Page]) -> SessionResult<()> {
        for (index, page) in pages.iter().enumerate() {
            let path = target.join(page_file_name(index + 1, &page.title));
            let data = serde_json::to_vec_pretty(page).map_err(serde_error)?;
            fs::write(&path, data)
                .map_err(|err| io_error(err, format!("write {}", path.display())))?;
        }
        Ok(())
    }

    /// Read-all, mutate, write-all round trip over an existing session's pages.
    fn modify_pages<T>(
        &self,
        session: &str,
        apply: impl FnOnce(&mut Vec<Page>) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let dir = self.existing_session_dir(session)?;
        let mut pages = Self::read_pages(&dir)?;
        let out = apply(&mut pages)?;
        Self::write_pages(&dir, &pages)?;
        Ok(out)
    }
}

fn staging_stamp() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}.{nanos}", std::process::id())
}

fn discard_dir(path: &Path) {
    if let Err(err) = fs::remove_dir_all(path) {
        if err.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "could not remove scratch directory");
        }
    }
}

impl SessionStore for FileSessionStore {
    fn list(&self) -> SessionResult<Vec<SessionSummary>> {
        self.ensure_root()?;
        let entries = fs::read_dir(&self.root)
            .map_err(|err| io_error(err, format!("list {}", self.root.display())))?;

        let mut sessions = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| io_error(err, format!("list {}", self.root.display())))?;
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            let dir = entry.path();
            if !Self::is_session(&dir) {
                continue;
            }
            let Ok(name) = entry.file_name().into_string() else {
                warn!(path = %dir.display(), "skipping session with non UTF-8 name");
                continue;
            };
            sessions.extend(Self::summarize(&dir, name));
        }

        sessions.sort_by(|a, b| {
            Reverse(a.last_modified)
                .cmp(&Reverse(b.last_modified))
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(sessions)
    }

    fn get(&self, name: &str) -> SessionResult<Session> {
        let dir = self.existing_session_dir(name)?;
        let pages = Self::read_pages(&dir)?;
        Ok(Session {
            name: name.to_owned(),
            last_modified: Some(Self::last_modified(&dir)?),
            pages,
        })
    }

    fn create(&self, session: &Session) -> SessionResult<()> {
        let dir = self.session_dir(&session.name)?;
        if dir.exists() {
            return Err(conflict(format!("session {} already exists", session.name)));
        }
        validate_pages(&session.pages)?;

        Self::create_dir(&dir)?;
        Self::write_marker(&dir)?;
        Self::create_dir(&dir.join(AVATARS_DIR))?;
        Self::create_dir(&dir.join(PAGES_DIR))?;
        Self::write_pages(&dir, &session.pages)?;
        debug!(session = %session.name, pages = session.pages.len(), "created session");
        Ok(())
    }

    fn update(&self, session: &Session) -> SessionResult<()> {
        let dir = self.session_dir(&session.name)?;
        validate_pages(&session.pages)?;
        Self::create_dir(&dir)?;
        if !Self::is_session(&dir) {
            Self::write_marker(&dir)?;
        }
        Self::write_pages(&dir, &session.pages)?;
        debug!(session = %session.name, pages = session.pages.len(), "updated session");
        Ok(())
    }

    fn delete(&self, name: &str) -> SessionResult<()> {
        let dir = self.session_dir(name)?;
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                debug!(session = %name, "deleted session");
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err, format!("delete {}", dir.display()))),
        }
    }

    fn rename(&self, old_name: &str, new_name: &str) -> SessionResult<()> {
        let old_dir = self.existing_session_dir(old_name)?;
        let new_dir = self.session_dir(new_name)?;
        if new_dir.exists() {
            return Err(conflict(format!("session {new_name} already exists")));
        }
        fs::rename(&old_dir, &new_dir)
            .map_err(|err| io_error(err, format!("rename session {old_name}")))?;
        debug!(from = %old_name, to = %new_name, "renamed session");
        Ok(())
    }

    fn create_page(&self, session: &str, page: Page) -> SessionResult<()> {
        let id = page.id.clone();
        self.modify_pages(session, |pages| insert_page(pages, page))?;
        debug!(session = %session, page = %id, "created page");
        Ok(())
    }

    fn update_page(&self, session: &str, page: Page) -> SessionResult<()> {
        let id = page.id.clone();
        self.modify_pages(session, |pages| replace_page(pages, page))?;
        debug!(session = %session, page = %id, "updated page");
        Ok(())
    }

    fn delete_page(&self, session: &str, page_id: &str) -> SessionResult<()> {
        self.modify_pages(session, |pages| remove_page(pages, page_id))?;
        debug!(session = %session, page = %page_id, "deleted page");
        Ok(())
    }

    fn list_avatars(&self, session: &str) -> SessionResult<Vec<String>> {
        let avatars_dir = self.session_dir(session)?.join(AVATARS_DIR);
        let entries = match fs::read_dir(&avatars_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(err, format!("list {}", avatars_dir.display()))),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|err| io_error(err, format!("list {}", avatars_dir.display())))?;
            if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn save_avatar(&self, session: &str, name: &str, data: &[u8]) -> SessionResult<()> {
        validate_segment("avatar name", name)?;
        let avatars_dir = self.existing_session_dir(session)?.join(AVATARS_DIR);
        Self::create_dir(&avatars_dir)?;
        let path = avatars_dir.join(name);
        fs::write(&path, data).map_err(|err| io_error(err, format!("write avatar {name}")))?;
        debug!(session = %session, avatar = %name, bytes = data.len(), "saved avatar");
        Ok(())
    }

    fn delete_avatar(&self, session: &str, name: &str) -> SessionResult<()> {
        let path = self.avatar_path(session, name)?;
        fs::remove_file(&path).map_err(|err| io_error(err, format!("avatar {name}")))?;
        debug!(session = %session, avatar = %name, "deleted avatar");
        Ok(())
    }

    fn rename_avatar(&self, session: &str, old_name: &str, new_name: &str) -> SessionResult<()> {
        let old_path = self.avatar_path(session, old_name)?;
        let new_path = self.avatar_path(session, new_name)?;
        if !old_path.is_file() {
            return Err(not_found(format!("avatar {old_name}")));
        }
        fs::rename(&old_path, &new_path)
            .map_err(|err| io_error(err, format!("rename avatar {old_name}")))?;
        debug!(session = %session, from = %old_name, to = %new_name, "renamed avatar");
        Ok(())
    }

    fn get_avatar(&self, session: &str, name: &str) -> SessionResult<Vec<u8>> {
        let path = self.avatar_path(session, name)?;
        fs::read(&path).map_err(|err| io_error(err, format!("avatar {name}")))
    }
}
