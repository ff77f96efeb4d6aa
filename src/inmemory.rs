use std::collections::BTreeMap;

use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use time::OffsetDateTime;

use crate::error::{conflict, not_found, SessionResult};
use crate::layout::validate_segment;
use crate::model::{Page, Session, SessionSummary};
use crate::pages::{insert_page, remove_page, replace_page, validate_pages};
use crate::store::SessionStore;

struct Entry {
    pages: Vec<Page>,
    avatars: BTreeMap<String, Vec<u8>>,
    modified: OffsetDateTime,
}

impl Entry {
    fn new(pages: Vec<Page>) -> Self {
        Self {
            pages,
            avatars: BTreeMap::new(),
            modified: OffsetDateTime::now_utc(),
        }
    }

    fn touch(&mut self) {
        self.modified = OffsetDateTime::now_utc();
    }
}

/// In-memory implementation backed by a concurrent hash map. Nothing survives the process.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: DashMap<String, Entry>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entry<T>(
        &self,
        name: &str,
        apply: impl FnOnce(&mut Entry) -> SessionResult<T>,
    ) -> SessionResult<T> {
        validate_segment("session name", name)?;
        let mut guard = self
            .entries
            .get_mut(name)
            .ok_or_else(|| not_found(format!("session {name}")))?;
        apply(guard.value_mut())
    }

    /// Applies a page mutation to a copy so a failed rule leaves the stored list untouched.
    fn modify_pages<T>(
        &self,
        name: &str,
        apply: impl FnOnce(&mut Vec<Page>) -> SessionResult<T>,
    ) -> SessionResult<T> {
        self.with_entry(name, |entry| {
            let mut pages = entry.pages.clone();
            let out = apply(&mut pages)?;
            entry.pages = pages;
            entry.touch();
            Ok(out)
        })
    }
}

impl SessionStore for InMemorySessionStore {
    fn list(&self) -> SessionResult<Vec<SessionSummary>> {
        let mut sessions: Vec<_> = self
            .entries
            .iter()
            .map(|entry| SessionSummary {
                name: entry.key().clone(),
                last_modified: entry.value().modified,
            })
            .collect();
        sessions.sort_by(|a, b| {
            b.last_modified
                .cmp(&a.last_modified)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(sessions)
    }

    fn get(&self, name: &str) -> SessionResult<Session> {
        self.with_entry(name, |entry| {
            Ok(Session {
                name: name.to_owned(),
                last_modified: Some(entry.modified),
                pages: entry.pages.clone(),
            })
        })
    }

    fn create(&self, session: &Session) -> SessionResult<()> {
        validate_segment("session name", &session.name)?;
        validate_pages(&session.pages)?;
        match self.entries.entry(session.name.clone()) {
            MapEntry::Occupied(_) => Err(conflict(format!(
                "session {} already exists",
                session.name
            ))),
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(session.pages.clone()));
                Ok(())
            }
        }
    }

    fn update(&self, session: &Session) -> SessionResult<()> {
        validate_segment("session name", &session.name)?;
        validate_pages(&session.pages)?;
        match self.entries.entry(session.name.clone()) {
            MapEntry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                entry.pages = session.pages.clone();
                entry.touch();
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(session.pages.clone()));
            }
        }
        Ok(())
    }

    fn delete(&self, name: &str) -> SessionResult<()> {
        validate_segment("session name", name)?;
        self.entries.remove(name);
        Ok(())
    }

    fn rename(&self, old_name: &str, new_name: &str) -> SessionResult<()> {
        validate_segment("session name", old_name)?;
        validate_segment("session name", new_name)?;
        if !self.entries.contains_key(old_name) {
            return Err(not_found(format!("session {old_name}")));
        }
        if self.entries.contains_key(new_name) {
            return Err(conflict(format!("session {new_name} already exists")));
        }
        let (_, entry) = self
            .entries
            .remove(old_name)
            .ok_or_else(|| not_found(format!("session {old_name}")))?;
        self.entries.insert(new_name.to_owned(), entry);
        Ok(())
    }

    fn create_page(&self, session: &str, page: Page) -> SessionResult<()> {
        self.modify_pages(session, |pages| insert_page(pages, page))
    }

    fn update_page(&self, session: &str, page: Page) -> SessionResult<()> {
        self.modify_pages(session, |pages| replace_page(pages, page))
    }

    fn delete_page(&self, session: &str, page_id: &str) -> SessionResult<()> {
        self.modify_pages(session, |pages| remove_page(pages, page_id).map(drop))
    }

    fn list_avatars(&self, session: &str) -> SessionResult<Vec<String>> {
        validate_segment("session name", session)?;
        Ok(self
            .entries
            .get(session)
            .map(|entry| entry.avatars.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn save_avatar(&self, session: &str, name: &str, data: &[u8]) -> SessionResult<()> {
        validate_segment("avatar name", name)?;
        self.with_entry(session, |entry| {
            entry.avatars.insert(name.to_owned(), data.to_vec());
            Ok(())
        })
    }

    fn delete_avatar(&self, session: &str, name: &str) -> SessionResult<()> {
        validate_segment("avatar name", name)?;
        self.with_entry(session, |entry| {
            entry
                .avatars
                .remove(name)
                .map(drop)
                .ok_or_else(|| not_found(format!("avatar {name}")))
        })
    }

    fn rename_avatar(&self, session: &str, old_name: &str, new_name: &str) -> SessionResult<()> {
        validate_segment("avatar name", old_name)?;
        validate_segment("avatar name", new_name)?;
        self.with_entry(session, |entry| {
            let data = entry
                .avatars
                .remove(old_name)
                .ok_or_else(|| not_found(format!("avatar {old_name}")))?;
            entry.avatars.insert(new_name.to_owned(), data);
            Ok(())
        })
    }

    fn get_avatar(&self, session: &str, name: &str) -> SessionResult<Vec<u8>> {
        validate_segment("avatar name", name)?;
        self.with_entry(session, |entry| {
            entry
                .avatars
                .get(name)
                .cloned()
                .ok_or_else(|| not_found(format!("avatar {name}")))
        })
    }
}
