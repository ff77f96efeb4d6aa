use crate::error::SessionResult;
use crate::model::{Page, Session, SessionSummary};

/// Storage interface for presentation sessions, their ordered pages and their avatars.
///
/// Every call runs to completion on the caller's thread. Implementations perform no
/// cross-call coordination: concurrent writers to one session race and the last one wins.
pub trait SessionStore: Send + Sync + 'static {
    /// Lists every session, most recently modified first.
    fn list(&self) -> SessionResult<Vec<SessionSummary>>;

    /// Loads a session with its pages in presentation order.
    fn get(&self, name: &str) -> SessionResult<Session>;

    /// Creates a session, failing with `Conflict` when the name is taken.
    fn create(&self, session: &Session) -> SessionResult<()>;

    /// Replaces the full page list of a session, creating it when needed.
    fn update(&self, session: &Session) -> SessionResult<()>;

    /// Removes a session and everything under it. Removing an absent session succeeds.
    fn delete(&self, name: &str) -> SessionResult<()>;

    /// Renames a session, failing with `Conflict` when `new_name` is taken.
    fn rename(&self, old_name: &str, new_name: &str) -> SessionResult<()>;

    /// Appends a page after checking id and title uniqueness.
    fn create_page(&self, session: &str, page: Page) -> SessionResult<()>;

    /// Replaces the page with the same id in place.
    fn update_page(&self, session: &str, page: Page) -> SessionResult<()>;

    /// Removes a page; later pages move up to close the gap.
    fn delete_page(&self, session: &str, page_id: &str) -> SessionResult<()>;

    fn list_avatars(&self, session: &str) -> SessionResult<Vec<String>>;

    /// Writes an avatar, overwriting any existing blob with the same name.
    fn save_avatar(&self, session: &str, name: &str, data: &[u8]) -> SessionResult<()>;

    fn delete_avatar(&self, session: &str, name: &str) -> SessionResult<()>;

    /// Renames an avatar. An existing avatar named `new_name` is overwritten.
    fn rename_avatar(&self, session: &str, old_name: &str, new_name: &str) -> SessionResult<()>;

    fn get_avatar(&self, session: &str, name: &str) -> SessionResult<Vec<u8>>;
}
