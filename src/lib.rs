#![forbid(unsafe_code)]

pub mod backends;
pub mod error;
pub mod inmemory;
pub mod layout;
pub mod migration;
pub mod model;
pub mod pages;
#[cfg(feature = "server")]
pub mod server;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;

pub use backends::FileSessionStore;
pub use error::{ErrorCode, SessionResult, StoreError};
pub use inmemory::InMemorySessionStore;
pub use migration::MigrationReport;
pub use model::{Page, PageKind, Session, SessionSummary};
pub use store::SessionStore;

/// Selects which backend [`create_session_store`] builds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionBackendConfig {
    /// One directory per session under `root`.
    File { root: PathBuf },
    /// Process-local storage, lost on exit.
    InMemory,
}

/// Builds the store handle shared by every request handler.
pub fn create_session_store(config: SessionBackendConfig) -> SessionResult<Arc<dyn SessionStore>> {
    match config {
        SessionBackendConfig::File { root } => {
            tracing::debug!(root = %root.display(), "using file session store");
            Ok(Arc::new(FileSessionStore::new(root)))
        }
        SessionBackendConfig::InMemory => Ok(Arc::new(InMemorySessionStore::new())),
    }
}
