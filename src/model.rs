use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// Kind of content carried by a page. The store persists it verbatim and never interprets it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Code,
    ChatThread,
}

impl PageKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PageKind::Code => "code",
            PageKind::ChatThread => "chat_thread",
        }
    }
}

/// One ordered unit of content within a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: String,
    pub title: String,
    pub kind: PageKind,
    /// Opaque document owned by the frontend.
    #[serde(default)]
    pub content: Value,
}

impl Page {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        kind: PageKind,
        content: Value,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind,
            content,
        }
    }
}

/// A named collection of pages. `last_modified` is derived from storage metadata on read and
/// ignored on write.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<OffsetDateTime>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_modified: None,
            pages: Vec::new(),
        }
    }

    pub fn with_pages(mut self, pages: Vec<Page>) -> Self {
        self.pages = pages;
        self
    }
}

/// Listing entry for a session, without its pages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_modified: OffsetDateTime,
}
