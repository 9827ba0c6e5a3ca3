//! Typed views of the BookStack responses the monitor reads. Unknown fields are ignored.

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// `GET /api/system`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub app_name: Option<String>,
}

/// Entry of `GET /api/shelves`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfSummary {
    pub id: u64,
    pub name: String,
}

/// `GET /api/shelves/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShelfDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub books: Vec<EntityRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// `GET /api/books/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookDetail {
    pub id: u64,
    #[serde(default)]
    pub contents: Vec<BookContent>,
}

/// Top-level item of a book: a chapter (with its pages) or a page.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BookContent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub pages: Vec<EntityRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContentCounts {
    pub chapters: u64,
    pub pages: u64,
}

impl BookDetail {
    /// Chapters, top-level pages, and pages nested in chapters.
    pub fn content_counts(&self) -> ContentCounts {
        self.contents
            .iter()
            .fold(ContentCounts::default(), |mut counts, item| {
                match item.kind.as_str() {
                    "chapter" => {
                        counts.chapters += 1;
                        counts.pages += item.pages.len() as u64;
                    }
                    "page" => counts.pages += 1,
                    other => trace!(kind = other, "ignoring unknown book content"),
                }
                counts
            })
    }
}

/// Entry of `GET /api/pages`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    pub updated_at: DateTime<Utc>,
}

/// `GET /api/pages/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PageDetail {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    pub book_id: u64,
    #[serde(default)]
    pub book_slug: Option<String>,
    pub updated_at: DateTime<Utc>,
    /// Null when the user account was deleted.
    #[serde(default)]
    pub updated_by: Option<EntityRef>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub markdown: Option<String>,
}
