use bookstack_client::models::ContentCounts;
use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfStat {
    pub id: u64,
    pub name: String,
    /// Books listed on the shelf, minus those that answered 404 (deleted
    /// during the cycle). Books that failed otherwise are still counted.
    pub book_count: u64,
    pub chapter_count: u64,
    pub page_count: u64,
    /// At least one lookup for this shelf failed, the counts are a lower bound.
    pub partial: bool,
}

impl ShelfStat {
    pub fn empty(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            book_count: 0,
            chapter_count: 0,
            page_count: 0,
            partial: false,
        }
    }

    /// The shelf's own detail could not be read.
    pub fn failed(id: u64, name: impl Into<String>) -> Self {
        Self {
            partial: true,
            ..Self::empty(id, name)
        }
    }

    pub(crate) fn add_book(&mut self, counts: ContentCounts) {
        self.book_count += 1;
        self.chapter_count += counts.chapters;
        self.page_count += counts.pages;
    }

    /// A book that is on the shelf but whose contents are unknown.
    pub(crate) fn add_unreadable_book(&mut self) {
        self.book_count += 1;
        self.partial = true;
    }
}
