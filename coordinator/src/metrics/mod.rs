pub mod last_updated;
pub mod shelf_stat;

use bookstack_client::{
    models::SystemInfo,
    Endpoint,
};
use chrono::{
    DateTime,
    Utc,
};
pub use last_updated::LastUpdatedPage;
use serde::{
    Deserialize,
    Serialize,
};
pub use shelf_stat::ShelfStat;

/// Instance-wide totals, one per counted endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub shelves: u64,
    pub books: u64,
    pub chapters: u64,
    pub pages: u64,
    pub users: u64,
    pub images: u64,
    pub attachments: u64,
}

impl Counts {
    pub fn get(&self, endpoint: Endpoint) -> u64 {
        match endpoint {
            Endpoint::Shelves => self.shelves,
            Endpoint::Books => self.books,
            Endpoint::Chapters => self.chapters,
            Endpoint::Pages => self.pages,
            Endpoint::Users => self.users,
            Endpoint::Images => self.images,
            Endpoint::Attachments => self.attachments,
            Endpoint::System => 0,
        }
    }

    pub fn set(&mut self, endpoint: Endpoint, value: u64) {
        let slot = match endpoint {
            Endpoint::Shelves => &mut self.shelves,
            Endpoint::Books => &mut self.books,
            Endpoint::Chapters => &mut self.chapters,
            Endpoint::Pages => &mut self.pages,
            Endpoint::Users => &mut self.users,
            Endpoint::Images => &mut self.images,
            Endpoint::Attachments => &mut self.attachments,
            Endpoint::System => return,
        };
        *slot = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Endpoint, u64)> + '_ {
        Endpoint::counted().map(|endpoint| (endpoint, self.get(endpoint)))
    }
}

/// Everything one polling cycle learned about the instance.
///
/// Built privately by the coordinator and only ever shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub counts: Counts,
    /// In shelf listing order. Empty when per-shelf statistics are disabled.
    pub shelves: Vec<ShelfStat>,
    pub last_updated_page: Option<LastUpdatedPage>,
    pub system: SystemInfo,
    pub fetched_at: DateTime<Utc>,
    /// Some part of the cycle failed and its contribution is missing.
    pub degraded: bool,
}

impl Snapshot {
    pub fn shelf(&self, id: u64) -> Option<&ShelfStat> {
        self.shelves.iter().find(|shelf| shelf.id == id)
    }
}
