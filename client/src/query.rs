use crate::ApiError;
use serde::de::DeserializeOwned;

/// BookStack refuses page sizes above this.
pub const MAX_PAGE_SIZE: usize = 100;

/// Options of a collection request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Server-side sort, e.g. `-updated_at`.
    pub sort: Option<String>,
    /// Records requested per page.
    pub page_size: usize,
    /// Stop after this many records even if the server has more.
    pub limit: Option<usize>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            sort: None,
            page_size: MAX_PAGE_SIZE,
            limit: None,
        }
    }
}

impl ListQuery {
    /// Every record, following pagination.
    pub fn all() -> Self {
        Self::default()
    }

    /// A single record; the caller is interested in `Listing::total`.
    pub fn count_only() -> Self {
        Self {
            sort: None,
            page_size: 1,
            limit: Some(1),
        }
    }

    pub fn sorted_by(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn take(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self.page_size = self.page_size.min(limit.max(1));
        self
    }

    pub(crate) fn effective_page_size(&self) -> usize {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// How many records the next page should ask for, given what is already collected.
    pub(crate) fn next_count(&self, collected: usize) -> usize {
        let page_size = self.effective_page_size();
        match self.limit {
            Some(limit) => page_size.min(limit.saturating_sub(collected)),
            None => page_size,
        }
    }
}

/// Records of one collection in server order, plus the total the server reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Listing {
    pub records: Vec<serde_json::Value>,
    pub total: u64,
}

impl Listing {
    pub fn new(records: Vec<serde_json::Value>, total: u64) -> Self {
        Self { records, total }
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>, ApiError> {
        self.records
            .iter()
            .map(|record| serde_json::from_value(record.clone()).map_err(ApiError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn next_count_honours_limit() {
        let query = ListQuery::all().take(150);
        assert_eq!(query.next_count(0), 100);
        assert_eq!(query.next_count(100), 50);
        assert_eq!(query.next_count(150), 0);
        assert_eq!(ListQuery::all().next_count(1000), 100);
    }

    #[test]
    fn take_shrinks_page_size() {
        let query = ListQuery::all().sorted_by("-updated_at").take(10);
        assert_eq!(query.page_size, 10);
        assert_eq!(query.sort.as_deref(), Some("-updated_at"));
        assert_eq!(ListQuery::count_only().next_count(0), 1);
    }
}
