use bookstack_client::models::PageDetail;
use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUpdatedPage {
    pub id: u64,
    pub name: String,
    /// `None` when the editing account no longer exists.
    pub updated_by_id: Option<u64>,
    pub updated_by_name: Option<String>,
    pub url: String,
    pub updated_at: DateTime<Utc>,
}

impl LastUpdatedPage {
    pub fn from_detail(page: PageDetail, base_url: &Url) -> Self {
        let url = page_url(base_url, &page);
        let (updated_by_id, updated_by_name) = match page.updated_by {
            Some(user) => (Some(user.id), Some(user.name)),
            None => (None, None),
        };
        Self {
            id: page.id,
            name: page.name,
            updated_by_id,
            updated_by_name,
            url,
            updated_at: page.updated_at,
        }
    }
}

/// `{base}/books/{book}/page/{page}`, with the book id standing in for a missing slug.
fn page_url(base_url: &Url, page: &PageDetail) -> String {
    let base = base_url.as_str().trim_end_matches('/');
    let book = match page.book_slug.as_deref() {
        Some(slug) if !slug.is_empty() => slug.to_string(),
        _ => page.book_id.to_string(),
    };
    format!("{base}/books/{book}/page/{}", page.slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookstack_client::models::EntityRef;
    use pretty_assertions::assert_eq;

    fn detail(book_slug: Option<&str>, updated_by: Option<EntityRef>) -> PageDetail {
        PageDetail {
            id: 12,
            name: "Release notes".into(),
            slug: "release-notes".into(),
            book_id: 3,
            book_slug: book_slug.map(str::to_owned),
            updated_at: DateTime::parse_from_rfc3339("2024-05-01T08:00:00Z").unwrap().to_utc(),
            updated_by,
            html: None,
            markdown: None,
        }
    }

    #[test]
    fn builds_direct_link() {
        let base = Url::parse("https://docs.example.com/").unwrap();
        let page = LastUpdatedPage::from_detail(
            detail(
                Some("handbook"),
                Some(EntityRef {
                    id: 2,
                    name: "Ada".into(),
                }),
            ),
            &base,
        );
        assert_eq!(page.url, "https://docs.example.com/books/handbook/page/release-notes");
        assert_eq!(page.updated_by_id, Some(2));
        assert_eq!(page.updated_by_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn falls_back_to_book_id_and_missing_user() {
        let base = Url::parse("http://wiki.local:6875").unwrap();
        let page = LastUpdatedPage::from_detail(detail(None, None), &base);
        assert_eq!(page.url, "http://wiki.local:6875/books/3/page/release-notes");
        assert_eq!(page.updated_by_id, None);
        assert_eq!(page.updated_by_name, None);
    }
}
