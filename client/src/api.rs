use crate::{
    models::SystemInfo,
    ApiError,
    Endpoint,
    ListQuery,
    Listing,
    NewBook,
    NewPage,
    PageAppend,
};
use std::{
    future::Future,
    pin::Pin,
};
use url::Url;

pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// Read access to a BookStack instance.
pub trait ContentApi: Send + Sync {
    /// All records of `endpoint` matching `query`, following pagination.
    fn fetch_collection(&self, endpoint: Endpoint, query: ListQuery) -> ApiFuture<'_, Listing>;

    /// A single record of `endpoint` by id.
    fn fetch_detail(&self, endpoint: Endpoint, id: u64) -> ApiFuture<'_, serde_json::Value>;

    fn fetch_system(&self) -> ApiFuture<'_, SystemInfo>;

    /// Root of the web UI, used to build links to content.
    fn base_url(&self) -> &Url;
}

/// The write actions. None of them are retried, callers must avoid duplicate submission.
pub trait ContentWriter: Send + Sync {
    fn create_book(&self, book: NewBook) -> ApiFuture<'_, serde_json::Value>;

    fn create_page(&self, page: NewPage) -> ApiFuture<'_, serde_json::Value>;

    fn append_to_page(&self, append: PageAppend) -> ApiFuture<'_, serde_json::Value>;
}
