use crate::cache::CacheReader;
use bookstack_client::{
    ApiError,
    ContentWriter,
    NewBook,
    NewPage,
    PageAppend,
};
use serde_json::Value;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum ActionError {
    #[error("BookStack is currently unavailable, try again after the next successful update")]
    Unavailable,
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for ActionError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation(message) => ActionError::Invalid(message),
            other => ActionError::Api(other),
        }
    }
}

/// The write operations, refused while the instance is known to be down.
#[derive(Clone)]
pub struct Actions {
    writer: Arc<dyn ContentWriter>,
    cache: CacheReader,
}

impl Actions {
    pub fn new(writer: Arc<dyn ContentWriter>, cache: CacheReader) -> Self {
        Self { writer, cache }
    }

    fn ensure_available(&self) -> Result<(), ActionError> {
        let connectivity = self.cache.read().connectivity;
        if !connectivity.is_available() {
            warn!(%connectivity, "Refusing action while BookStack is unavailable");
            return Err(ActionError::Unavailable);
        }
        Ok(())
    }

    pub async fn create_book(&self, book: NewBook) -> Result<Value, ActionError> {
        book.validate()?;
        self.ensure_available()?;
        Ok(self.writer.create_book(book).await?)
    }

    pub async fn create_page(&self, page: NewPage) -> Result<Value, ActionError> {
        page.validate()?;
        self.ensure_available()?;
        Ok(self.writer.create_page(page).await?)
    }

    pub async fn append_to_page(&self, append: PageAppend) -> Result<Value, ActionError> {
        append.validate()?;
        self.ensure_available()?;
        Ok(self.writer.append_to_page(append).await?)
    }
}
