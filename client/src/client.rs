use crate::{
    api::{
        ApiFuture,
        ContentApi,
        ContentWriter,
    },
    models::SystemInfo,
    ApiCredentials,
    ApiError,
    Endpoint,
    ListQuery,
    Listing,
    NewBook,
    NewPage,
    PageAppend,
};
use maybe_backoff::MaybeBackoff;
use reqwest::{
    header::{
        self,
        HeaderMap,
    },
    Method,
    StatusCode,
};
use serde::Deserialize;
use serde_json::{
    json,
    Value,
};
use std::{
    future::Future,
    time::Duration,
};
use url::Url;

/// Wait used for a 429 response without a usable `Retry-After` header.
const DEFAULT_RATE_LIMIT_DELAY: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientSettings {
    /// Root of the BookStack instance, e.g. `https://docs.example.com`.
    pub base_url: Url,
    pub credentials: ApiCredentials,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Retries of a transient or rate-limited call, on top of the first attempt.
    pub max_retries: u32,
    /// Ceiling on the number of pages fetched for one collection.
    pub max_pages: usize,
}

impl ClientSettings {
    pub fn new(base_url: Url, credentials: ApiCredentials) -> Self {
        Self {
            base_url,
            credentials,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            max_pages: 50,
        }
    }
}

#[derive(Deserialize)]
struct Page {
    #[serde(default)]
    data: Vec<Value>,
    #[serde(default)]
    total: u64,
}

/// `reqwest` implementation of [`ContentApi`] and [`ContentWriter`].
#[derive(Debug, Clone)]
pub struct BookStackClient {
    http: reqwest::Client,
    settings: ClientSettings,
}

impl BookStackClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        if !matches!(settings.base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidConfig(format!(
                "unsupported URL scheme {:?}",
                settings.base_url.scheme()
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, settings.credentials.header_value()?);
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn api_url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.settings.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/{path}"))
            .map_err(|err| ApiError::InvalidConfig(format!("cannot build URL for {path}: {err}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<Value, ApiError> {
        let url = self.api_url(path)?;
        trace!(%method, %url, "BookStack request");

        let mut request = self.http.request(method, url).query(query);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(response.headers());
            let message = response.text().await.unwrap_or_default();
            return Err(classify(status, retry_after, &message));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn with_retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut backoff = MaybeBackoff::default();
        let mut attempt = 0;
        loop {
            backoff.sleep().await;
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.settings.max_retries => {
                    attempt += 1;
                    warn!(what, attempt, %err, "BookStack call failed, retrying...");
                    match err {
                        ApiError::RateLimited { retry_after } => {
                            tokio::time::sleep(retry_after.unwrap_or(DEFAULT_RATE_LIMIT_DELAY)).await;
                        }
                        _ => backoff.arm(),
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        self.with_retry(path, || self.send(Method::GET, path, query, None)).await
    }

    async fn list(&self, endpoint: Endpoint, query: ListQuery) -> Result<Listing, ApiError> {
        let path = endpoint.path();
        let mut records = Vec::new();
        let mut total = 0;
        let mut pages = 0;

        loop {
            let count = query.next_count(records.len());
            if count == 0 {
                break;
            }
            // The first page is always fetched, it carries the total.
            if pages > 0 && pages >= self.settings.max_pages {
                warn!(%endpoint, pages, collected = records.len(), total, "Pagination ceiling reached");
                break;
            }

            let mut params = vec![("count", count.to_string()), ("offset", records.len().to_string())];
            if let Some(sort) = &query.sort {
                params.push(("sort", sort.clone()));
            }

            let page: Page = serde_json::from_value(self.get(&path, &params).await?)?;
            pages += 1;
            total = page.total;
            let received = page.data.len();
            records.extend(page.data);

            if received < count || records.len() as u64 >= total {
                break;
            }
        }

        debug!(%endpoint, collected = records.len(), total, pages, "Fetched collection");
        Ok(Listing::new(records, total))
    }

    async fn detail(&self, endpoint: Endpoint, id: u64) -> Result<Value, ApiError> {
        self.get(&endpoint.detail_path(id), &[]).await
    }

    async fn system(&self) -> Result<SystemInfo, ApiError> {
        let value = self.get(&Endpoint::System.path(), &[]).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn add_book(&self, book: NewBook) -> Result<Value, ApiError> {
        book.validate()?;

        let shelf = match self.detail(Endpoint::Shelves, book.shelf_id).await {
            Err(ApiError::NotFound) => {
                return Err(ApiError::validation(format!("shelf {} does not exist", book.shelf_id)));
            }
            other => other?,
        };

        let created = self.send(Method::POST, &Endpoint::Books.path(), &[], Some(&book.body())).await?;
        let book_id = created["id"]
            .as_u64()
            .ok_or_else(|| ApiError::decode("created book has no id"))?;

        let mut book_ids = shelf["books"]
            .as_array()
            .map(|books| books.iter().filter_map(|entry| entry["id"].as_u64()).collect::<Vec<_>>())
            .unwrap_or_default();
        book_ids.push(book_id);

        self.send(
            Method::PUT,
            &Endpoint::Shelves.detail_path(book.shelf_id),
            &[],
            Some(&json!({ "books": book_ids })),
        )
        .await
        .map_err(|err| {
            warn!(book_id, shelf_id = book.shelf_id, %err, "Created book but failed to attach it to the shelf");
            ApiError::BookNotShelved {
                book_id,
                shelf_id: book.shelf_id,
                source: Box::new(err),
            }
        })?;

        info!(book_id, shelf_id = book.shelf_id, "Created book");
        Ok(created)
    }

    async fn add_page(&self, page: NewPage) -> Result<Value, ApiError> {
        page.validate()?;
        let created = self.send(Method::POST, &Endpoint::Pages.path(), &[], Some(&page.body())).await?;
        info!(page_id = ?created["id"].as_u64(), book_id = page.book_id, "Created page");
        Ok(created)
    }

    async fn append(&self, append: PageAppend) -> Result<Value, ApiError> {
        append.validate()?;
        let existing = self.detail(Endpoint::Pages, append.page_id).await?;
        let updated = self
            .send(
                Method::PUT,
                &Endpoint::Pages.detail_path(append.page_id),
                &[],
                Some(&append.body(&existing)?),
            )
            .await?;
        info!(page_id = append.page_id, "Appended to page");
        Ok(updated)
    }
}

impl ContentApi for BookStackClient {
    fn fetch_collection(&self, endpoint: Endpoint, query: ListQuery) -> ApiFuture<'_, Listing> {
        Box::pin(self.list(endpoint, query))
    }

    fn fetch_detail(&self, endpoint: Endpoint, id: u64) -> ApiFuture<'_, Value> {
        Box::pin(self.detail(endpoint, id))
    }

    fn fetch_system(&self) -> ApiFuture<'_, SystemInfo> {
        Box::pin(self.system())
    }

    fn base_url(&self) -> &Url {
        &self.settings.base_url
    }
}

impl ContentWriter for BookStackClient {
    fn create_book(&self, book: NewBook) -> ApiFuture<'_, Value> {
        Box::pin(self.add_book(book))
    }

    fn create_page(&self, page: NewPage) -> ApiFuture<'_, Value> {
        Box::pin(self.add_page(page))
    }

    fn append_to_page(&self, append: PageAppend) -> ApiFuture<'_, Value> {
        Box::pin(self.append(append))
    }
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn classify(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth {
            status: status.as_u16(),
        },
        StatusCode::NOT_FOUND => ApiError::NotFound,
        StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited { retry_after },
        status if status.is_server_error() => ApiError::Transient(format!("HTTP {status}")),
        status => ApiError::Http {
            status: status.as_u16(),
            message: error_message(body),
        },
    }
}

/// BookStack wraps errors as `{"error": {"message": ...}}`.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| value["error"]["message"].as_str().map(str::to_owned))
        .unwrap_or_else(|| body.chars().take(200).collect())
}
