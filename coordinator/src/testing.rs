//! In-memory BookStack used by the unit tests.

use bookstack_client::{
    models::SystemInfo,
    ApiError,
    ApiFuture,
    ContentApi,
    ContentWriter,
    Endpoint,
    ListQuery,
    Listing,
    NewBook,
    NewPage,
    PageAppend,
};
use serde_json::{
    json,
    Value,
};
use std::{
    collections::HashMap,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Mutex,
    },
    time::Duration,
};
use url::Url;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Fail(ApiError),
    /// Never answers.
    Hang,
}

/// Keys are `system`, `count/{endpoint}`, `list/{endpoint}` and `{endpoint}/{id}`.
/// Unknown keys answer `NotFound`.
pub(crate) struct FakeBookStack {
    base_url: Url,
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<String>>,
    detail_delay: Mutex<Option<Duration>>,
    details_in_flight: AtomicUsize,
    peak_details_in_flight: AtomicUsize,
}

impl FakeBookStack {
    pub(crate) fn new() -> Self {
        let fake = Self {
            base_url: Url::parse("https://docs.example.com").unwrap(),
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            detail_delay: Mutex::new(None),
            details_in_flight: AtomicUsize::new(0),
            peak_details_in_flight: AtomicUsize::new(0),
        };
        fake.reply("system", json!({ "version": "v24.05.1", "instance_id": "i-1", "app_name": "Docs" }));
        for endpoint in Endpoint::counted() {
            fake.reply(&format!("count/{endpoint}"), json!({ "data": [], "total": 0 }));
        }
        fake.reply("list/pages", json!([]));
        fake.reply("list/shelves", json!([]));
        fake
    }

    pub(crate) fn reply(&self, key: &str, value: Value) -> &Self {
        self.set(key, Reply::Json(value))
    }

    pub(crate) fn fail(&self, key: &str, err: ApiError) -> &Self {
        self.set(key, Reply::Fail(err))
    }

    pub(crate) fn hang(&self, key: &str) -> &Self {
        self.set(key, Reply::Hang)
    }

    pub(crate) fn count(&self, endpoint: Endpoint, total: u64) -> &Self {
        self.reply(&format!("count/{endpoint}"), json!({ "data": [], "total": total }))
    }

    /// Every detail call takes `delay` before answering.
    pub(crate) fn delay_details(&self, delay: Duration) -> &Self {
        *self.detail_delay.lock().unwrap() = Some(delay);
        self
    }

    /// Most detail calls that were running at the same time.
    pub(crate) fn peak_details_in_flight(&self) -> usize {
        self.peak_details_in_flight.load(Ordering::SeqCst)
    }

    fn set(&self, key: &str, reply: Reply) -> &Self {
        self.replies.lock().unwrap().insert(key.to_string(), reply);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    fn answer(&self, key: String) -> ApiFuture<'_, Value> {
        let reply = self.replies.lock().unwrap().get(&key).cloned();
        self.calls.lock().unwrap().push(key);
        Box::pin(async move {
            match reply {
                Some(Reply::Json(value)) => Ok(value),
                Some(Reply::Fail(err)) => Err(err),
                Some(Reply::Hang) => futures::future::pending().await,
                None => Err(ApiError::NotFound),
            }
        })
    }
}

impl ContentApi for FakeBookStack {
    fn fetch_collection(&self, endpoint: Endpoint, query: ListQuery) -> ApiFuture<'_, Listing> {
        let counting = query == ListQuery::count_only();
        let key = if counting {
            format!("count/{endpoint}")
        } else {
            format!("list/{endpoint}")
        };
        let reply = self.answer(key);
        Box::pin(async move {
            let value = reply.await?;
            if counting {
                return Ok(Listing::new(Vec::new(), value["total"].as_u64().unwrap_or_default()));
            }
            let mut records = value.as_array().cloned().unwrap_or_default();
            let total = records.len() as u64;
            if let Some(limit) = query.limit {
                records.truncate(limit);
            }
            Ok::<_, ApiError>(Listing::new(records, total))
        })
    }

    fn fetch_detail(&self, endpoint: Endpoint, id: u64) -> ApiFuture<'_, Value> {
        let reply = self.answer(endpoint.detail_path(id));
        let delay = *self.detail_delay.lock().unwrap();
        Box::pin(async move {
            let running = self.details_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_details_in_flight.fetch_max(running, Ordering::SeqCst);
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            let result = reply.await;
            self.details_in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }

    fn fetch_system(&self) -> ApiFuture<'_, SystemInfo> {
        let reply = self.answer("system".to_string());
        Box::pin(async move { Ok::<_, ApiError>(serde_json::from_value(reply.await?)?) })
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }
}

impl ContentWriter for FakeBookStack {
    fn create_book(&self, book: NewBook) -> ApiFuture<'_, Value> {
        self.calls.lock().unwrap().push(format!("create_book/{}", book.shelf_id));
        Box::pin(async move { Ok(json!({ "id": 100, "name": book.name })) })
    }

    fn create_page(&self, page: NewPage) -> ApiFuture<'_, Value> {
        self.calls.lock().unwrap().push(format!("create_page/{}", page.book_id));
        Box::pin(async move { Ok(json!({ "id": 200, "name": page.name })) })
    }

    fn append_to_page(&self, append: PageAppend) -> ApiFuture<'_, Value> {
        self.calls.lock().unwrap().push(format!("append/{}", append.page_id));
        Box::pin(async move { Ok(json!({ "id": append.page_id })) })
    }
}

pub(crate) fn shelf_listing(shelves: &[(u64, &str)]) -> Value {
    shelves
        .iter()
        .map(|(id, name)| json!({ "id": id, "name": name }))
        .collect()
}

pub(crate) fn shelf_detail(id: u64, name: &str, books: &[u64]) -> Value {
    let books = books
        .iter()
        .map(|book| json!({ "id": book, "name": format!("book {book}") }))
        .collect::<Vec<_>>();
    json!({ "id": id, "name": name, "books": books })
}

/// A book with `chapters` chapters of `pages_per_chapter` pages each, plus `loose_pages` top-level pages.
pub(crate) fn book_detail(id: u64, chapters: usize, pages_per_chapter: usize, loose_pages: usize) -> Value {
    let mut contents = Vec::new();
    for chapter in 0..chapters {
        let pages = (0..pages_per_chapter)
            .map(|page| json!({ "id": page, "name": format!("page {page}") }))
            .collect::<Vec<_>>();
        contents.push(json!({ "id": chapter, "type": "chapter", "pages": pages }));
    }
    for page in 0..loose_pages {
        contents.push(json!({ "id": page, "type": "page" }));
    }
    json!({ "id": id, "contents": contents })
}

pub(crate) fn page_summary(id: u64, updated_at: &str) -> Value {
    json!({ "id": id, "name": format!("page {id}"), "updated_at": updated_at })
}

pub(crate) fn page_detail(id: u64, updated_at: &str, user: Option<(u64, &str)>) -> Value {
    let updated_by = user.map(|(id, name)| json!({ "id": id, "name": name }));
    json!({
        "id": id,
        "name": format!("page {id}"),
        "slug": format!("page-{id}"),
        "book_id": 1,
        "book_slug": "handbook",
        "updated_at": updated_at,
        "updated_by": updated_by,
    })
}
