//! # Collectors
//!
//! The units of work of one polling cycle. Each reads through the cycle's
//! [`CycleContext`], so every call shares one deadline and one concurrency budget.
//!
//! - **`base`**: system info and the seven instance totals. All mandatory.
//! - **`shelf`**: shelf listing and the shelf → book fan-out.
//! - **`page`**: the most recently updated page.

pub(crate) mod base;
pub(crate) mod page;
pub(crate) mod shelf;

use bookstack_client::{
    ApiError,
    ApiResult,
    ContentApi,
};
use std::{
    future::Future,
    sync::Arc,
};
use tokio::{
    sync::Semaphore,
    time::Instant,
};

pub(crate) struct CycleContext {
    pub(crate) api: Arc<dyn ContentApi>,
    deadline: Instant,
    permits: Arc<Semaphore>,
}

impl CycleContext {
    pub(crate) fn new(api: Arc<dyn ContentApi>, deadline: Instant, max_concurrent_requests: usize) -> Self {
        Self {
            api,
            deadline,
            permits: Arc::new(Semaphore::new(max_concurrent_requests.max(1))),
        }
    }

    /// Resolves to `BudgetExceeded` once the cycle deadline passes.
    pub(crate) async fn bounded<T>(&self, call: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        match tokio::time::timeout_at(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::BudgetExceeded),
        }
    }

    /// Like [`Self::bounded`], but also waits for a fan-out permit before issuing the call.
    pub(crate) async fn gated<T>(&self, call: impl Future<Output = ApiResult<T>>) -> ApiResult<T> {
        self.bounded(async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| ApiError::Transient("fan-out closed".into()))?;
            call.await
        })
        .await
    }
}
