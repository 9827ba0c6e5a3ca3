//! # BookStack API client
//!
//! Authenticated access to the BookStack REST API.
//!
//! - **`ContentApi`**: read capability used by the polling coordinator
//!   (collections, details, system info). Test doubles implement it directly.
//! - **`ContentWriter`**: the three write actions (create book, create page,
//!   append to page).
//! - **`BookStackClient`**: the `reqwest` implementation of both, with
//!   pagination, token credentials and retry of transient failures.

#[macro_use]
extern crate tracing;

mod actions;
mod api;
mod client;
mod credentials;
mod endpoint;
mod error;
pub mod models;
mod query;

pub use actions::{
    NewBook,
    NewPage,
    PageAppend,
    PageContent,
    Tag,
};
pub use api::{
    ApiFuture,
    ContentApi,
    ContentWriter,
};
pub use client::{
    BookStackClient,
    ClientSettings,
};
pub use credentials::ApiCredentials;
pub use endpoint::Endpoint;
pub use error::{
    ApiError,
    ApiResult,
};
pub use query::{
    ListQuery,
    Listing,
};
