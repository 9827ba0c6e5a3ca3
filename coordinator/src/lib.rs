//! # BookStack polling coordinator
//!
//! Turns periodic reads of a BookStack instance into one consistent
//! [`Snapshot`] at a time.
//!
//! - **`Coordinator`**: runs one cycle, base statistics first, then the change
//!   detector and per-shelf fan-out side by side, and publishes the merged result.
//! - **`StateCache`**: the latest result behind a `watch` channel; readers get a
//!   `CacheReader`.
//! - **`Scheduler`**: drives cycles on the scan interval, with manual refresh and
//!   settings reload between cycles.
//! - **`Actions`**: write operations, refused while the instance is down.
//!
//! A failure in base statistics marks the cached snapshot stale; anything
//! smaller only marks the snapshot degraded.

#[macro_use]
extern crate tracing;

mod actions;
mod cache;
mod collectors;
mod connectivity;
mod coordinator;
mod diagnostics;
pub mod metrics;
mod scheduler;
mod settings;
#[cfg(test)]
mod testing;

pub use actions::{
    ActionError,
    Actions,
};
pub use cache::{
    CacheReader,
    CachedResult,
    StateCache,
};
pub use collectors::page::{
    select_newest,
    CANDIDATE_WINDOW,
};
pub use connectivity::{
    ConnectivityState,
    CycleFailure,
};
pub use coordinator::{
    Coordinator,
    CycleOutcome,
};
pub use diagnostics::diagnostics;
pub use metrics::{
    Counts,
    LastUpdatedPage,
    ShelfStat,
    Snapshot,
};
pub use scheduler::{
    ConfigSource,
    RefreshHandle,
    Scheduler,
    SettingsSource,
};
pub use settings::PollSettings;
