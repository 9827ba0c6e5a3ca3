use crate::cache::CachedResult;
use bookstack_monitor_config::Config;
use serde_json::{
    json,
    Value,
};

/// Support dump of the configuration and the latest data. Token id and secret are redacted.
pub fn diagnostics(config: &Config, cached: &CachedResult) -> Value {
    let snapshot = cached.snapshot.as_deref();
    json!({
        "config": config.redacted(),
        "connectivity": cached.connectivity,
        "is_stale": cached.is_stale,
        "updated_at": cached.updated_at,
        "last_failure": cached.last_failure,
        "system": snapshot.map(|snapshot| &snapshot.system),
        "counts": snapshot.map(|snapshot| snapshot.counts),
        "shelves": snapshot.map(|snapshot| &snapshot.shelves),
        "last_updated_page": snapshot.and_then(|snapshot| snapshot.last_updated_page.as_ref()),
        "fetched_at": snapshot.map(|snapshot| snapshot.fetched_at),
        "degraded": snapshot.map(|snapshot| snapshot.degraded),
    })
}
