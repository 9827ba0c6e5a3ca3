use crate::{
    cache::{
        CacheReader,
        CachedResult,
        StateCache,
    },
    collectors::{
        base,
        page,
        shelf,
        CycleContext,
    },
    connectivity::{
        Connectivity,
        ConnectivityState,
        CycleFailure,
    },
    metrics::{
        ShelfStat,
        Snapshot,
    },
    settings::PollSettings,
};
use bookstack_client::{
    models::ShelfSummary,
    ContentApi,
};
use chrono::Utc;
use std::sync::Arc;
use tokio::time::Instant;

/// Result of [`Coordinator::run_cycle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new snapshot was published.
    Published { degraded: bool },
    /// Base statistics failed and the cached snapshot was marked stale.
    Failed(CycleFailure),
}

impl CycleOutcome {
    pub fn connectivity(&self) -> ConnectivityState {
        match self {
            CycleOutcome::Published { degraded: false } => ConnectivityState::Up,
            CycleOutcome::Published { degraded: true } => ConnectivityState::Degraded,
            CycleOutcome::Failed(_) => ConnectivityState::Down,
        }
    }
}

/// Runs polling cycles against one BookStack instance and owns the state they produce.
///
/// `run_cycle` takes `&mut self`, so two cycles of the same coordinator can never overlap.
pub struct Coordinator {
    api: Arc<dyn ContentApi>,
    settings: PollSettings,
    cache: StateCache,
    connectivity: Connectivity,
}

impl Coordinator {
    pub fn new(api: Arc<dyn ContentApi>, settings: PollSettings) -> Self {
        Self {
            api,
            settings,
            cache: StateCache::new(),
            connectivity: Connectivity::default(),
        }
    }

    pub fn settings(&self) -> &PollSettings {
        &self.settings
    }

    /// Swaps the client and settings used by the following cycles. Cached state is kept.
    pub fn reconfigure(&mut self, api: Arc<dyn ContentApi>, settings: PollSettings) {
        self.api = api;
        self.settings = settings;
    }

    pub fn subscribe(&self) -> CacheReader {
        self.cache.subscribe()
    }

    pub fn cached(&self) -> CachedResult {
        self.cache.read()
    }

    pub fn connectivity(&self) -> ConnectivityState {
        self.connectivity.state()
    }

    #[instrument(level = "debug", skip(self), fields(per_shelf = self.settings.per_shelf_enabled))]
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let fetched_at = Utc::now();
        let deadline = Instant::now() + self.settings.cycle_budget();
        let ctx = CycleContext::new(self.api.clone(), deadline, self.settings.max_concurrent_requests);

        let base = match base::collect(&ctx).await {
            Ok(base) => base,
            Err(err) => {
                let failure = CycleFailure::from(&err);
                warn!(%err, "Failed to read base statistics, keeping the previous snapshot");
                self.cache.mark_stale(failure.clone());
                self.connectivity.transition(ConnectivityState::Down, Some(&failure));
                return CycleOutcome::Failed(failure);
            }
        };

        let (last_updated_page, (shelves, shelves_degraded)) =
            tokio::join!(page::find_last_updated_page(&ctx), self.collect_shelves(&ctx));

        let mut degraded = shelves_degraded;
        let last_updated_page = last_updated_page.unwrap_or_else(|err| {
            warn!(%err, "Failed to find the last updated page");
            degraded = true;
            None
        });

        let snapshot = Snapshot {
            counts: base.counts,
            shelves,
            last_updated_page,
            system: base.system,
            fetched_at,
            degraded,
        };

        let outcome = CycleOutcome::Published { degraded };
        let connectivity = outcome.connectivity();
        debug!(
            shelves = snapshot.shelves.len(),
            pages = snapshot.counts.pages,
            degraded,
            "Publishing snapshot"
        );
        self.cache.publish(snapshot, connectivity);
        self.connectivity.transition(connectivity, None);
        outcome
    }

    /// Per-shelf stats and whether any of them is incomplete.
    async fn collect_shelves(&self, ctx: &CycleContext) -> (Vec<ShelfStat>, bool) {
        if !self.settings.per_shelf_enabled {
            return (Vec::new(), false);
        }

        let (known, listing_failed) = match shelf::list_shelves(ctx).await {
            Ok(shelves) => (shelves, false),
            Err(err) => {
                let previous = self.previous_shelves();
                warn!(%err, fallback = previous.len(), "Failed to list shelves, using the previously known ones");
                (previous, true)
            }
        };

        let stats = shelf::collect_all(ctx, &known).await;
        let partial = listing_failed || stats.iter().any(|stat| stat.partial);
        (stats, partial)
    }

    fn previous_shelves(&self) -> Vec<ShelfSummary> {
        self.cache
            .read()
            .snapshot
            .map(|snapshot| {
                snapshot
                    .shelves
                    .iter()
                    .map(|stat| ShelfSummary {
                        id: stat.id,
                        name: stat.name.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
