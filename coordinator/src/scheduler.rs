use crate::{
    cache::CacheReader,
    coordinator::{
        Coordinator,
        CycleOutcome,
    },
    settings::PollSettings,
};
use bookstack_client::{
    BookStackClient,
    ContentApi,
};
use bookstack_monitor_config::{
    Config,
    ConfigArgs,
};
use eyre::{
    Context as _,
    Result,
};
use std::sync::Arc;
use tokio::{
    sync::{
        mpsc,
        Notify,
    },
    time::{
        self,
        Instant,
        Interval,
        MissedTickBehavior,
    },
};
use tokio_util::sync::CancellationToken;

/// Where the scheduler gets its settings from before every cycle.
pub trait SettingsSource: Send + Sync {
    fn load(&self) -> Result<PollSettings>;

    fn connect(&self, settings: &PollSettings) -> Result<Arc<dyn ContentApi>> {
        let client = BookStackClient::new(settings.client.clone()).wrap_err("Failed to create BookStack client")?;
        Ok(Arc::new(client))
    }
}

/// Reads the layered configuration (file, environment, arguments) on every load.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    args: ConfigArgs,
}

impl ConfigSource {
    pub fn new(args: ConfigArgs) -> Self {
        Self { args }
    }

    pub fn config(&self) -> Result<Config> {
        Config::new(self.args.clone()).wrap_err("Failed to load configuration")
    }
}

impl SettingsSource for ConfigSource {
    fn load(&self) -> Result<PollSettings> {
        PollSettings::from_config(&self.config()?)
    }
}

/// Asks a running [`Scheduler`] for an extra cycle. Requests made while a cycle
/// is running collapse into one follow-up cycle.
#[derive(Debug, Clone)]
pub struct RefreshHandle {
    notify: Arc<Notify>,
}

impl RefreshHandle {
    pub fn request(&self) {
        self.notify.notify_one();
    }
}

/// Drives a [`Coordinator`] on the scan interval.
pub struct Scheduler<S> {
    source: S,
    coordinator: Coordinator,
    refresh: Arc<Notify>,
    outcomes: Option<mpsc::UnboundedSender<CycleOutcome>>,
}

impl<S: SettingsSource> Scheduler<S> {
    pub fn new(source: S) -> Result<Self> {
        let settings = source.load()?;
        let api = source.connect(&settings)?;
        Ok(Self::with_coordinator(source, Coordinator::new(api, settings)))
    }

    pub fn with_coordinator(source: S, coordinator: Coordinator) -> Self {
        Self {
            source,
            coordinator,
            refresh: Arc::new(Notify::new()),
            outcomes: None,
        }
    }

    pub fn subscribe(&self) -> CacheReader {
        self.coordinator.subscribe()
    }

    pub fn refresh_handle(&self) -> RefreshHandle {
        RefreshHandle {
            notify: self.refresh.clone(),
        }
    }

    /// Reports the outcome of every finished cycle.
    pub fn outcomes(&mut self) -> mpsc::UnboundedReceiver<CycleOutcome> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.outcomes = Some(tx);
        rx
    }

    /// Runs cycles until `cancel` fires. The first cycle starts immediately.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        let mut period = self.coordinator.settings().scan_interval;
        let mut ticker = new_ticker(Instant::now(), period);
        info!(interval = ?period, "Polling BookStack");

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => trace!("Scheduled cycle"),
                _ = self.refresh.notified() => debug!("Refresh requested"),
            }

            self.reload();
            let next_period = self.coordinator.settings().scan_interval;
            if next_period != period {
                info!(old = ?period, new = ?next_period, "Scan interval changed");
                period = next_period;
                ticker = new_ticker(Instant::now() + period, period);
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.coordinator.run_cycle() => outcome,
            };

            debug!(?outcome, "Cycle finished");
            if let Some(outcomes) = &self.outcomes {
                let _ = outcomes.send(outcome);
            }
        }

        debug!("Scheduler stopped");
        Ok(())
    }

    /// Picks up changed settings. Keeps the current ones if loading fails.
    fn reload(&mut self) {
        let settings = match self.source.load() {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Failed to reload settings, keeping the current ones: {err:#}");
                return;
            }
        };
        if &settings == self.coordinator.settings() {
            return;
        }

        match self.source.connect(&settings) {
            Ok(api) => {
                info!("Settings changed, reconnecting");
                self.coordinator.reconfigure(api, settings);
            }
            Err(err) => warn!("Failed to apply new settings, keeping the current ones: {err:#}"),
        }
    }
}

fn new_ticker(start: Instant, period: std::time::Duration) -> Interval {
    let mut ticker = time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker
}
