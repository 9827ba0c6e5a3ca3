use bookstack_client::{
    ApiCredentials,
    ClientSettings,
};
use bookstack_monitor_config::Config;
use eyre::{
    OptionExt as _,
    Result,
};
use std::time::Duration;

/// Everything a polling cycle needs, derived from a validated [`Config`].
#[derive(Debug, Clone, PartialEq)]
pub struct PollSettings {
    pub client: ClientSettings,
    pub scan_interval: Duration,
    pub per_shelf_enabled: bool,
    pub max_concurrent_requests: usize,
}

impl PollSettings {
    pub fn new(client: ClientSettings, scan_interval: Duration) -> Self {
        Self {
            client,
            scan_interval,
            per_shelf_enabled: true,
            max_concurrent_requests: 4,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let url = config.url.clone().ok_or_eyre("no BookStack URL configured")?;
        let client = ClientSettings {
            timeout: config.request_timeout(),
            max_retries: config.max_retries,
            max_pages: config.max_pages,
            ..ClientSettings::new(url, ApiCredentials::new(&config.token_id, &config.token_secret))
        };
        Ok(Self {
            client,
            scan_interval: config.scan_interval(),
            per_shelf_enabled: config.per_shelf_enabled,
            max_concurrent_requests: config.max_concurrent_requests,
        })
    }

    /// Time one cycle may take: the scan interval minus a margin, never below a second.
    pub fn cycle_budget(&self) -> Duration {
        let margin = (self.scan_interval / 10).min(Duration::from_secs(5));
        self.scan_interval.saturating_sub(margin).max(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn budget_leaves_room_before_next_tick() {
        let client = ClientSettings::new(
            "https://docs.example.com".parse().unwrap(),
            ApiCredentials::new("id", "secret"),
        );
        let settings = |secs| PollSettings::new(client.clone(), Duration::from_secs(secs));
        assert_eq!(settings(300).cycle_budget(), Duration::from_secs(295));
        assert_eq!(settings(30).cycle_budget(), Duration::from_secs(27));
        assert_eq!(settings(1).cycle_budget(), Duration::from_secs(1));
    }

    #[test]
    fn from_validated_config() {
        let config = Config {
            url: Some("https://docs.example.com".parse().unwrap()),
            token_id: "id".into(),
            token_secret: "secret".into(),
            scan_interval: 60,
            max_concurrent_requests: 2,
            ..Config::default()
        };
        let settings = PollSettings::from_config(&config).unwrap();
        assert_eq!(settings.scan_interval, Duration::from_secs(60));
        assert_eq!(settings.max_concurrent_requests, 2);
        assert_eq!(settings.client.timeout, Duration::from_secs(10));
        assert_eq!(settings.client.credentials.token_id(), "id");

        let missing_tokens = Config {
            token_secret: String::new(),
            ..config
        };
        assert!(PollSettings::from_config(&missing_tokens).is_err());
    }
}
