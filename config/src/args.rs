use std::time::Duration;

/// Command line overrides of the stored configuration.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Base URL of the BookStack instance, e.g. `https://docs.example.com`.
    #[clap(long, value_name = "URL", global = true)]
    pub url: Option<String>,

    /// API token id.
    #[clap(long, value_name = "ID", global = true)]
    pub token_id: Option<String>,

    /// API token secret.
    #[clap(long, value_name = "SECRET", global = true)]
    pub token_secret: Option<String>,

    /// Time between polling cycles, e.g. `5m` or `90s`.
    #[clap(long, value_name = "DURATION", value_parser = humantime::parse_duration, global = true)]
    pub scan_interval: Option<Duration>,

    /// Enable or disable per-shelf statistics.
    #[clap(long = "per-shelf", value_name = "BOOL", global = true)]
    pub per_shelf_enabled: Option<bool>,

    /// Timeout of a single API request, e.g. `10s`.
    #[clap(long, value_name = "DURATION", value_parser = humantime::parse_duration, global = true)]
    pub request_timeout: Option<Duration>,

    /// Maximum number of detail requests in flight during a cycle.
    #[clap(long, value_name = "N", global = true)]
    pub max_concurrent_requests: Option<usize>,
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for ConfigArgs {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(url) = &self.url {
                cache.insert("url".to_string(), url.clone().into());
            }
            if let Some(token_id) = &self.token_id {
                cache.insert("token_id".to_string(), token_id.clone().into());
            }
            if let Some(token_secret) = &self.token_secret {
                cache.insert("token_secret".to_string(), token_secret.clone().into());
            }
            if let Some(scan_interval) = self.scan_interval {
                cache.insert("scan_interval".to_string(), scan_interval.as_secs().into());
            }
            if let Some(per_shelf_enabled) = self.per_shelf_enabled {
                cache.insert("per_shelf_enabled".to_string(), per_shelf_enabled.into());
            }
            if let Some(request_timeout) = self.request_timeout {
                cache.insert("request_timeout".to_string(), request_timeout.as_secs().into());
            }
            if let Some(max_concurrent_requests) = self.max_concurrent_requests {
                cache.insert("max_concurrent_requests".to_string(), (max_concurrent_requests as u64).into());
            }
            Ok(cache.into_iter().collect())
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "{}

Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        clap::crate_version!()
    )
}
