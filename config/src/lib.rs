#[macro_use]
extern crate tracing;

mod app_config;
mod args;

pub use app_config::{
    get_config_dir,
    get_data_dir,
    AppConfig,
    ENV_PREFIX,
};
pub use args::{
    version,
    ConfigArgs,
};
use eyre::{
    bail,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::Path,
    time::Duration,
};

/// Shortest accepted polling interval.
pub const MIN_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Placeholder for secrets in diagnostics output.
pub const REDACTED: &str = "**REDACTED**";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    pub app_config: AppConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<url::Url>,
    #[serde(default)]
    pub token_id: String,
    #[serde(default)]
    pub token_secret: String,
    /// Seconds between polling cycles.
    pub scan_interval: u64,
    pub per_shelf_enabled: bool,
    /// Seconds.
    pub request_timeout: u64,
    pub max_concurrent_requests: usize,
    pub max_retries: u32,
    pub max_pages: usize,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(url) = &self.url {
            cache.insert("url".to_string(), url.to_string().into());
        }
        cache.insert("token_id".to_string(), self.token_id.clone().into());
        cache.insert("token_secret".to_string(), self.token_secret.clone().into());
        cache.insert("scan_interval".to_string(), self.scan_interval.into());
        cache.insert("per_shelf_enabled".to_string(), self.per_shelf_enabled.into());
        cache.insert("request_timeout".to_string(), self.request_timeout.into());
        cache.insert(
            "max_concurrent_requests".to_string(),
            (self.max_concurrent_requests as u64).into(),
        );
        cache.insert("max_retries".to_string(), (self.max_retries as u64).into());
        cache.insert("max_pages".to_string(), (self.max_pages as u64).into());
        Ok(cache.into_iter().collect())
    }
}

impl Config {
    /// Layers defaults, `{config_dir}/config.yaml`, `BOOKSTACK_MONITOR_*` variables and `args`.
    pub fn new(args: ConfigArgs) -> Result<Self, config::ConfigError> {
        let environment = config::Environment::with_prefix(ENV_PREFIX).try_parsing(true);
        Self::load(&get_config_dir(), &get_data_dir(), environment, args)
    }

    pub fn load(
        config_dir: &Path,
        data_dir: &Path,
        environment: config::Environment,
        args: ConfigArgs,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let path = config_dir.join(file);
            debug!(?path, exists = path.exists(), "Reading config file");
            let source = config::File::from(path).format(*format).required(false);
            builder = builder.add_source(source);
        }

        builder = builder.add_source(environment).add_source(args);

        let cfg: Self = builder.build()?.try_deserialize()?;

        Ok(cfg)
    }

    /// Rejects settings polling cannot start with.
    pub fn validate(&self) -> Result<()> {
        let Some(url) = &self.url else {
            bail!("no BookStack URL configured, set `url` or pass --url");
        };
        if !matches!(url.scheme(), "http" | "https") {
            bail!("BookStack URL must use http or https, got {url}");
        }
        if self.token_id.trim().is_empty() || self.token_secret.trim().is_empty() {
            bail!("token_id and token_secret must both be set");
        }
        if self.scan_interval() < MIN_SCAN_INTERVAL {
            bail!(
                "scan_interval must be at least {} seconds, got {}",
                MIN_SCAN_INTERVAL.as_secs(),
                self.scan_interval
            );
        }
        if self.request_timeout == 0 {
            bail!("request_timeout must be positive");
        }
        if self.max_concurrent_requests == 0 {
            bail!("max_concurrent_requests must be positive");
        }
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        Ok(())
    }

    pub fn scan_interval(&self) -> Duration {
        Duration::from_secs(self.scan_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    pub fn config_dir(&self) -> &Path {
        &self.app_config.config_dir
    }

    /// Copy safe to print: both token fields replaced.
    pub fn redacted(&self) -> Self {
        Self {
            token_id: REDACTED.to_string(),
            token_secret: REDACTED.to_string(),
            ..self.clone()
        }
    }
}
