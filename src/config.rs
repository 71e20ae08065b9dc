//! Configuration module with TOML and environment variable support

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Harvester configuration with magic constants and default values
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Kafka bootstrap server address
    pub kafka_host: String,

    /// Upstream API base URL
    pub endpoint: String,

    /// Token sent in the `token` header on every upstream request
    pub api_token: String,

    /// Page size requested from the upstream source; also the
    /// undersized-page detection threshold
    pub batch_size: usize,

    /// Topic the pipeline publishes to (and measures lag on)
    pub topic: String,

    /// Consumer group used for lag measurement
    pub consumer_group: String,

    /// Lag high-water mark; at or above this, fetch cycles are skipped
    pub lag_high_water: i64,

    /// Sleep after a throttled cycle (seconds)
    pub lag_sleep_secs: u64,

    /// Sleep after a failed fetch or rejected page (seconds)
    pub error_sleep_secs: u64,

    /// Sleep when the source is exhausted at the minimum window (seconds)
    pub exhausted_sleep_secs: u64,

    /// Initial lookback window in days
    pub initial_delta_days: i64,

    /// Throughput log cadence (records per log line)
    pub throughput_log_every: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kafka_host: "127.0.0.1:9092".to_string(),
            endpoint: "http://127.0.0.1:8000".to_string(),
            api_token: String::new(),
            batch_size: 1000,
            topic: "player".to_string(),
            consumer_group: "scraper".to_string(),
            lag_high_water: 100_000,
            lag_sleep_secs: 60,
            error_sleep_secs: 30,
            exhausted_sleep_secs: 300,
            initial_delta_days: 7,
            throughput_log_every: 1000,
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: Config =
            toml::from_str(&contents).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the current values.
    /// Environment variables win over TOML.
    pub fn from_env(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("KAFKA_HOST") {
            self.kafka_host = host;
        }

        if let Ok(endpoint) = std::env::var("ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Ok(token) = std::env::var("API_TOKEN") {
            self.api_token = token;
        }

        if let Ok(size) = std::env::var("BATCH_SIZE") {
            self.batch_size = size
                .parse()
                .map_err(|e| anyhow!("Invalid BATCH_SIZE: {}", e))?;
        }

        self.validate()?;
        Ok(())
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.kafka_host.is_empty() {
            return Err(anyhow!("kafka_host must not be empty"));
        }
        if self.endpoint.is_empty() {
            return Err(anyhow!("endpoint must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(anyhow!("batch_size must be > 0"));
        }
        if self.lag_high_water <= 0 {
            return Err(anyhow!("lag_high_water must be > 0"));
        }
        if self.initial_delta_days < 1 {
            return Err(anyhow!("initial_delta_days must be >= 1"));
        }
        if self.throughput_log_every == 0 {
            return Err(anyhow!("throughput_log_every must be > 0"));
        }
        if self.topic.is_empty() {
            return Err(anyhow!("topic must not be empty"));
        }
        if self.consumer_group.is_empty() {
            return Err(anyhow!("consumer_group must not be empty"));
        }
        Ok(())
    }

    /// Create configuration from defaults with environment overrides
    pub fn with_env_overrides() -> Result<Self> {
        let mut config = Self::default();
        config.from_env()?;
        Ok(config)
    }

    /// Load from a TOML file, then apply environment overrides
    pub fn from_file_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::from_file(path)?;
        config.from_env()?;
        Ok(config)
    }
}
