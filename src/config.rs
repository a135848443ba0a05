//! # Configuration
//!
//! Typed configuration for the visit-flow core. Defaults mirror
//! [`crate::constants::defaults`]; an optional TOML file and
//! `VISITFLOW_`-prefixed environment variables override them, e.g.
//! `VISITFLOW_AUTOSAVE__DEBOUNCE_MS=500`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::defaults;
use crate::error::{Result, VisitCoreError};

/// Root configuration for the visit-flow core
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VisitCoreConfig {
    /// Draft auto-save tuning
    pub autosave: AutoSaveConfig,

    /// Offline sync queue tuning
    pub sync_queue: SyncQueueConfig,

    /// Hosted backend connection settings
    pub database: DatabaseConfig,
}

impl VisitCoreConfig {
    /// Load configuration with an optional `visitflow.toml` in the working
    /// directory plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration from an explicit file path plus environment
    /// overrides. Missing sections fall back to defaults.
    pub fn load_from(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        builder = match path {
            Some(explicit) => builder.add_source(File::with_name(explicit)),
            None => builder.add_source(File::with_name("visitflow").required(false)),
        };

        let settings = builder
            .add_source(Environment::with_prefix("VISITFLOW").separator("__"))
            .build()
            .map_err(|e| VisitCoreError::ConfigurationError(e.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|e| VisitCoreError::ConfigurationError(e.to_string()))
    }
}

/// Draft auto-save configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoSaveConfig {
    /// Whether changes schedule automatic saves; manual saves always work
    pub enabled: bool,
    pub debounce_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// How long the `Saved` status stays visible before reverting to `Idle`
    pub status_display_ms: u64,
    pub request_timeout_ms: u64,
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: defaults::AUTOSAVE_DEBOUNCE_MS,
            max_retries: defaults::AUTOSAVE_MAX_RETRIES,
            retry_base_delay_ms: defaults::AUTOSAVE_RETRY_BASE_DELAY_MS,
            status_display_ms: defaults::SAVED_STATUS_DISPLAY_MS,
            request_timeout_ms: defaults::REQUEST_TIMEOUT_SECS * 1_000,
        }
    }
}

impl AutoSaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn status_display(&self) -> Duration {
        Duration::from_millis(self.status_display_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Linear backoff: `attempt * base_delay`
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

/// Offline sync queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncQueueConfig {
    pub max_retries: u32,
    /// Fixed delay between sync attempts within one drain pass
    pub drain_delay_ms: u64,
    /// Safety-net drain interval while online with a non-empty queue
    pub periodic_drain_interval_secs: u64,
    pub request_timeout_ms: u64,
}

impl Default for SyncQueueConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::QUEUE_MAX_RETRIES,
            drain_delay_ms: defaults::QUEUE_DRAIN_DELAY_MS,
            periodic_drain_interval_secs: defaults::QUEUE_PERIODIC_DRAIN_SECS,
            request_timeout_ms: defaults::REQUEST_TIMEOUT_SECS * 1_000,
        }
    }
}

impl SyncQueueConfig {
    pub fn drain_delay(&self) -> Duration {
        Duration::from_millis(self.drain_delay_ms)
    }

    pub fn periodic_drain_interval(&self) -> Duration {
        Duration::from_secs(self.periodic_drain_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Hosted backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/visitflow".to_string(),
            pool: 5,
        }
    }
}
