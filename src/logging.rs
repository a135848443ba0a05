//! # Structured Logging Module
//!
//! Environment-aware structured logging that outputs to both console and a
//! JSON log file, for debugging the async save/sync flows in the field.

use std::fs;
use std::path::PathBuf;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific defaults.
///
/// Safe to call more than once; only the first call installs the subscriber.
pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let environment =
            std::env::var("VISITFLOW_ENV").unwrap_or_else(|_| "development".to_string());
        let default_level = match environment.as_str() {
            "production" => "info",
            "test" => "warn",
            _ => "debug",
        };
        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        let log_dir = PathBuf::from("log");
        if !log_dir.exists() {
            let _ = fs::create_dir_all(&log_dir);
        }
        let file_appender =
            tracing_appender::rolling::daily(&log_dir, format!("visitflow.{environment}.log"));
        let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

        let subscriber = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_ansi(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_target(true)
                    .with_ansi(false)
                    .json()
                    .with_filter(EnvFilter::new(default_level)),
            );

        // Don't panic if a subscriber is already set (e.g. by the host app)
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized");
        }

        tracing::info!(environment = %environment, "🔧 Structured logging initialized");

        // The non-blocking writer stops flushing once its guard drops
        std::mem::forget(guard);
    });
}
