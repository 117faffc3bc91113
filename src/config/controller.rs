//! # Controller Configuration
//!
//! Controller-level settings loaded from environment variables.

use crate::controller::reconciler::KeyPoolSelector;
use std::time::Duration;

/// Controller-level configuration
///
/// All settings have sensible defaults and can be overridden via environment variables.
/// Command line flags of the controller binary take precedence over both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Namespace containing the age key Secrets
    pub key_namespace: String,
    /// Label key selecting age key Secrets
    pub key_label_key: String,
    /// Label value selecting age key Secrets
    pub key_label_value: String,
    /// Exponential backoff starting value (milliseconds)
    /// Initial delay before retrying a failed reconciliation
    pub backoff_start_ms: u64,
    /// Exponential backoff maximum value (milliseconds)
    pub backoff_max_ms: u64,
    /// Delay before restarting the watch stream after it ends (seconds)
    pub watch_restart_delay_secs: u64,
    /// Maximum concurrent reconciliations (0 = unbounded)
    pub max_concurrent_reconciliations: u16,
    /// Default log filter when `RUST_LOG` is not set
    pub log_level: String,
    /// Log format (json, text)
    pub log_format: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            key_namespace: DEFAULT_KEY_NAMESPACE.to_string(),
            key_label_key: DEFAULT_KEY_LABEL_KEY.to_string(),
            key_label_value: DEFAULT_KEY_LABEL_VALUE.to_string(),
            backoff_start_ms: DEFAULT_BACKOFF_START_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            watch_restart_delay_secs: DEFAULT_WATCH_RESTART_DELAY_SECS,
            max_concurrent_reconciliations: DEFAULT_MAX_CONCURRENT_RECONCILIATIONS,
            log_level: "info".to_string(),
            log_format: "json".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            key_namespace: lookup("KEY_NAMESPACE").unwrap_or(defaults.key_namespace),
            key_label_key: lookup("KEY_LABEL_KEY").unwrap_or(defaults.key_label_key),
            key_label_value: lookup("KEY_LABEL_VALUE").unwrap_or(defaults.key_label_value),
            backoff_start_ms: parsed_or(&lookup, "BACKOFF_START_MS", defaults.backoff_start_ms),
            backoff_max_ms: parsed_or(&lookup, "BACKOFF_MAX_MS", defaults.backoff_max_ms),
            watch_restart_delay_secs: parsed_or(
                &lookup,
                "WATCH_RESTART_DELAY_SECS",
                defaults.watch_restart_delay_secs,
            ),
            max_concurrent_reconciliations: parsed_or(
                &lookup,
                "MAX_CONCURRENT_RECONCILIATIONS",
                defaults.max_concurrent_reconciliations,
            ),
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_format: lookup("LOG_FORMAT").unwrap_or(defaults.log_format),
        }
    }

    /// Key pool location handed to the reconciler
    #[must_use]
    pub fn key_pool_selector(&self) -> KeyPoolSelector {
        KeyPoolSelector::new(
            self.key_namespace.clone(),
            self.key_label_key.clone(),
            self.key_label_value.clone(),
        )
    }

    /// Get backoff start duration
    pub fn backoff_start_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_start_ms)
    }

    /// Get backoff max duration
    pub fn backoff_max_duration(&self) -> Duration {
        Duration::from_millis(self.backoff_max_ms)
    }

    /// Get watch restart delay duration
    pub fn watch_restart_delay_duration(&self) -> Duration {
        Duration::from_secs(self.watch_restart_delay_secs)
    }
}

/// Parse a looked-up value or fall back to the default
pub(crate) fn parsed_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
