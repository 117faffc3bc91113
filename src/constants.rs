//! # Constants
//!
//! Shared constants used throughout the controller.
//!
//! These values represent reasonable defaults and can be overridden via
//! configuration or environment variables where applicable.

/// Default HTTP server port for metrics and health probes
pub const DEFAULT_METRICS_PORT: u16 = 8080;

/// Default HTTP server startup timeout (how long to wait for server to be ready)
pub const DEFAULT_SERVER_STARTUP_TIMEOUT_SECS: u64 = 10;

/// Default HTTP server readiness poll interval
pub const DEFAULT_SERVER_POLL_INTERVAL_MS: u64 = 50;

/// Requeue delay when the key pool is empty (seconds)
/// Key Secrets are often provisioned after the SealedAge itself
pub const KEY_POOL_EMPTY_REQUEUE_SECS: u64 = 30;

/// Default exponential backoff starting value for failed reconciliations (milliseconds)
pub const DEFAULT_BACKOFF_START_MS: u64 = 5_000;

/// Default exponential backoff maximum value for failed reconciliations (milliseconds)
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 300_000;

/// Default delay before restarting watch stream after it ends (seconds)
pub const DEFAULT_WATCH_RESTART_DELAY_SECS: u64 = 5;

/// Default upper bound on concurrent reconciliations
pub const DEFAULT_MAX_CONCURRENT_RECONCILIATIONS: u16 = 10;

/// Default namespace holding the age key Secrets
pub const DEFAULT_KEY_NAMESPACE: &str = "sealed-age-system";

/// Default label key selecting age key Secrets
pub const DEFAULT_KEY_LABEL_KEY: &str = "app";

/// Default label value selecting age key Secrets
pub const DEFAULT_KEY_LABEL_VALUE: &str = "age-key";

/// Data field of a key Secret that holds the age identity
pub const PRIVATE_KEY_FIELD: &str = "private";

/// Secret type used when `spec.template.type` is not set
pub const DEFAULT_SECRET_TYPE: &str = "Opaque";

/// Field manager / controller name used for API writes
pub const CONTROLLER_NAME: &str = "sealed-age-controller";
