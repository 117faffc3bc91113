//! # Controller Configuration
//!
//! Process-level configuration loaded once at startup from environment variables.
//! The controller binary layers its command line flags on top.

mod controller;
mod server;

pub use controller::ControllerConfig;
pub use server::ServerConfig;

/// Load configuration from environment variables with defaults
pub fn load_config() -> (ControllerConfig, ServerConfig) {
    (ControllerConfig::from_env(), ServerConfig::from_env())
}
