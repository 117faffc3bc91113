//! # Sealed Age Controller
//!
//! Kubernetes controller that decrypts age-encrypted `SealedAge` resources
//! into Secrets of the same name.
//!
//! Private keys are read from Secrets in one namespace selected by a label
//! (`sealed-age-system`, `app=age-key` by default). Each key Secret holds an
//! age identity in its `private` field.

use anyhow::Result;
use clap::Parser;
use sealed_age_controller::config::{self, ControllerConfig, ServerConfig};
use sealed_age_controller::runtime::{initialize, run_watch_loop};

/// Command line flags; each overrides the matching environment variable
#[derive(Debug, Parser)]
#[command(name = "sealed-age-controller", version, about)]
struct Args {
    /// Namespace holding the age key Secrets
    #[arg(long, env = "KEY_NAMESPACE")]
    key_namespace: Option<String>,

    /// Label key selecting age key Secrets
    #[arg(long, env = "KEY_LABEL_KEY")]
    key_label_key: Option<String>,

    /// Label value selecting age key Secrets
    #[arg(long = "key-label-val", env = "KEY_LABEL_VALUE")]
    key_label_value: Option<String>,

    /// Port for /metrics, /healthz and /readyz
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,
}

impl Args {
    fn apply(self, controller: &mut ControllerConfig, server: &mut ServerConfig) {
        if let Some(namespace) = self.key_namespace {
            controller.key_namespace = namespace;
        }
        if let Some(key) = self.key_label_key {
            controller.key_label_key = key;
        }
        if let Some(value) = self.key_label_value {
            controller.key_label_value = value;
        }
        if let Some(port) = self.metrics_port {
            server.metrics_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (mut controller_config, mut server_config) = config::load_config();
    args.apply(&mut controller_config, &mut server_config);

    let init = initialize(controller_config, server_config).await?;
    run_watch_loop(init).await
}
