//! # CRD Generator
//!
//! Prints the `SealedAge` CustomResourceDefinition as YAML.
//!
//! ```bash
//! cargo run --bin crdgen > config/crd/sealedage.yaml
//! cargo run --bin crdgen | kubectl apply -f -
//! ```

use anyhow::{Context, Result};
use kube::CustomResourceExt;
use sealed_age_controller::crd::SealedAge;

fn main() -> Result<()> {
    let yaml = serde_yaml::to_string(&SealedAge::crd()).context("Failed to serialize CRD to YAML")?;
    print!("{yaml}");
    Ok(())
}
