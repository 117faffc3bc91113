//! # Watch Loop
//!
//! Runs the `kube_runtime` controller over SealedAge resources and the Secrets
//! they own, until a shutdown signal arrives.

use crate::controller::reconciler::reconcile;
use crate::crd::SealedAge;
use crate::observability::metrics;
use crate::runtime::error_policy::{
    handle_object_not_found, handle_reconciliation_error, log_watch_error,
};
use crate::runtime::initialization::InitializationResult;
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::Api;
use kube_runtime::{controller, watcher, Controller};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Run the controller until shutdown
pub async fn run_watch_loop(init: InitializationResult) -> Result<(), anyhow::Error> {
    let InitializationResult {
        client,
        reconciler,
        server_state,
        controller_config,
    } = init;

    // Readiness drops as soon as shutdown starts so no new traffic is routed here
    let shutdown_state = Arc::clone(&server_state);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal, waiting for in-flight reconciliations to complete...");
        shutdown_state.set_ready(false);
    });

    loop {
        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let sealed_ages: Api<SealedAge> = Api::all(client.clone());
        let secrets: Api<Secret> = Api::all(client.clone());
        let config = controller::Config::default()
            .concurrency(controller_config.max_concurrent_reconciliations);

        info!("Starting controller watch loop...");
        Controller::new(sealed_ages, watcher::Config::default())
            .owns(secrets, watcher::Config::default())
            .with_config(config)
            .shutdown_on_signal()
            .run(reconcile, handle_reconciliation_error, Arc::clone(&reconciler))
            .for_each(|result| {
                let ctx = Arc::clone(&reconciler);
                async move {
                    match result {
                        Ok((obj, _action)) => debug!(resource = %obj, "Reconciled"),
                        // Already logged and counted by the error policy
                        Err(controller::Error::ReconcilerFailed(_, obj)) => {
                            debug!(resource = %obj, "Reconcile failed, requeued with backoff");
                        }
                        Err(controller::Error::ObjectNotFound(obj)) => {
                            handle_object_not_found(&ctx, obj.namespace.as_deref(), &obj.name);
                        }
                        Err(e) => {
                            log_watch_error(&format!("{e:?}"));
                        }
                    }
                }
            })
            .await;

        if !server_state.is_ready() {
            info!("Shutdown requested, exiting watch loop");
            break;
        }

        let delay = controller_config.watch_restart_delay_duration();
        warn!(
            "Controller watch stream ended, restarting in {} seconds...",
            delay.as_secs()
        );
        metrics::increment_requeues("watch_restart");
        tokio::time::sleep(delay).await;
    }

    info!("Controller stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for SIGINT: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
