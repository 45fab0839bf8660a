//! OS signal handling.
//!
//! # Responsibilities
//! - Wait for the interrupt signal (Ctrl-C / SIGINT)
//! - Merge it with the instance's own shutdown trigger
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Interrupt is the only recognised signal
//! - A failed handler installation never triggers shutdown by itself

use tokio::sync::broadcast;

/// Resolves on Ctrl-C. Pends forever if the handler cannot be installed.
pub async fn interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install interrupt handler");
        std::future::pending::<()>().await;
    }
}

/// Resolves on Ctrl-C or when `trigger` fires.
pub async fn shutdown_requested(trigger: &mut broadcast::Receiver<()>) {
    tokio::select! {
        _ = interrupt() => {
            tracing::info!("Interrupt signal received");
        }
        res = trigger.recv() => {
            match res {
                Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {
                    tracing::info!("Shutdown requested");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    // Every trigger handle is gone; only a signal can stop us now.
                    interrupt().await;
                    tracing::info!("Interrupt signal received");
                }
            }
        }
    }
}
