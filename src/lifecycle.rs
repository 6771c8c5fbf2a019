//! Process shutdown.

use crate::storage::StorageContext;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Resolve once `trigger` fires, reporting what state the service stops in.
///
/// The database connect task is detached; if it has not finished by now it is
/// dropped with the runtime.
pub async fn shutdown_on<F>(trigger: F, storage: Arc<StorageContext>)
where
    F: Future<Output = ()>,
{
    trigger.await;

    if storage.is_ready() {
        info!("🛑 Shutdown signal received, closing listener");
    } else {
        warn!("🛑 Shutdown signal received before the database connected, closing listener");
    }
}

/// Ctrl+C, or SIGTERM on unix.
///
/// A handler that cannot be installed is logged and never fires, so the other
/// one still can.
pub async fn os_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
