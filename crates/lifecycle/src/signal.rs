//! Process signals

use shared::{CancelHandle, Error, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Resolve when the process receives Ctrl-C
pub async fn shutdown_signal() -> Result<()> {
    tokio::signal::ctrl_c().await.map_err(Error::Io)?;
    info!("interrupt received");
    Ok(())
}

/// Cancel `handle` on Ctrl-C.
///
/// If the signal handler cannot be installed the handle is cancelled right
/// away, so the process does not run without a way to stop it.
pub fn cancel_on_signal(handle: CancelHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            warn!(error = %e, "failed to listen for interrupt");
        }
        handle.cancel();
    })
}
