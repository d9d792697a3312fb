//! Signal handling for graceful shutdown

use std::future::Future;
use signal_hook_tokio::Signals;
use futures::stream::StreamExt;
use tracing::{error, info};

/// Wait for shutdown signals (SIGTERM, SIGINT)
pub async fn shutdown_signal() -> std::io::Result<()> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])?;

    if let Some(signal) = signals.next().await {
        info!("Received signal: {}", signal);
    }
    signals.handle().close();
    Ok(())
}

/// Resolve when `signal` reports a shutdown request.
///
/// If the handler could not be installed this never resolves, so the server
/// keeps running instead of exiting right after startup.
pub async fn wait_for_shutdown<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            error!("Failed to install signal handler, running without one: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test(start_paused = true)]
    async fn failed_handler_keeps_waiting() {
        let failing = async { Err(std::io::Error::other("signals unavailable")) };
        let result = timeout(Duration::from_secs(3600), wait_for_shutdown(failing)).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn received_signal_resolves() {
        let result = timeout(Duration::from_secs(1), wait_for_shutdown(async { Ok(()) })).await;
        assert!(result.is_ok());
    }
}
