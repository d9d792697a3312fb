//! Scheduled expiry callback

use std::time::Duration;
use tokio::{runtime::Handle, task::JoinHandle, time::sleep};
use tracing::debug;

/// Spawn a one-shot task on `runtime` that runs `on_fire` after `delay`.
///
/// Aborting the returned handle before the delay elapses guarantees `on_fire`
/// never runs. Once the sleep has completed the callback runs to completion,
/// so callers that need stronger cancellation must check a generation tag
/// inside `on_fire`.
pub fn spawn_expiry<F>(runtime: &Handle, delay: Duration, generation: u64, on_fire: F) -> JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    debug!("Arming expiry generation {} in {}ms", generation, delay.as_millis());

    runtime.spawn(async move {
        sleep(delay).await;
        debug!("Expiry generation {} fired", generation);
        on_fire();
    })
}
