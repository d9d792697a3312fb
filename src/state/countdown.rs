//! Countdown engine
//!
//! Keeps the authoritative countdown on the server so the displayed bar does
//! not depend on the front-end's clock. At most one expiry task is pending per
//! timer. Every cancellation bumps a generation counter, and the expiry
//! callback checks it under the state lock, so a firing that lost a race with
//! `stop`/`reset`/`start` is discarded.

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use tokio::{runtime::Handle, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

use super::{
    listeners::{ListenerRegistry, Registration, TimerEndedEvent},
    timer_state::TimerSnapshot,
};
use crate::{
    error::TimerError,
    surface::{to_seconds, PresentationSurface, SurfaceCommand, SurfaceProperty, SurfaceSignal},
    tasks::spawn_expiry,
};

/// Duration used by [`CountdownTimer::new`]
pub const DEFAULT_DURATION_MS: u64 = 10_000;

/// Longest accepted duration; remaining time is reported as `i64`
pub const MAX_DURATION_MS: u64 = i64::MAX as u64;

/// Mutable bookkeeping, always accessed under one lock
#[derive(Debug, Default)]
struct CountdownState {
    total_ms: u64,
    /// Frozen remaining time while stopped; the base of the current run while running
    remaining_ms: u64,
    started_at: Option<Instant>,
    running: bool,
    generation: u64,
    pending: Option<JoinHandle<()>>,
    disposed: bool,
}

impl CountdownState {
    fn remaining_at(&self, now: Instant) -> i64 {
        let base = i64::try_from(self.remaining_ms).unwrap_or(i64::MAX);
        match (self.running, self.started_at) {
            (true, Some(started_at)) => {
                let elapsed = now.saturating_duration_since(started_at).as_millis();
                base.saturating_sub(i64::try_from(elapsed).unwrap_or(i64::MAX))
            }
            _ => base,
        }
    }

    /// Remaining time to resume from, never negative
    fn frozen_at(&self, now: Instant) -> u64 {
        u64::try_from(self.remaining_at(now)).unwrap_or(0)
    }

    /// Invalidate whatever expiry is outstanding
    fn cancel_pending(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

struct Shared {
    state: Mutex<CountdownState>,
    listeners: ListenerRegistry,
    surface: Arc<dyn PresentationSurface>,
    runtime: Option<Handle>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, CountdownState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Countdown state lock was poisoned, continuing with last state");
            poisoned.into_inner()
        })
    }

    /// The caller's runtime if there is one, otherwise the one captured at construction
    fn scheduler(&self) -> Result<Handle, TimerError> {
        Handle::try_current()
            .ok()
            .or_else(|| self.runtime.clone())
            .ok_or(TimerError::NoRuntime)
    }

    fn dispatch(&self, commands: Vec<SurfaceCommand>) {
        for command in &commands {
            command.apply_to(self.surface.as_ref());
        }
    }

    /// Called by the expiry task armed with `generation`
    fn on_end(&self, generation: u64) {
        if self.finish(generation) {
            self.deliver_ended();
        }
    }

    /// Move a current run to the ended state. False if `generation` is stale.
    fn finish(&self, generation: u64) -> bool {
        let mut state = self.lock();
        if state.generation != generation || !state.running {
            debug!(
                "Discarding stale expiry generation {} (current {})",
                generation, state.generation
            );
            return false;
        }
        state.running = false;
        state.remaining_ms = 0;
        state.started_at = None;
        state.pending = None;
        true
    }

    /// Notify listeners unless the timer has been dropped meanwhile.
    ///
    /// A drop that lands after this check still lets the in-flight
    /// notification through.
    fn deliver_ended(&self) {
        if self.lock().disposed {
            debug!("Timer dropped before its ended notification was delivered");
            return;
        }

        info!("Countdown ended");
        if self.listeners.is_empty() {
            debug!("No ended listeners registered");
        }
        self.listeners.notify(&TimerEndedEvent { from_client: false });
    }
}

/// Arm a fresh expiry `remaining_ms` from now, replacing any pending one.
///
/// Caller holds the lock. The state is only touched once the new task is
/// known to be scheduled, so a failure leaves the timer as it was. While the
/// lock is held a live expiry cannot complete, so a task that is already
/// finished right after spawning was rejected by a shut-down runtime.
fn arm(
    shared: &Arc<Shared>,
    state: &mut CountdownState,
    runtime: &Handle,
    remaining_ms: u64,
) -> Result<(), TimerError> {
    let now = Instant::now();
    let generation = state.generation + 1;
    let weak: Weak<Shared> = Arc::downgrade(shared);
    let pending = spawn_expiry(
        runtime,
        Duration::from_millis(remaining_ms),
        generation,
        move || {
            if let Some(shared) = weak.upgrade() {
                shared.on_end(generation);
            }
        },
    );
    if pending.is_finished() {
        warn!("Expiry could not be scheduled, runtime has shut down");
        return Err(TimerError::RuntimeShutdown);
    }

    state.cancel_pending();
    debug_assert_eq!(state.generation, generation);
    state.remaining_ms = remaining_ms;
    state.started_at = Some(now);
    state.pending = Some(pending);
    state.running = true;
    Ok(())
}

/// Server-side countdown driving a [`PresentationSurface`]
pub struct CountdownTimer {
    shared: Arc<Shared>,
}

impl CountdownTimer {
    /// Create a stopped timer with the default 10 second duration
    pub fn new(surface: Arc<dyn PresentationSurface>) -> Self {
        Self::with_duration(DEFAULT_DURATION_MS, surface)
    }

    /// Create a stopped timer counting down from `milliseconds`.
    ///
    /// Captures the current tokio runtime, if any, as a fallback for
    /// scheduling expiries from threads outside any runtime.
    pub fn with_duration(milliseconds: u64, surface: Arc<dyn PresentationSurface>) -> Self {
        let timer = Self {
            shared: Arc::new(Shared {
                state: Mutex::new(CountdownState::default()),
                listeners: ListenerRegistry::new(),
                surface,
                runtime: Handle::try_current().ok(),
            }),
        };
        timer.set_duration(milliseconds);
        timer
    }

    /// Set the length of the countdown. Remaining time is reset to the new
    /// length; the running state is left alone.
    ///
    /// Values above [`MAX_DURATION_MS`] are clamped to it.
    pub fn set_duration(&self, milliseconds: u64) {
        let milliseconds = milliseconds.min(MAX_DURATION_MS);
        {
            let mut state = self.shared.lock();
            state.total_ms = milliseconds;
            state.remaining_ms = milliseconds;
        }
        debug!("Duration set to {}ms", milliseconds);

        self.shared.dispatch(vec![
            SurfaceCommand::property(SurfaceProperty::TotalSeconds, to_seconds(milliseconds)),
            SurfaceCommand::property(SurfaceProperty::RemainingSeconds, to_seconds(milliseconds)),
        ]);
    }

    /// The number of milliseconds this timer counts down from
    pub fn duration(&self) -> u64 {
        self.shared.lock().total_ms
    }

    /// Set the remaining time, clamped to the duration.
    ///
    /// A running timer keeps running and is re-armed to end `milliseconds`
    /// from now; no start signal is sent.
    pub fn set_remaining(&self, milliseconds: u64) -> Result<(), TimerError> {
        let remaining = {
            let mut state = self.shared.lock();
            let remaining = milliseconds.min(state.total_ms);
            if state.running {
                let runtime = self.shared.scheduler()?;
                arm(&self.shared, &mut state, &runtime, remaining)?;
            } else {
                state.remaining_ms = remaining;
            }
            remaining
        };
        debug!("Remaining set to {}ms", remaining);

        self.shared.dispatch(vec![SurfaceCommand::property(
            SurfaceProperty::RemainingSeconds,
            to_seconds(remaining),
        )]);
        Ok(())
    }

    /// Milliseconds left. While running this is derived from the clock and
    /// may be briefly negative between expiry and its processing.
    pub fn remaining(&self) -> i64 {
        self.shared.lock().remaining_at(Instant::now())
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// Start counting down from the current remaining time.
    ///
    /// Starting a running timer re-arms it from what is left at this instant.
    pub fn start(&self) -> Result<(), TimerError> {
        let runtime = self.shared.scheduler()?;
        let remaining = {
            let mut state = self.shared.lock();
            let remaining = state.frozen_at(Instant::now());
            arm(&self.shared, &mut state, &runtime, remaining)?;
            remaining
        };
        info!("Countdown started with {}ms remaining", remaining);

        self.shared.dispatch(vec![SurfaceCommand::invoke(SurfaceSignal::Start)]);
        Ok(())
    }

    /// Stop the countdown and keep the remaining time
    pub fn stop(&self) {
        let remaining = {
            let mut state = self.shared.lock();
            state.remaining_ms = state.frozen_at(Instant::now());
            state.cancel_pending();
            state.running = false;
            state.started_at = None;
            state.remaining_ms
        };
        info!("Countdown stopped with {}ms remaining", remaining);

        self.shared.dispatch(vec![SurfaceCommand::invoke(SurfaceSignal::Stop)]);
    }

    /// Restore the full duration. A running timer keeps running from the
    /// full duration and signals start before reset.
    pub fn reset(&self) -> Result<(), TimerError> {
        let mut commands = Vec::with_capacity(3);
        {
            let mut state = self.shared.lock();
            let total = state.total_ms;
            let restarted = if state.running {
                let runtime = self.shared.scheduler()?;
                arm(&self.shared, &mut state, &runtime, total)?;
                true
            } else {
                state.remaining_ms = total;
                false
            };

            commands.push(SurfaceCommand::property(SurfaceProperty::RemainingSeconds, to_seconds(total)));
            if restarted {
                commands.push(SurfaceCommand::invoke(SurfaceSignal::Start));
            }
            commands.push(SurfaceCommand::invoke(SurfaceSignal::Reset));
        }
        info!("Countdown reset");

        self.shared.dispatch(commands);
        Ok(())
    }

    /// Register a listener for the ended notification
    pub fn add_ended_listener<F>(&self, listener: F) -> Registration
    where
        F: Fn(&TimerEndedEvent) + Send + Sync + 'static,
    {
        let registration = self.shared.listeners.add(listener);
        debug!("Ended listener registered ({} total)", self.shared.listeners.len());
        registration
    }

    /// Consistent view of duration, remaining time and running state
    pub fn snapshot(&self) -> TimerSnapshot {
        let state = self.shared.lock();
        TimerSnapshot::new(state.running, state.total_ms, state.remaining_at(Instant::now()))
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.cancel_pending();
        state.running = false;
        state.disposed = true;
    }
}

impl std::fmt::Debug for CountdownTimer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.lock();
        f.debug_struct("CountdownTimer")
            .field("total_ms", &state.total_ms)
            .field("remaining_ms", &state.remaining_ms)
            .field("running", &state.running)
            .field("generation", &state.generation)
            .finish()
    }
}
