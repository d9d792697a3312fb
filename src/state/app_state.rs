//! Main application state management

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::info;

use super::{CountdownTimer, Registration, TimerSnapshot};
use crate::{
    error::TimerError,
    surface::{BarEvent, BroadcastSurface},
};

/// Application state shared by the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// The countdown driving every connected bar
    pub timer: CountdownTimer,
    /// Surface publishing bar events to `/events` subscribers
    pub surface: Arc<BroadcastSurface>,
    /// Number of countdowns that have reached zero
    pub ended_count: Arc<AtomicU64>,
    /// Server metadata
    pub start_time: Instant,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Keep the ended listener registered for the lifetime of the state
    _ended_registration: Registration,
}

impl AppState {
    /// Create a new AppState with a stopped timer of `duration_ms`
    pub fn new(duration_ms: u64) -> Self {
        let (events_tx, _) = broadcast::channel(100);
        let surface = Arc::new(BroadcastSurface::new(events_tx));
        let timer = CountdownTimer::with_duration(duration_ms, surface.clone());
        let ended_count = Arc::new(AtomicU64::new(0));

        let listener_surface = Arc::clone(&surface);
        let listener_count = Arc::clone(&ended_count);
        let registration = timer.add_ended_listener(move |event| {
            info!("The timer has ended");
            listener_count.fetch_add(1, Ordering::SeqCst);
            listener_surface.publish(BarEvent::Ended {
                from_client: event.from_client,
            });
        });

        Self {
            timer,
            surface,
            ended_count,
            start_time: Instant::now(),
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            _ended_registration: registration,
        }
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Start the countdown
    pub fn start(&self) -> Result<TimerSnapshot, TimerError> {
        self.timer.start()?;
        self.record_action("start");
        Ok(self.timer.snapshot())
    }

    /// Stop the countdown
    pub fn stop(&self) -> TimerSnapshot {
        self.timer.stop();
        self.record_action("stop");
        self.timer.snapshot()
    }

    /// Reset the countdown to its full duration
    pub fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        self.timer.reset()?;
        self.record_action("reset");
        Ok(self.timer.snapshot())
    }

    /// Change the countdown duration
    pub fn set_duration(&self, milliseconds: u64) -> TimerSnapshot {
        info!("Setting duration to {}ms", milliseconds);
        self.timer.set_duration(milliseconds);
        self.record_action("duration");
        self.timer.snapshot()
    }

    /// Change the time left without touching the running state
    pub fn set_remaining(&self, milliseconds: u64) -> Result<TimerSnapshot, TimerError> {
        info!("Setting remaining time to {}ms", milliseconds);
        self.timer.set_remaining(milliseconds)?;
        self.record_action("remaining");
        Ok(self.timer.snapshot())
    }

    pub fn ended_count(&self) -> u64 {
        self.ended_count.load(Ordering::SeqCst)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn ended_countdown_is_counted_and_published() {
        let state = AppState::new(100);
        let mut events = state.surface.subscribe();

        state.start().unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(state.ended_count(), 1);
        let mut saw_ended = false;
        while let Ok(event) = events.try_recv() {
            if event == (BarEvent::Ended { from_client: false }) {
                saw_ended = true;
            }
        }
        assert!(saw_ended);
    }

    #[tokio::test(start_paused = true)]
    async fn actions_are_tracked() {
        let state = AppState::new(1000);
        assert_eq!(state.get_last_action(), (None, None));

        state.stop();
        let (action, time) = state.get_last_action();
        assert_eq!(action.as_deref(), Some("stop"));
        assert!(time.is_some());

        let snapshot = state.set_duration(3000);
        assert_eq!(snapshot.duration_ms, 3000);
        assert_eq!(state.get_last_action().0.as_deref(), Some("duration"));
    }

    #[test]
    fn uptime_is_formatted() {
        let state = AppState::new(1000);
        assert_eq!(state.get_uptime(), "0s");
    }
}
