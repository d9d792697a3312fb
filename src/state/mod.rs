//! State management module
//! 
//! This module contains the countdown engine and the state shared with the HTTP layer.

pub mod app_state;
pub mod countdown;
pub mod listeners;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use countdown::{CountdownTimer, DEFAULT_DURATION_MS};
pub use listeners::{ListenerRegistry, Registration, TimerEndedEvent};
pub use timer_state::TimerSnapshot;
