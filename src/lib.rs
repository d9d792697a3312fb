//! Timer Bar - a server-driven countdown timer bar
//! 
//! The countdown is kept on the server so the displayed bar does not depend
//! on the accuracy of the front-end's clock. The engine pushes durations and
//! display triggers to a presentation surface and notifies listeners once per
//! countdown when it reaches zero.

pub mod config;
pub mod error;
pub mod state;
pub mod surface;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::TimerError;
pub use state::{AppState, CountdownTimer, Registration, TimerEndedEvent, TimerSnapshot};
pub use surface::{PresentationSurface, SurfaceProperty, SurfaceSignal};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
