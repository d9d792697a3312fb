//! Background tasks module
//! 
//! This module contains the scheduled tasks that run alongside the timer.

pub mod expiry;

// Re-export main functions
pub use expiry::spawn_expiry;
