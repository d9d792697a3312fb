//! Surface that records every command it receives

use std::sync::Mutex;

use super::{PresentationSurface, SurfaceCommand, SurfaceProperty, SurfaceSignal};

/// Keeps an ordered log of commands, useful for inspecting what the engine did
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Mutex<Vec<SurfaceCommand>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, command: SurfaceCommand) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(command);
        }
    }

    /// All commands received so far
    pub fn commands(&self) -> Vec<SurfaceCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Only the signals, in order
    pub fn signals(&self) -> Vec<SurfaceSignal> {
        self.commands()
            .into_iter()
            .filter_map(|command| match command {
                SurfaceCommand::Invoke { signal } => Some(signal),
                SurfaceCommand::SetProperty { .. } => None,
            })
            .collect()
    }

    /// Most recent value pushed for a property
    pub fn last_value(&self, property: SurfaceProperty) -> Option<f64> {
        self.commands().into_iter().rev().find_map(|command| match command {
            SurfaceCommand::SetProperty { property: p, value } if p == property => Some(value),
            _ => None,
        })
    }

    /// Forget everything recorded so far
    pub fn clear(&self) {
        if let Ok(mut commands) = self.commands.lock() {
            commands.clear();
        }
    }
}

impl PresentationSurface for RecordingSurface {
    fn set_property(&self, property: SurfaceProperty, value: f64) {
        self.record(SurfaceCommand::property(property, value));
    }

    fn invoke(&self, signal: SurfaceSignal) {
        self.record(SurfaceCommand::invoke(signal));
    }
}
