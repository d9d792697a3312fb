//! Presentation surface module
//!
//! The countdown engine never renders anything itself. It pushes two numeric
//! properties and fires three display triggers at whatever implements
//! [`PresentationSurface`].

pub mod broadcast;
pub mod recording;

use serde::{Deserialize, Serialize};

// Re-export main types
pub use broadcast::{BarEvent, BroadcastSurface};
pub use recording::RecordingSurface;

/// Numeric properties pushed to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceProperty {
    #[serde(rename = "totalSeconds")]
    TotalSeconds,
    #[serde(rename = "remainingSeconds")]
    RemainingSeconds,
}

impl SurfaceProperty {
    /// Property name as the front-end element knows it
    pub fn name(&self) -> &'static str {
        match self {
            SurfaceProperty::TotalSeconds => "totalSeconds",
            SurfaceProperty::RemainingSeconds => "remainingSeconds",
        }
    }
}

/// Fire-and-forget display triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceSignal {
    Start,
    Stop,
    Reset,
}

/// One property push or signal invocation, in the order the engine issued it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SurfaceCommand {
    SetProperty { property: SurfaceProperty, value: f64 },
    Invoke { signal: SurfaceSignal },
}

impl SurfaceCommand {
    pub fn property(property: SurfaceProperty, value: f64) -> Self {
        SurfaceCommand::SetProperty { property, value }
    }

    pub fn invoke(signal: SurfaceSignal) -> Self {
        SurfaceCommand::Invoke { signal }
    }

    /// Apply this command to a surface
    pub fn apply_to(&self, surface: &dyn PresentationSurface) {
        match *self {
            SurfaceCommand::SetProperty { property, value } => surface.set_property(property, value),
            SurfaceCommand::Invoke { signal } => surface.invoke(signal),
        }
    }
}

/// The visual element the engine drives
///
/// Implementations may call back into the timer: the engine releases its
/// state lock before dispatching.
pub trait PresentationSurface: Send + Sync {
    fn set_property(&self, property: SurfaceProperty, value: f64);
    fn invoke(&self, signal: SurfaceSignal);
}

/// Surface that ignores everything, for headless timers
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl PresentationSurface for NullSurface {
    fn set_property(&self, _property: SurfaceProperty, _value: f64) {}

    fn invoke(&self, _signal: SurfaceSignal) {}
}

/// Convert milliseconds to the seconds value shown on the surface.
///
/// Truncates to whole seconds before converting, so 1999 ms is shown as 1.0.
pub fn to_seconds(milliseconds: u64) -> f64 {
    (milliseconds / 1000) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_are_truncated_not_rounded() {
        assert_eq!(to_seconds(0), 0.0);
        assert_eq!(to_seconds(999), 0.0);
        assert_eq!(to_seconds(1999), 1.0);
        assert_eq!(to_seconds(7000), 7.0);
    }

    #[test]
    fn property_names_match_serialized_form() {
        for property in [SurfaceProperty::TotalSeconds, SurfaceProperty::RemainingSeconds] {
            let json = serde_json::to_value(property).unwrap();
            assert_eq!(json, serde_json::Value::String(property.name().to_string()));
        }
    }

    #[test]
    fn command_serializes_with_kind_tag() {
        let json = serde_json::to_value(SurfaceCommand::invoke(SurfaceSignal::Reset)).unwrap();
        assert_eq!(json["kind"], "invoke");
        assert_eq!(json["signal"], "reset");

        let json = serde_json::to_value(SurfaceCommand::property(SurfaceProperty::TotalSeconds, 7.0)).unwrap();
        assert_eq!(json["kind"], "setProperty");
        assert_eq!(json["property"], "totalSeconds");
        assert_eq!(json["value"], 7.0);
    }
}
