//! Surface that fans commands out to subscribers over a broadcast channel

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use super::{PresentationSurface, SurfaceCommand, SurfaceProperty, SurfaceSignal};

/// Event delivered to remote front-ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BarEvent {
    /// A property push or display trigger
    Surface(SurfaceCommand),
    /// The countdown reached zero
    Ended {
        #[serde(rename = "fromClient")]
        from_client: bool,
    },
}

/// Publishes every surface command as a [`BarEvent`]
#[derive(Debug, Clone)]
pub struct BroadcastSurface {
    tx: broadcast::Sender<BarEvent>,
}

impl BroadcastSurface {
    /// Wrap an existing sender
    pub fn new(tx: broadcast::Sender<BarEvent>) -> Self {
        Self { tx }
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<BarEvent> {
        self.tx.subscribe()
    }

    /// Publish an arbitrary event; having no subscribers is not an error
    pub fn publish(&self, event: BarEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("No subscribers for bar event: {:?}", e.0);
        }
    }
}

impl PresentationSurface for BroadcastSurface {
    fn set_property(&self, property: SurfaceProperty, value: f64) {
        debug!("Pushing {} = {}", property.name(), value);
        self.publish(BarEvent::Surface(SurfaceCommand::property(property, value)));
    }

    fn invoke(&self, signal: SurfaceSignal) {
        self.publish(BarEvent::Surface(SurfaceCommand::invoke(signal)));
    }
}
