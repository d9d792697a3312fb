//! Ended-listener registration and notification

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::{Deserialize, Serialize};

/// Notification delivered when a countdown reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerEndedEvent {
    /// True if the end was reported by the front-end rather than the server timer
    pub from_client: bool,
}

type Listener = Arc<dyn Fn(&TimerEndedEvent) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Ordered collection of ended listeners
#[derive(Default)]
pub struct ListenerRegistry {
    inner: Arc<Mutex<Listeners>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it stays registered until the returned handle is removed
    pub fn add<F>(&self, listener: F) -> Registration
    where
        F: Fn(&TimerEndedEvent) + Send + Sync + 'static,
    {
        let mut listeners = lock(&self.inner);
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));

        Registration {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Invoke every registered listener in registration order.
    ///
    /// The registry lock is released before any listener runs, so listeners
    /// may register or remove listeners themselves.
    pub fn notify(&self, event: &TimerEndedEvent) {
        let snapshot: Vec<Listener> = lock(&self.inner)
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`ListenerRegistry::add`]
#[derive(Debug)]
pub struct Registration {
    id: u64,
    registry: Weak<Mutex<Listeners>>,
}

impl Registration {
    /// Unregister this listener. Returns false if it was already gone.
    pub fn remove(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut listeners = lock(&registry);
        let before = listeners.entries.len();
        listeners.entries.retain(|(id, _)| *id != self.id);
        listeners.entries.len() != before
    }
}

// Listener panics must not disable the registry for everyone else.
fn lock(inner: &Mutex<Listeners>) -> MutexGuard<'_, Listeners> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
