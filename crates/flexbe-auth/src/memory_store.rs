//! In-process credential store with per-context change fan-out
//!
//! A `MemoryStoreHub` is the shared slot. Each `context()` handle stands for
//! one execution context (one client instance, one "tab"). A write through a
//! handle is delivered to every other handle's subscribers, never its own.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::credentials::{Credential, CredentialStore, StoreEvent, StoreFuture};
use crate::error::Result;

const EVENT_CAPACITY: usize = 16;

#[derive(Default)]
struct HubState {
    slot: Option<String>,
    contexts: Vec<(Uuid, broadcast::Sender<StoreEvent>)>,
}

/// Shared slot for every context created from it.
#[derive(Clone, Default)]
pub struct MemoryStoreHub {
    state: Arc<Mutex<HubState>>,
}

impl MemoryStoreHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new execution context on this hub.
    pub fn context(&self) -> MemoryCredentialStore {
        let id = Uuid::new_v4();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        self.lock().contexts.push((id, events.clone()));
        MemoryCredentialStore {
            id,
            hub: self.clone(),
            events,
        }
    }

    /// Raw stored value, as another context would see it.
    pub fn raw(&self) -> Option<String> {
        self.lock().slot.clone()
    }

    /// Replace the raw value from outside any context. Every context is notified.
    pub fn put_raw(&self, raw: Option<String>) {
        self.publish(None, raw);
    }

    fn publish(&self, origin: Option<Uuid>, raw: Option<String>) {
        let mut state = self.lock();
        let event = StoreEvent::from_raw(raw.as_deref());
        state.slot = raw;
        for (id, sender) in &state.contexts {
            if Some(*id) != origin {
                // A context with no live subscribers simply misses the event
                let _ = sender.send(event.clone());
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One context's view of a [`MemoryStoreHub`].
pub struct MemoryCredentialStore {
    id: Uuid,
    hub: MemoryStoreHub,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryCredentialStore {
    /// A store with its own private hub.
    pub fn standalone() -> Self {
        MemoryStoreHub::new().context()
    }

    pub fn hub(&self) -> &MemoryStoreHub {
        &self.hub
    }
}

impl Drop for MemoryCredentialStore {
    fn drop(&mut self) {
        self.hub.lock().contexts.retain(|(id, _)| *id != self.id);
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn read(&self) -> StoreFuture<'_, Option<Credential>> {
        let raw = self.hub.raw();
        Box::pin(async move { Credential::parse_stored(&raw?) })
    }

    fn write<'a>(&'a self, credential: &'a Credential) -> StoreFuture<'a, Result<()>> {
        Box::pin(async move {
            let json = credential.to_json()?;
            self.hub.publish(Some(self.id), Some(json));
            Ok(())
        })
    }

    fn clear(&self) -> StoreFuture<'_, Result<()>> {
        Box::pin(async move {
            self.hub.publish(Some(self.id), None);
            Ok(())
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }
}
