#![forbid(unsafe_code)]

//! Per-slot change subscription handle.

use astral_core::{Callback, EventBus};
use serde_json::Value;

use super::store::StateChange;

/// Registers change callbacks for a single state slot.
///
/// Obtained from [`StateStore::get_state`](super::StateStore::get_state).
/// Cheap to clone; clones target the same slot and bus.
#[derive(Clone, Debug)]
pub struct StateListener {
    key: String,
    topic: String,
    bus: EventBus<StateChange>,
}

impl StateListener {
    pub(crate) fn new(key: &str, topic: String, bus: EventBus<StateChange>) -> Self {
        Self {
            key: key.to_owned(),
            topic,
            bus,
        }
    }

    /// Call `f(previous, new)` on every later update of this slot.
    ///
    /// Returns the bus registration; pass it to
    /// [`EventBus::unsubscribe`] with [`topic`](Self::topic) to detach.
    pub fn subscribe(&self, f: impl Fn(&Value, &Value) + 'static) -> Callback<StateChange> {
        let callback = Callback::new(move |change: &StateChange| f(&change.prev, &change.new));
        self.bus.subscribe(&self.topic, &callback);
        callback
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bus topic carrying this slot's changes.
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}
