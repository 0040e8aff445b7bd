#![forbid(unsafe_code)]

//! Named state slots backed by an event bus.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use astral_core::{DebugLog, EventBus};
use rustc_hash::FxHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::listener::StateListener;
use crate::error::{Result, StateError};

/// Component name used in debug output.
pub const COMPONENT: &str = "Astral.context";

/// Reserved prefix of per-slot change topics.
const TOPIC_PREFIX: &str = "astral.context.updated/";

/// Bus topic on which changes to slot `key` are published.
#[must_use]
pub fn state_topic(key: &str) -> String {
    format!("{TOPIC_PREFIX}{key}")
}

/// Payload published on a slot's topic for every update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateChange {
    pub prev: Value,
    pub new: Value,
}

/// Shared map of reactive state slots.
///
/// Cloning a `StateStore` creates a new handle to the **same** slots, bus and
/// debug flag.
#[derive(Clone)]
pub struct StateStore {
    slots: Rc<RefCell<FxHashMap<String, Value>>>,
    bus: EventBus<StateChange>,
    debug: Rc<DebugLog>,
}

impl fmt::Debug for StateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStore")
            .field("slots", &self.slots.borrow())
            .field("bus", &self.bus)
            .finish()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// Create a store publishing on its own private bus.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bus(EventBus::new())
    }

    /// Create a store publishing on `bus`, shared with other holders.
    #[must_use]
    pub fn with_bus(bus: EventBus<StateChange>) -> Self {
        Self {
            slots: Rc::new(RefCell::new(FxHashMap::default())),
            bus,
            debug: Rc::new(DebugLog::new(COMPONENT)),
        }
    }

    /// The bus change notifications go through.
    #[must_use]
    pub fn bus(&self) -> &EventBus<StateChange> {
        &self.bus
    }

    /// Current value of `key` plus a listener for its future changes.
    ///
    /// An unseen key is created holding `null`.
    pub fn get_state(&self, key: &str) -> (Value, StateListener) {
        let value = self.with_slot(key, |slot| slot.clone());
        let listener = StateListener::new(key, state_topic(key), self.bus.clone());
        (value, listener)
    }

    /// Decode the current value of `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let value = self.with_slot(key, |slot| slot.clone());
        serde_json::from_value(value).map_err(|source| StateError::Decode {
            key: key.to_owned(),
            source,
        })
    }

    /// Set `key` to `value` and notify its listeners with `(previous, value)`.
    pub fn update_state(&self, key: &str, value: impl Into<Value>) {
        let value = value.into();
        let prev = self.with_slot(key, |slot| std::mem::replace(slot, value.clone()));
        self.debug
            .log(|| format!("State: {key}\nValue: {value}\nAction: Updated"));
        self.bus
            .publish(&state_topic(key), &StateChange { prev, new: value });
    }

    /// Apply each `(key, value)` pair as an independent update, in iteration
    /// order. A `serde_json::Map` can be passed directly.
    pub fn update_many<I, K, V>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (key, value) in entries {
            self.update_state(key.as_ref(), value);
        }
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    /// Run `f` on the slot for `key`, creating it first if needed. The slot
    /// map borrow ends before this returns.
    fn with_slot<R>(&self, key: &str, f: impl FnOnce(&mut Value) -> R) -> R {
        let mut slots = self.slots.borrow_mut();
        let slot = slots.entry(key.to_owned()).or_insert_with(|| {
            self.debug
                .log(|| format!("State: {key}\nValue: null\nAction: Initialized"));
            Value::Null
        });
        f(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_core::testing::capture_logs;
    use serde_json::json;
    use std::cell::{Cell, RefCell};

    #[test]
    fn fresh_key_is_null() {
        let store = StateStore::new();
        let (value, _) = store.get_state("myState");
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn update_then_get_reflects_value() {
        let store = StateStore::new();
        store.update_state("myState", "myValue");
        let (value, _) = store.get_state("myState");
        assert_eq!(value, json!("myValue"));
    }

    #[test]
    fn onchange_sees_previous_and_new_once() {
        let store = StateStore::new();
        store.update_state("k", "oldValue");

        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        let (_, listener) = store.get_state("k");
        listener.subscribe(move |prev, new| sink.borrow_mut().push((prev.clone(), new.clone())));

        store.update_state("k", "newValue");
        assert_eq!(
            *calls.borrow(),
            vec![(json!("oldValue"), json!("newValue"))]
        );
    }

    #[test]
    fn lazy_initialization_is_silent() {
        let store = StateStore::new();
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let cb = astral_core::Callback::new(move |_: &StateChange| sink.set(sink.get() + 1));
        store.bus().subscribe(&state_topic("fresh"), &cb);

        let _ = store.get_state("fresh");
        assert_eq!(hits.get(), 0);

        store.update_state("fresh", 1);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn first_update_of_unseen_key_reports_null_previous() {
        let store = StateStore::new();
        let change = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&change);
        let cb = astral_core::Callback::new(move |c: &StateChange| {
            *sink.borrow_mut() = Some(c.clone());
        });
        store.bus().subscribe(&state_topic("new"), &cb);

        store.update_state("new", true);
        assert_eq!(
            *change.borrow(),
            Some(StateChange {
                prev: Value::Null,
                new: json!(true)
            })
        );
    }

    #[test]
    fn equal_value_still_notifies() {
        let store = StateStore::new();
        store.update_state("k", 1);
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        store.get_state("k").1.subscribe(move |_, _| sink.set(sink.get() + 1));

        store.update_state("k", 1);
        store.update_state("k", 1);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn batched_update_sets_every_key() {
        let store = StateStore::new();
        store.update_many([("a", 1), ("b", 2)]);
        assert_eq!(store.get_state("a").0, json!(1));
        assert_eq!(store.get_state("b").0, json!(2));
    }

    #[test]
    fn batched_update_from_json_object_keeps_document_order() {
        let store = StateStore::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for key in ["zeta", "alpha", "mid"] {
            let sink = Rc::clone(&order);
            store
                .get_state(key)
                .1
                .subscribe(move |_, _| sink.borrow_mut().push(key));
        }

        let map: serde_json::Map<String, Value> =
            serde_json::from_str(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();
        store.update_many(map);

        assert_eq!(*order.borrow(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(store.get_state("alpha").0, json!(2));
    }

    #[test]
    fn listener_may_write_store_reentrantly() {
        let store = StateStore::new();
        let mirror = store.clone();
        store
            .get_state("source")
            .1
            .subscribe(move |_, new| mirror.update_state("mirror", new.clone()));

        store.update_state("source", "ping");
        assert_eq!(store.get_state("mirror").0, json!("ping"));
    }

    #[test]
    fn shared_bus_reaches_external_subscribers() {
        let bus = EventBus::new();
        let store = StateStore::with_bus(bus.clone());
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let cb = astral_core::Callback::new(move |_: &StateChange| sink.set(sink.get() + 1));
        bus.subscribe(&state_topic("k"), &cb);

        store.update_state("k", "v");
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn get_as_decodes_typed_values() {
        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct Viewport {
            width: u32,
            height: u32,
        }

        let store = StateStore::new();
        store.update_state("viewport", json!({"width": 1280, "height": 900}));
        let viewport: Viewport = store.get_as("viewport").unwrap();
        assert_eq!(
            viewport,
            Viewport {
                width: 1280,
                height: 900
            }
        );

        let err = store.get_as::<u32>("viewport").unwrap_err();
        assert!(err.to_string().contains("viewport"));
    }

    #[test]
    fn get_as_on_fresh_key_reads_null() {
        let store = StateStore::new();
        let value: Option<String> = store.get_as("missing").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn debug_output_only_when_enabled() {
        let quiet = capture_logs(|| {
            let store = StateStore::new();
            store.update_state("myState", "myValue");
        });
        assert!(!quiet.contains("Astral.context"), "{quiet}");

        let loud = capture_logs(|| {
            let store = StateStore::new();
            store.set_debug_mode(true);
            store.update_state("myState", "myValue");
        });
        assert!(loud.contains("Astral.context $: State: myState"), "{loud}");
        assert!(loud.contains("Action: Updated"));
    }
}
