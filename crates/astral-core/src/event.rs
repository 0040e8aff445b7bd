#![forbid(unsafe_code)]

//! Topic-keyed publish/subscribe bus.
//!
//! [`EventBus<T>`] keeps an ordered subscriber list per topic string and fans
//! a published payload out to every subscriber of that topic, synchronously,
//! on the caller's stack.
//!
//! # Invariants
//!
//! 1. Subscribers of a topic are invoked in registration order.
//! 2. A [`Callback`] is registered at most once per topic; subscribing it
//!    again is a no-op.
//! 3. Publishing to a topic nobody subscribed to is a no-op.
//! 4. Topics are independent: no ordering holds between deliveries on
//!    different topics.
//!
//! # Failure Modes
//!
//! - **Panicking subscriber**: the panic unwinds out of [`EventBus::publish`].
//!   Subscribers after it in the list do not run for that publish.
//! - **Mutation during publish**: `publish` delivers to a snapshot of the list
//!   taken before the first callback runs. A callback may subscribe or
//!   unsubscribe on any topic; the change is visible from the next publish.
//!
//! # Example
//!
//! ```
//! use astral_core::event::{Callback, EventBus};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let bus = EventBus::<u32>::new();
//! let seen = Rc::new(Cell::new(0));
//! let sink = Rc::clone(&seen);
//! let cb = Callback::new(move |v: &u32| sink.set(sink.get() + v));
//!
//! bus.subscribe("tick", &cb);
//! bus.subscribe("tick", &cb); // idempotent
//! bus.publish("tick", &5);
//! assert_eq!(seen.get(), 5);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::diagnostics::DebugLog;

/// Component name used in debug output.
pub const COMPONENT: &str = "Astral.event";

/// A shareable subscriber closure with reference identity.
///
/// Cloning a `Callback` yields the *same* callback: clones compare equal and
/// the bus treats them as one registration. Wrapping the same closure body in
/// two `Callback::new` calls yields two distinct callbacks.
pub struct Callback<T> {
    inner: Rc<dyn Fn(&T)>,
}

impl<T: 'static> Callback<T> {
    pub fn new(f: impl Fn(&T) + 'static) -> Self {
        Self { inner: Rc::new(f) }
    }

    /// Invoke the wrapped closure.
    pub fn call(&self, data: &T) {
        (self.inner)(data);
    }

    /// Whether `self` and `other` are the same registration.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.inner), Rc::as_ptr(&other.inner))
    }
}

impl<T> Clone for Callback<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: 'static> PartialEq for Callback<T> {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl<T: 'static> Eq for Callback<T> {}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback")
            .field(&Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

type SubscriberMap<T> = FxHashMap<String, Vec<Callback<T>>>;

/// Shared handle to a set of topic subscriber lists.
///
/// Cloning an `EventBus` creates a new handle to the **same** lists and debug
/// flag, so one bus can be injected into several components.
pub struct EventBus<T> {
    topics: Rc<RefCell<SubscriberMap<T>>>,
    debug: Rc<DebugLog>,
}

impl<T> Clone for EventBus<T> {
    fn clone(&self) -> Self {
        Self {
            topics: Rc::clone(&self.topics),
            debug: Rc::clone(&self.debug),
        }
    }
}

impl<T> fmt::Debug for EventBus<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let topics = self.topics.borrow();
        let mut map = f.debug_map();
        for (topic, list) in topics.iter() {
            map.entry(topic, &list.len());
        }
        map.finish()
    }
}

impl<T: 'static> Default for EventBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> EventBus<T> {
    /// Create an empty bus with debug output off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            topics: Rc::new(RefCell::new(FxHashMap::default())),
            debug: Rc::new(DebugLog::new(COMPONENT)),
        }
    }

    /// Register `callback` for `topic`, creating the topic's list if needed.
    pub fn subscribe(&self, topic: &str, callback: &Callback<T>) {
        let mut topics = self.topics.borrow_mut();
        let list = topics.entry(topic.to_owned()).or_insert_with(|| {
            self.debug
                .log(|| format!("Event: {topic} subscribers list initialized"));
            Vec::new()
        });
        if list.iter().any(|existing| existing.same(callback)) {
            return;
        }
        list.push(callback.clone());
        self.debug.log(|| {
            format!("Event: {topic}\nCallback: {callback:?}\nAction: callback added (subscribed)")
        });
    }

    /// Deliver `data` to every subscriber of `topic`, in registration order.
    pub fn publish(&self, topic: &str, data: &T) {
        let snapshot = match self.topics.borrow().get(topic) {
            Some(list) => list.clone(),
            None => {
                self.debug
                    .log(|| format!("Event: {topic}\nAction: No subscribers found"));
                return;
            }
        };
        for callback in &snapshot {
            callback.call(data);
            self.debug.log(|| {
                format!("Event: {topic}\nCallback: {callback:?}\nAction: callback executed")
            });
        }
    }

    /// Remove `callback` from `topic`. Absent topic or callback is a no-op.
    pub fn unsubscribe(&self, topic: &str, callback: &Callback<T>) {
        let mut topics = self.topics.borrow_mut();
        let Some(list) = topics.get_mut(topic) else {
            self.debug
                .log(|| format!("Event: {topic}\nNo subscribers found to unsubscribe"));
            return;
        };
        list.retain(|existing| !existing.same(callback));
        self.debug.log(|| {
            format!("Event: {topic}\nCallback: {callback:?}\nAction: callback removed (unsubscribed)")
        });
    }

    /// Clear the subscriber list of `topic`, or of every topic when `None`.
    ///
    /// Naming a topic nobody subscribed to is a no-op.
    pub fn unsubscribe_all(&self, topic: Option<&str>) {
        let mut topics = self.topics.borrow_mut();
        match topic {
            Some(topic) => {
                if let Some(list) = topics.get_mut(topic) {
                    list.clear();
                }
                self.debug
                    .log(|| format!("Event: {topic}\nAction: All callbacks removed (unsubscribed)"));
            }
            None => {
                for list in topics.values_mut() {
                    list.clear();
                }
                self.debug.log(|| {
                    "Removed all subscriptions because no event name was given to unsubscribe_all"
                        .to_string()
                });
            }
        }
    }

    /// Number of callbacks currently registered for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.borrow().get(topic).map_or(0, Vec::len)
    }

    /// Every topic that has ever had a subscriber list, in no particular order.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.topics.borrow().keys().cloned().collect()
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.debug.set_enabled(enabled);
    }

    #[must_use]
    pub fn debug_mode(&self) -> bool {
        self.debug.is_enabled()
    }
}
