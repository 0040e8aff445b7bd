#![forbid(unsafe_code)]

//! Astral public facade crate.
//!
//! One [`Astral`] value wires the three components together: a
//! [`StateStore`](astral_runtime::StateStore), a general purpose
//! [`EventBus`](astral_core::EventBus) for application topics, and (with the
//! `layout` feature) a [`LayoutEngine`](astral_layout::LayoutEngine).

pub mod prelude {
    pub use astral_core as core;
    #[cfg(feature = "layout")]
    pub use astral_layout as layout;
    pub use astral_runtime as runtime;
    #[cfg(feature = "web")]
    pub use astral_web as web;

    pub use astral_core::{Callback, EventBus};
    #[cfg(feature = "layout")]
    pub use astral_layout::{
        Breakpoint, Condition, Environment, HeadlessEnvironment, LayoutEngine, LayoutError,
        Orientation, Rule, RuleHandle, WindowSize,
    };
    pub use astral_runtime::{StateChange, StateStore};

    pub use crate::Astral;
}

use astral_core::EventBus;
use astral_runtime::StateStore;
use serde_json::Value;

#[cfg(feature = "layout")]
use astral_layout::{Environment, LayoutEngine};

/// Application-wide handles, constructed explicitly and passed by reference.
///
/// `E` is the layout environment.
///
/// Each component publishes on its own bus, typed by its payload:
/// `event` carries application `Value`s, `context.bus()` carries
/// [`StateChange`](astral_runtime::StateChange)s and `layout.bus()` carries
/// [`LayoutEvent`](astral_layout::LayoutEvent)s. State and layout topics are
/// therefore neither visible nor clearable through `event`.
#[cfg(feature = "layout")]
pub struct Astral<E> {
    pub event: EventBus<Value>,
    pub context: StateStore,
    pub layout: LayoutEngine<E>,
}

#[cfg(feature = "layout")]
impl<E: Environment + 'static> Astral<E> {
    #[must_use]
    pub fn new(env: E) -> Self {
        Self {
            event: EventBus::new(),
            context: StateStore::new(),
            layout: LayoutEngine::new(env),
        }
    }

    /// Toggle debug output on every component.
    pub fn set_debug_mode(&self, enabled: bool) {
        self.event.set_debug_mode(enabled);
        self.context.set_debug_mode(enabled);
        self.layout.set_debug_mode(enabled);
    }
}

/// Application-wide handles, constructed explicitly and passed by reference.
#[cfg(not(feature = "layout"))]
pub struct Astral {
    pub event: EventBus<Value>,
    pub context: StateStore,
}

#[cfg(not(feature = "layout"))]
impl Astral {
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: EventBus::new(),
            context: StateStore::new(),
        }
    }

    pub fn set_debug_mode(&self, enabled: bool) {
        self.event.set_debug_mode(enabled);
        self.context.set_debug_mode(enabled);
    }
}

#[cfg(not(feature = "layout"))]
impl Default for Astral {
    fn default() -> Self {
        Self::new()
    }
}
