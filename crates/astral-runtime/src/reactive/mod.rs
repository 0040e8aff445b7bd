#![forbid(unsafe_code)]

//! Reactive state slots.
//!
//! - [`StateStore`]: a shared map of named JSON values. Every write publishes
//!   a [`StateChange`] on the slot's own bus topic.
//! - [`StateListener`]: handed out by [`StateStore::get_state`]; registers
//!   `(previous, new)` callbacks for one slot.
//!
//! # Architecture
//!
//! `StateStore` uses `Rc<RefCell<..>>` for single-threaded shared ownership,
//! like the bus it publishes on. The store never holds a borrow of its slot
//! map while publishing, so change callbacks may read or write the store.
//!
//! # Invariants
//!
//! 1. At most one slot exists per key.
//! 2. A slot is created lazily on first read or write, holding `null`.
//!    Creation itself publishes nothing.
//! 3. Every `update_state` publishes exactly one change, even when the new
//!    value equals the old one.
//! 4. Change callbacks run in registration order before `update_state`
//!    returns. Registration is not retroactive.

pub mod listener;
pub mod store;

pub use listener::StateListener;
pub use store::{StateChange, StateStore, state_topic};
