#![forbid(unsafe_code)]

//! Reactive state for Astral: named value slots whose changes are delivered
//! through an [`astral_core::EventBus`].

pub mod error;
pub mod reactive;

pub use error::{Result, StateError};
pub use reactive::{StateChange, StateListener, StateStore, state_topic};
