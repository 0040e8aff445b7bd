#![forbid(unsafe_code)]

//! Core: the topic-keyed event bus and the per-component diagnostic sink.

pub mod diagnostics;
pub mod event;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use diagnostics::DebugLog;
pub use event::{Callback, EventBus};
