#![forbid(unsafe_code)]

//! Browser bindings for `astral-layout`.
//!
//! [`BrowserEnvironment`] reads the viewport and orientation from the global
//! `window`, and [`attach`] forwards the browser's `resize` and orientation
//! `change` events to a [`LayoutEngine`](astral_layout::LayoutEngine).
//! Dropping the returned [`ListenerGuard`] removes every listener.
//!
//! The browser types only exist on `wasm32`; [`OrientationSignal`] and
//! [`WebError`] are available everywhere so hosts can share handling code.

mod error;
mod signal;

#[cfg(target_arch = "wasm32")]
mod browser;

pub use error::WebError;
pub use signal::OrientationSignal;

#[cfg(target_arch = "wasm32")]
pub use browser::{BrowserEnvironment, ListenerGuard, attach};
