#![forbid(unsafe_code)]

use thiserror::Error;

/// Failures while binding to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebError {
    #[error("no global window object")]
    NoWindow,

    /// A DOM call threw; `message` is the stringified JS value.
    #[error("{operation} failed: {message}")]
    Js {
        operation: &'static str,
        message: String,
    },
}
