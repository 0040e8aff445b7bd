#![forbid(unsafe_code)]

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors raised by layout configuration, lookup and rule evaluation.
///
/// All variants are raised synchronously at the call site and leave the
/// engine's state untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("no breakpoint found for label: {label}")]
    NoBreakpointForLabel { label: String },

    #[error("no breakpoint found for screen size: {width}x{height}")]
    NoBreakpointForSize { width: f64, height: f64 },

    #[error("no conditions or success callback provided")]
    MissingConditions,

    #[error("no orientation found")]
    OrientationUnavailable,
}

impl LayoutError {
    #[must_use]
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}
