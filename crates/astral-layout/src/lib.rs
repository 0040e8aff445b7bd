#![forbid(unsafe_code)]

//! Responsive layout helpers for Astral.
//!
//! - [`BreakpointTable`]: ordered, labelled viewport ranges with first-match
//!   classification.
//! - [`Condition`] / [`Rule`]: breakpoint comparisons and predicates combined
//!   under all-required or any-required semantics.
//! - [`LayoutEngine`]: holds the active table, answers classification and
//!   orientation queries against an [`Environment`], and re-evaluates rules
//!   whenever the host reports a resize or orientation change.

pub mod breakpoint;
pub mod condition;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;

pub use breakpoint::{Breakpoint, BreakpointLabels, BreakpointTable, WindowSize};
pub use condition::{Comparator, Condition, Rule};
pub use config::LayoutConfig;
pub use engine::{LayoutEngine, LayoutEvent, ORIENTATION_TOPIC, RESIZE_TOPIC, RuleHandle};
pub use environment::{Environment, HeadlessEnvironment, Orientation, resolve_orientation};
pub use error::{LayoutError, Result};
