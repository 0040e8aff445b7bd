#![forbid(unsafe_code)]

//! Host environment abstraction: viewport size and orientation sources.
//!
//! The browser implementation lives in `astral-web`. [`HeadlessEnvironment`]
//! is a deterministic, host-driven stand-in for native hosts and tests.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::breakpoint::WindowSize;
use crate::error::{LayoutError, Result};

/// Media query used as the orientation fallback.
pub const PORTRAIT_QUERY: &str = "(orientation: portrait)";

/// Viewport orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the layout engine needs from its host.
///
/// Every method reads the live state; implementations must not cache.
pub trait Environment {
    /// Current viewport size.
    fn window_size(&self) -> WindowSize;

    /// Native screen-orientation type string (e.g. `"landscape-primary"`),
    /// or `None` if the host has no such indicator.
    fn screen_orientation_type(&self) -> Option<String>;

    /// Result of matching [`PORTRAIT_QUERY`], or `None` if media queries are
    /// unavailable.
    fn matches_portrait_query(&self) -> Option<bool>;
}

impl<E: Environment + ?Sized> Environment for Rc<E> {
    fn window_size(&self) -> WindowSize {
        (**self).window_size()
    }

    fn screen_orientation_type(&self) -> Option<String> {
        (**self).screen_orientation_type()
    }

    fn matches_portrait_query(&self) -> Option<bool> {
        (**self).matches_portrait_query()
    }
}

/// Resolve orientation from `env`.
///
/// The native indicator wins when present: its type string must mention
/// `portrait` or `landscape`, otherwise resolution fails. Without it, the
/// portrait media query decides. With neither, resolution fails.
pub fn resolve_orientation<E: Environment + ?Sized>(env: &E) -> Result<Orientation> {
    if let Some(kind) = env.screen_orientation_type() {
        if kind.contains("portrait") {
            return Ok(Orientation::Portrait);
        }
        if kind.contains("landscape") {
            return Ok(Orientation::Landscape);
        }
        return Err(LayoutError::OrientationUnavailable);
    }
    match env.matches_portrait_query() {
        Some(true) => Ok(Orientation::Portrait),
        Some(false) => Ok(Orientation::Landscape),
        None => Err(LayoutError::OrientationUnavailable),
    }
}

#[derive(Debug, Clone, Default)]
struct HeadlessState {
    size: WindowSize,
    orientation_type: Option<String>,
    portrait_query: Option<bool>,
}

/// Host-driven environment with settable size and orientation sources.
///
/// Cloning creates a new handle to the **same** state, so a host can keep one
/// handle and give another to a [`LayoutEngine`](crate::LayoutEngine).
/// Both orientation sources start unavailable.
#[derive(Debug, Clone, Default)]
pub struct HeadlessEnvironment {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessEnvironment {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        let env = Self::default();
        env.set_window_size(width, height);
        env
    }

    /// Builder form of [`set_orientation_type`](Self::set_orientation_type).
    #[must_use]
    pub fn with_orientation_type(self, kind: &str) -> Self {
        self.set_orientation_type(Some(kind));
        self
    }

    /// Builder form of [`set_portrait_query`](Self::set_portrait_query).
    #[must_use]
    pub fn with_portrait_query(self, matches: bool) -> Self {
        self.set_portrait_query(Some(matches));
        self
    }

    pub fn set_window_size(&self, width: f64, height: f64) {
        self.state.borrow_mut().size = WindowSize::new(width, height);
    }

    pub fn set_orientation_type(&self, kind: Option<&str>) {
        self.state.borrow_mut().orientation_type = kind.map(str::to_owned);
    }

    pub fn set_portrait_query(&self, matches: Option<bool>) {
        self.state.borrow_mut().portrait_query = matches;
    }
}

impl Environment for HeadlessEnvironment {
    fn window_size(&self) -> WindowSize {
        self.state.borrow().size
    }

    fn screen_orientation_type(&self) -> Option<String> {
        self.state.borrow().orientation_type.clone()
    }

    fn matches_portrait_query(&self) -> Option<bool> {
        self.state.borrow().portrait_query
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_type_string_decides() {
        let env = HeadlessEnvironment::new(1920.0, 1080.0).with_orientation_type("landscape-primary");
        assert_eq!(resolve_orientation(&env), Ok(Orientation::Landscape));

        env.set_orientation_type(Some("portrait-secondary"));
        assert_eq!(resolve_orientation(&env), Ok(Orientation::Portrait));
    }

    #[test]
    fn native_type_wins_over_media_query() {
        let env = HeadlessEnvironment::new(1.0, 1.0)
            .with_orientation_type("landscape-primary")
            .with_portrait_query(true);
        assert_eq!(resolve_orientation(&env), Ok(Orientation::Landscape));
    }

    #[test]
    fn media_query_fallback() {
        let env = HeadlessEnvironment::new(1.0, 1.0).with_portrait_query(false);
        assert_eq!(resolve_orientation(&env), Ok(Orientation::Landscape));

        env.set_portrait_query(Some(true));
        assert_eq!(resolve_orientation(&env), Ok(Orientation::Portrait));
    }

    #[test]
    fn no_source_is_an_error() {
        let env = HeadlessEnvironment::new(1.0, 1.0);
        assert_eq!(
            resolve_orientation(&env),
            Err(LayoutError::OrientationUnavailable)
        );
    }

    #[test]
    fn unrecognized_type_string_is_an_error() {
        let env = HeadlessEnvironment::new(1.0, 1.0)
            .with_orientation_type("sideways")
            .with_portrait_query(true);
        assert_eq!(
            resolve_orientation(&env),
            Err(LayoutError::OrientationUnavailable)
        );
    }

    #[test]
    fn clones_share_state() {
        let host = HeadlessEnvironment::new(800.0, 600.0);
        let engine_side = host.clone();
        host.set_window_size(1280.0, 900.0);
        assert_eq!(engine_side.window_size(), WindowSize::new(1280.0, 900.0));
    }

    #[test]
    fn orientation_display() {
        assert_eq!(Orientation::Portrait.to_string(), "portrait");
        assert_eq!(
            serde_json::to_string(&Orientation::Landscape).unwrap(),
            "\"landscape\""
        );
    }
}
