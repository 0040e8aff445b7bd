#![forbid(unsafe_code)]

//! Layout configuration document.
//!
//! ```json
//! {
//!   "breakpoints": {
//!     "Large": { "minWidth": 1280, "maxWidth": 1920, "minHeight": 646 },
//!     "Other": { "minWidth": 0, "maxWidth": "Infinity", "minHeight": 0 }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointTable;
use crate::error::{LayoutError, Result};

/// Configuration accepted by [`LayoutEngine::configure`](crate::LayoutEngine::configure).
///
/// `breakpoints` is optional only so that a document lacking it can be parsed
/// and then rejected with [`LayoutError::InvalidConfiguration`]. An empty but
/// present table is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default)]
    pub breakpoints: Option<BreakpointTable>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::new(BreakpointTable::standard())
    }
}

impl LayoutConfig {
    #[must_use]
    pub fn new(breakpoints: BreakpointTable) -> Self {
        Self {
            breakpoints: Some(breakpoints),
        }
    }

    /// Parse a JSON document. `null` and malformed input are configuration
    /// errors; a missing `breakpoints` field is left for `configure` to reject.
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed: Option<Self> =
            serde_json::from_str(text).map_err(|err| LayoutError::invalid(err.to_string()))?;
        parsed.ok_or_else(|| LayoutError::invalid("configuration is missing"))
    }

    /// The breakpoint table, or the error `configure` raises without one.
    pub fn into_table(self) -> Result<BreakpointTable> {
        self.breakpoints
            .ok_or_else(|| LayoutError::invalid("configuration has no breakpoints"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_standard_table() {
        let table = LayoutConfig::default().into_table().unwrap();
        assert_eq!(table, BreakpointTable::standard());
    }

    #[test]
    fn parses_breakpoints_in_order() {
        let config = LayoutConfig::from_json(
            r#"{"breakpoints": {
                "Large": {"minWidth": 1280, "maxWidth": 1920, "minHeight": 646},
                "Other": {"minWidth": 0, "maxWidth": "Infinity", "minHeight": 0}
            }}"#,
        )
        .unwrap();
        let table = config.into_table().unwrap();
        let labels: Vec<&str> = table.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Large", "Other"]);
    }

    #[test]
    fn null_document_is_invalid() {
        let err = LayoutConfig::from_json("null").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration { .. }));
    }

    #[test]
    fn malformed_document_is_invalid() {
        let err = LayoutConfig::from_json("{\"breakpoints\": [").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfiguration { .. }));
    }

    #[test]
    fn incomplete_entry_is_invalid() {
        let err = LayoutConfig::from_json(
            r#"{"breakpoints": {"Large": {"minWidth": 1280, "maxWidth": 1920}}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("minHeight"), "{err}");
    }

    #[test]
    fn missing_breakpoints_rejected_on_use() {
        let config = LayoutConfig::from_json("{}").unwrap();
        assert_eq!(config.breakpoints, None);
        assert!(matches!(
            config.into_table(),
            Err(LayoutError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn empty_table_is_accepted() {
        let table = LayoutConfig::from_json(r#"{"breakpoints": {}}"#)
            .and_then(LayoutConfig::into_table)
            .unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn serializes_back_to_json() {
        let text = serde_json::to_string(&LayoutConfig::default()).unwrap();
        let back = LayoutConfig::from_json(&text).unwrap();
        assert_eq!(back, LayoutConfig::default());
    }
}
