//! Run configuration.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Outer bounds of the event timeline, in days relative to the window end.
///
/// The inner boundary between pre-event and event window is per event
/// (`-tau`), so it is not configured here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// First day of the pre-event sub-period (default: -360)
    pub pre_event_start: i64,
    /// Last day of the post-event sub-period (default: 180)
    pub post_event_end: i64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            pre_event_start: -360,
            post_event_end: 180,
        }
    }
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventStudyConfig {
    /// Sub-period window bounds
    pub windows: WindowConfig,
    /// Percentiles reported in the reporting-lag table
    pub percentiles: Vec<f64>,
}

impl Default for EventStudyConfig {
    fn default() -> Self {
        Self {
            windows: WindowConfig::default(),
            percentiles: vec![0.10, 0.25, 0.50, 0.75, 0.90],
        }
    }
}

impl EventStudyConfig {
    /// Load a configuration from a JSON file.
    ///
    /// Fields absent from the file keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_windows() {
        let config = EventStudyConfig::default();
        assert_eq!(config.windows.pre_event_start, -360);
        assert_eq!(config.windows.post_event_end, 180);
        assert_eq!(config.percentiles.len(), 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: EventStudyConfig =
            serde_json::from_str(r#"{"windows": {"pre_event_start": -250, "post_event_end": 60}}"#)
                .unwrap();
        assert_eq!(config.windows.pre_event_start, -250);
        assert_eq!(config.windows.post_event_end, 60);
        assert_eq!(config.percentiles, EventStudyConfig::default().percentiles);
    }
}
