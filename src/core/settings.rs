// Settings ///////////////////////////////////////////////////////////////////
// This module contains all the tunable settings for the editor. Every field
// has a default, so a settings file only needs the values it changes.

use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::errors::{ZoneContext, ZoneResult};

// Snap to Grid ///////////////////////////////////////////////////////////////

/// The size of the grid to snap to, in world units
pub const SNAP_TO_GRID_VALUE: f64 = 10.0;

// History ////////////////////////////////////////////////////////////////////

/// Quiet period before a burst of freeform edits becomes one history entry
pub const HISTORY_DEBOUNCE_MS: u64 = 500;
/// Oldest snapshots are dropped beyond this many
pub const HISTORY_LIMIT: usize = 256;
/// Clicks arriving this soon after a drag ends belong to the drag
pub const DRAG_CLICK_GRACE_MS: u64 = 300;

// Zones //////////////////////////////////////////////////////////////////////

/// Thickness for zones drawn by hand or from a template
pub const DEFAULT_THICKNESS: f64 = 150.0;
/// Thickness for imported zones that carry no thickness or minZ/maxZ
pub const IMPORT_DEFAULT_THICKNESS: f64 = 200.0;
/// Half-size of a freshly placed template
pub const DEFAULT_TEMPLATE_SIZE: f64 = 50.0;

// Widgets ////////////////////////////////////////////////////////////////////

pub const NOTIFICATION_MS: u64 = 3000;
pub const STEPPER_HOLD_DELAY_MS: u64 = 400;
pub const STEPPER_REPEAT_MS: u64 = 50;

/// Runtime settings for an editing session
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub grid_size: f64,
    pub snap_to_grid: bool,
    pub show_distances: bool,
    pub history_debounce_ms: u64,
    pub history_limit: usize,
    pub drag_click_grace_ms: u64,
    pub default_thickness: f64,
    pub import_default_thickness: f64,
    pub default_template_size: f64,
    pub notification_ms: u64,
    pub stepper_hold_delay_ms: u64,
    pub stepper_repeat_ms: u64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid_size: SNAP_TO_GRID_VALUE,
            snap_to_grid: false,
            show_distances: false,
            history_debounce_ms: HISTORY_DEBOUNCE_MS,
            history_limit: HISTORY_LIMIT,
            drag_click_grace_ms: DRAG_CLICK_GRACE_MS,
            default_thickness: DEFAULT_THICKNESS,
            import_default_thickness: IMPORT_DEFAULT_THICKNESS,
            default_template_size: DEFAULT_TEMPLATE_SIZE,
            notification_ms: NOTIFICATION_MS,
            stepper_hold_delay_ms: STEPPER_HOLD_DELAY_MS,
            stepper_repeat_ms: STEPPER_REPEAT_MS,
        }
    }
}

impl EditorSettings {
    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> ZoneResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).with_file_context("read", path)?;
        let settings: EditorSettings =
            serde_json::from_str(&contents).with_file_context("parse settings", path)?;
        debug!("Loaded editor settings from {}", path.display());
        Ok(settings)
    }

    pub fn history_debounce(&self) -> Duration {
        Duration::from_millis(self.history_debounce_ms)
    }

    pub fn drag_click_grace(&self) -> Duration {
        Duration::from_millis(self.drag_click_grace_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }

    pub fn stepper_hold_delay(&self) -> Duration {
        Duration::from_millis(self.stepper_hold_delay_ms)
    }

    pub fn stepper_repeat(&self) -> Duration {
        Duration::from_millis(self.stepper_repeat_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_settings_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "grid_size": 25.0, "snap_to_grid": true }}"#).expect("write");

        let settings = EditorSettings::load(file.path()).expect("load settings");
        assert_eq!(settings.grid_size, 25.0);
        assert!(settings.snap_to_grid);
        assert_eq!(settings.history_debounce_ms, HISTORY_DEBOUNCE_MS);
    }

    #[test]
    fn test_invalid_settings_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "grid_size = 25").expect("write");
        let err = EditorSettings::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parse settings"));
    }
}
