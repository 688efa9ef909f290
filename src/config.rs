//! Tunable settings for the cubelet viewer.
//!
//! Every constant that shapes the grid, the camera, input response or the
//! shuffle lives here so it can be overridden from a JSON file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};
use crate::slice::TurnMode;

/// Viewer settings. Missing JSON fields fall back to [`CubeSettings::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct CubeSettings {
    /// Edge length of a single cubelet.
    pub(crate) cubelet_size: f32,
    /// Gap between neighbouring cubelets.
    pub(crate) spacing: f32,
    /// Initial camera distance along +z.
    pub(crate) camera_distance: f32,
    /// Vertical field of view in degrees.
    pub(crate) fov_degrees: f32,
    pub(crate) znear: f32,
    pub(crate) zfar: f32,
    /// Distance the camera moves per zoom key press.
    pub(crate) zoom_step: f32,
    pub(crate) min_distance: f32,
    pub(crate) max_distance: f32,
    /// Degrees of whole-grid rotation per dragged pixel.
    pub(crate) drag_sensitivity: f32,
    /// Delay between two shuffle moves, in milliseconds.
    pub(crate) shuffle_delay_ms: u64,
    pub(crate) shuffle_min_moves: u32,
    pub(crate) shuffle_max_moves: u32,
    /// Length of the intro drop animation, in milliseconds.
    pub(crate) intro_ms: u64,
    /// How far below the origin the grid starts before the intro animation.
    pub(crate) intro_drop: f32,
    pub(crate) turn_mode: TurnMode,
}

impl Default for CubeSettings {
    fn default() -> Self {
        Self {
            cubelet_size: 1.0,
            spacing: 0.1,
            camera_distance: 20.0,
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
            zoom_step: 1.0,
            min_distance: 2.0,
            max_distance: 100.0,
            drag_sensitivity: 1.0,
            shuffle_delay_ms: 100,
            shuffle_min_moves: 10,
            shuffle_max_moves: 29,
            intro_ms: 1000,
            intro_drop: 10.0,
            turn_mode: TurnMode::InPlace,
        }
    }
}

impl CubeSettings {
    /// Load settings from a JSON file and validate them.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would break the grid layout or the camera.
    pub(crate) fn validate(&self) -> Result<()> {
        if !(self.cubelet_size > 0.0) {
            return Err(CubeError::InvalidSettings(format!(
                "cubelet_size must be positive, got {}",
                self.cubelet_size
            )));
        }
        if self.spacing < 0.0 {
            return Err(CubeError::InvalidSettings(format!(
                "spacing must not be negative, got {}",
                self.spacing
            )));
        }
        if !(self.znear > 0.0 && self.zfar > self.znear) {
            return Err(CubeError::InvalidSettings(format!(
                "clip planes must satisfy 0 < znear < zfar, got {} and {}",
                self.znear, self.zfar
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(CubeError::InvalidSettings(format!(
                "fov_degrees must be within (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if !(self.min_distance > 0.0) {
            return Err(CubeError::InvalidSettings(format!(
                "min_distance must be positive, got {}",
                self.min_distance
            )));
        }
        if self.min_distance > self.max_distance {
            return Err(CubeError::InvalidSettings(format!(
                "min_distance {} exceeds max_distance {}",
                self.min_distance, self.max_distance
            )));
        }
        if self.shuffle_min_moves == 0 || self.shuffle_min_moves > self.shuffle_max_moves {
            return Err(CubeError::InvalidSettings(format!(
                "shuffle move range {}..={} is empty",
                self.shuffle_min_moves, self.shuffle_max_moves
            )));
        }
        Ok(())
    }

    /// Distance between the centres of two neighbouring cubelets.
    pub(crate) fn pitch(&self) -> f32 {
        self.cubelet_size + self.spacing
    }

    pub(crate) fn shuffle_delay(&self) -> Duration {
        Duration::from_millis(self.shuffle_delay_ms)
    }

    pub(crate) fn intro_duration(&self) -> Duration {
        Duration::from_millis(self.intro_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = CubeSettings::default();
        assert!(settings.validate().is_ok());
        assert!((settings.pitch() - 1.1).abs() < 1e-6);
        assert_eq!(settings.shuffle_delay(), Duration::from_millis(100));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: CubeSettings =
            serde_json::from_str(r#"{ "spacing": 0.25, "turn_mode": "orbit" }"#).unwrap();
        assert_eq!(settings.spacing, 0.25);
        assert_eq!(settings.turn_mode, TurnMode::Orbit);
        assert_eq!(settings.cubelet_size, 1.0);
        assert_eq!(settings.shuffle_max_moves, 29);
    }

    #[test]
    fn rejects_empty_shuffle_range() {
        let settings = CubeSettings {
            shuffle_min_moves: 30,
            ..CubeSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CubeError::InvalidSettings(_))
        ));
    }

    #[test]
    fn rejects_non_positive_size() {
        let settings = CubeSettings {
            cubelet_size: 0.0,
            ..CubeSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn rejects_zoom_onto_target() {
        let settings = CubeSettings {
            min_distance: 0.0,
            ..CubeSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(CubeError::InvalidSettings(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let result = CubeSettings::load("/nonexistent/cubelet-settings.json");
        assert!(matches!(result, Err(CubeError::Io(_))));
    }

    #[test]
    fn load_reads_and_validates_file() {
        let path = std::env::temp_dir().join(format!(
            "cubelet-settings-{}.json",
            std::process::id()
        ));
        std::fs::write(&path, r#"{ "zoom_step": 2.5 }"#).unwrap();
        let settings = CubeSettings::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(settings.zoom_step, 2.5);
    }
}
