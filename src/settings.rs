//! Persistent application settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::camera::CameraMode;
use crate::renderer::WaveMode;

/// Settings that persist between sessions: the widget-panel knobs plus
/// window and camera state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Scene knobs
    pub camera_mode: CameraMode,
    pub wave_mode: WaveMode,
    pub amplitude: f32,
    pub speed: f32,
    pub wave_length: f32,
    pub pixelate: bool,

    // Window
    pub window_width: f32,
    pub window_height: f32,

    // Orbit camera pose
    pub camera_distance: f32,
    pub camera_yaw: f32,
    pub camera_pitch: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_mode: CameraMode::World,
            wave_mode: WaveMode::Sine,
            amplitude: 3.0,
            speed: 1.0,
            wave_length: 10.0,
            pixelate: false,
            window_width: 1280.0,
            window_height: 720.0,
            camera_distance: crate::camera::WORLD_DISTANCE,
            camera_yaw: 35.0,
            camera_pitch: -25.0,
        }
    }
}

impl Settings {
    fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("trackview");
            std::fs::create_dir_all(&p).ok();
            p.push("settings.json");
            p
        })
    }

    /// Load settings, falling back to defaults on any problem.
    pub fn load() -> Self {
        let mut settings: Self = Self::path()
            .and_then(|p| std::fs::read_to_string(&p).ok())
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        settings.clamp_knobs();
        settings
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            if let Ok(json) = serde_json::to_string_pretty(self) {
                let _ = std::fs::write(path, json);
            }
        }
    }

    /// Keep knob values inside the panel's slider ranges; a hand-edited or
    /// stale settings file must not push NaN or huge values into shaders.
    fn clamp_knobs(&mut self) {
        let d = Settings::default();
        if !self.amplitude.is_finite() {
            self.amplitude = d.amplitude;
        }
        if !self.speed.is_finite() {
            self.speed = d.speed;
        }
        if !self.wave_length.is_finite() {
            self.wave_length = d.wave_length;
        }
        self.amplitude = self.amplitude.clamp(0.0, 10.0);
        self.speed = self.speed.clamp(0.0, 5.0);
        self.wave_length = self.wave_length.clamp(1.0, 50.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_in_range() {
        let mut s = Settings::default();
        let before = s.clone();
        s.clamp_knobs();
        assert_eq!(s.amplitude, before.amplitude);
        assert_eq!(s.wave_length, before.wave_length);
    }

    #[test]
    fn test_clamp_rejects_nan_and_out_of_range() {
        let mut s = Settings::default();
        s.amplitude = f32::NAN;
        s.speed = 100.0;
        s.wave_length = 0.0;
        s.clamp_knobs();
        assert_eq!(s.amplitude, Settings::default().amplitude);
        assert_eq!(s.speed, 5.0);
        assert_eq!(s.wave_length, 1.0);
    }

    #[test]
    fn test_roundtrip_through_json() {
        let s = Settings::default();
        let json = serde_json::to_string(&s).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back.camera_mode, s.camera_mode);
        assert_eq!(back.wave_mode, s.wave_mode);
        assert_eq!(back.amplitude, s.amplitude);
    }
}
