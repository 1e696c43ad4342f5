//! Lab settings and preferences
//!
//! Persisted in LocalStorage on the web; native builds use defaults.

use serde::{Deserialize, Serialize};

use crate::clamp_beam_speed;
use crate::consts::TRAIL_LENGTH;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    /// Next preset for the cycling quality button
    pub fn next(&self) -> Self {
        match self {
            QualityPreset::Low => QualityPreset::Medium,
            QualityPreset::Medium => QualityPreset::High,
            QualityPreset::High => QualityPreset::Low,
        }
    }

    /// Trail points drawn per particle
    pub fn trail_points(&self) -> usize {
        match self {
            QualityPreset::Low => 4,
            QualityPreset::Medium => 8,
            QualityPreset::High => TRAIL_LENGTH,
        }
    }

    /// Whether to render the starfield and foil sparkles
    pub fn starfield_enabled(&self) -> bool {
        match self {
            QualityPreset::Low => false,
            QualityPreset::Medium => true,
            QualityPreset::High => true,
        }
    }
}

/// Lab settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Beam ===
    /// Beam velocity multiplier (0.5 - 3.0)
    pub beam_speed: f32,

    // === Overlays ===
    /// Faint electron cloud around each nucleus
    pub show_cloud: bool,
    /// Analysis panel and floating outcome labels
    pub show_data_log: bool,

    /// Pause the lab when the tab is hidden
    pub auto_pause: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            beam_speed: 1.0,
            show_cloud: true,
            show_data_log: true,
            auto_pause: true,
        }
    }
}

impl Settings {
    /// Set the beam speed, clamped and snapped to the slider range
    pub fn set_beam_speed(&mut self, speed: f32) {
        self.beam_speed = clamp_beam_speed(speed);
    }

    /// Trail points to draw per particle
    pub fn trail_points(&self) -> usize {
        self.quality.trail_points()
    }

    /// Parse settings JSON, falling back to defaults for anything malformed
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str::<Settings>(json) {
            Ok(mut settings) => {
                settings.beam_speed = clamp_beam_speed(settings.beam_speed);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring stored settings: {}", e);
                Self::default()
            }
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "edusphere_lab_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded settings from LocalStorage");
                return Self::from_json(&json);
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => {
                    if storage.set_item(Self::STORAGE_KEY, &json).is_err() {
                        log::warn!("Could not write settings to LocalStorage");
                    }
                }
                Err(e) => log::warn!("Could not serialize settings: {}", e),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_lab() {
        let s = Settings::default();
        assert_eq!(s.beam_speed, 1.0);
        assert!(s.show_cloud);
        assert!(s.show_data_log);
        assert_eq!(s.quality, QualityPreset::Medium);
    }

    #[test]
    fn test_json_roundtrip_and_partial() {
        let mut s = Settings {
            quality: QualityPreset::High,
            ..Default::default()
        };
        s.set_beam_speed(2.3);
        s.show_cloud = false;
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(Settings::from_json(&json), s);

        // Missing fields fall back to defaults, out of range speed is clamped
        let partial = Settings::from_json(r#"{"beam_speed": 9.0}"#);
        assert_eq!(partial.beam_speed, 3.0);
        assert!(partial.show_data_log);

        assert_eq!(Settings::from_json("not json"), Settings::default());
    }

    #[test]
    fn test_quality_cycle() {
        let mut q = QualityPreset::Low;
        let mut seen = Vec::new();
        for _ in 0..3 {
            seen.push(q.as_str());
            q = q.next();
        }
        assert_eq!(seen, ["Low", "Medium", "High"]);
        assert_eq!(q, QualityPreset::Low);
        assert_eq!(QualityPreset::Low.trail_points(), 4);
        assert!(!QualityPreset::Low.starfield_enabled());
    }
}
