//! EduSphere - interactive alpha scattering lab
//!
//! Core modules:
//! - `sim`: Deterministic scattering simulation (spawning, motion, nucleus triggers, stats)
//! - `catalog`: Static grade/subject/topic catalogs
//! - `nav`: Screen navigation between pickers and the lab
//! - `renderer`: WebGPU scene rendering and orbit camera
//! - `settings`: Persisted lab preferences
//! - `ui`: View models for pickers, overlay and labels

pub mod catalog;
pub mod error;
pub mod nav;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod ui;

pub use error::LabError;
pub use nav::{Navigator, View};
pub use settings::{QualityPreset, Settings};

/// Lab configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one frame-unit per tick at speed 1)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame-units per second at beam speed 1
    pub const FRAME_RATE: f32 = 60.0;

    /// Live particle cap
    pub const MAX_PARTICLES: usize = 120;
    /// Spawn probability per frame at beam speed 1
    pub const SPAWN_CHANCE: f32 = 0.15;
    /// Fate rolls above this rebound
    pub const REBOUND_ROLL: f32 = 0.96;
    /// Fate rolls above this (and not rebounding) deflect
    pub const DEFLECT_ROLL: f32 = 0.85;

    /// Beam geometry
    pub const SPAWN_X: f32 = -18.5;
    pub const BEAM_SPREAD: f32 = 10.0;
    pub const BEAM_VELOCITY: f32 = 0.38;
    pub const REBOUND_JITTER: f32 = 0.05;
    pub const DEFLECT_AIM_OFFSET: f32 = 0.5;

    /// Interaction slab around the foil plane (x = 0)
    pub const SLAB_HALF_WIDTH: f32 = 0.3;
    pub const REBOUND_DISTANCE: f32 = 0.55;
    pub const DEFLECT_DISTANCE: f32 = 1.8;
    pub const DEFLECT_KICK: f32 = 0.35;
    /// Transverse growth per frame-unit after a deflection, while near the foil
    pub const DEFLECT_SPREAD: f32 = 0.015;
    pub const DEFLECT_SPREAD_RANGE: f32 = 6.0;

    /// Frame-units a "DEFLECTED"/"REBOUNDED" label stays visible
    pub const LABEL_DURATION: f32 = 40.0;

    /// Trail sampling
    pub const TRAIL_LENGTH: usize = 12;
    pub const TRAIL_INTERVAL: f32 = 3.0;

    /// Retirement limits
    pub const RETIRE_X: f32 = 30.0;
    pub const MAX_LIFE: f32 = 900.0;

    /// Gold foil lattice
    pub const NUCLEUS_SPACING: f32 = 4.5;
    pub const NUCLEUS_RADIUS: f32 = 0.25;
    pub const CLOUD_RADIUS: f32 = 2.1;
    pub const FOIL_HALF_SIZE: f32 = 8.0;

    /// Particle render radius
    pub const PARTICLE_RADIUS: f32 = 0.16;

    /// Beam speed control
    pub const MIN_BEAM_SPEED: f32 = 0.5;
    pub const MAX_BEAM_SPEED: f32 = 3.0;
    pub const BEAM_SPEED_STEP: f32 = 0.1;
}

/// Clamp a beam speed multiplier to the slider range. NaN falls back to 1.
#[inline]
pub fn beam_speed_factor(speed: f32) -> f32 {
    use consts::*;
    if !speed.is_finite() {
        return 1.0;
    }
    speed.clamp(MIN_BEAM_SPEED, MAX_BEAM_SPEED)
}

/// Clamp a beam speed to the slider range, snapped to its step
#[inline]
pub fn clamp_beam_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return 1.0;
    }
    beam_speed_factor((speed / consts::BEAM_SPEED_STEP).round() * consts::BEAM_SPEED_STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_beam_speed() {
        assert_eq!(clamp_beam_speed(0.1), 0.5);
        assert_eq!(clamp_beam_speed(7.0), 3.0);
        assert!((clamp_beam_speed(1.26) - 1.3).abs() < 1e-5);
        assert_eq!(clamp_beam_speed(f32::NAN), 1.0);
    }

    #[test]
    fn test_beam_speed_factor_is_not_snapped() {
        assert_eq!(beam_speed_factor(1.04), 1.04);
        assert_eq!(beam_speed_factor(0.2), 0.5);
        assert_eq!(beam_speed_factor(f32::INFINITY), 1.0);
    }
}
