//! Lab state and core simulation types
//!
//! Everything a tick reads or writes lives here.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::nucleus::gold_foil_lattice;
use super::stats::ScatterStats;
use crate::consts::*;

/// Current phase of the lab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabPhase {
    /// Beam firing, particles moving
    #[default]
    Running,
    /// Everything frozen
    Paused,
}

/// Outcome decided when a particle is spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fate {
    Passed,
    Deflected,
    Rebounded,
}

impl Fate {
    /// Map a uniform roll in [0, 1) to a fate
    pub fn from_roll(roll: f32) -> Self {
        if roll > REBOUND_ROLL {
            Fate::Rebounded
        } else if roll > DEFLECT_ROLL {
            Fate::Deflected
        } else {
            Fate::Passed
        }
    }
}

/// What has visibly happened to a particle so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParticleStatus {
    #[default]
    Passed,
    Deflected,
    Rebounded,
}

impl ParticleStatus {
    /// Index used by the GPU palette (0 = pass, 1 = deflect, 2 = rebound)
    pub fn as_index(&self) -> u32 {
        match self {
            ParticleStatus::Passed => 0,
            ParticleStatus::Deflected => 1,
            ParticleStatus::Rebounded => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ParticleStatus::Passed => "PASSED",
            ParticleStatus::Deflected => "DEFLECTED",
            ParticleStatus::Rebounded => "REBOUNDED",
        }
    }
}

/// An alpha particle in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlphaParticle {
    pub id: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub status: ParticleStatus,
    pub fate: Fate,
    /// Accumulated frame-units since spawn
    pub life: f32,
    pub has_interacted: bool,
    /// Frame-units left to show the outcome label
    pub label_timer: f32,
    /// Recent positions (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec3>,
}

impl AlphaParticle {
    pub fn new(id: u32, pos: Vec3, fate: Fate) -> Self {
        Self {
            id,
            pos,
            vel: Vec3::new(BEAM_VELOCITY, 0.0, 0.0),
            status: ParticleStatus::Passed,
            fate,
            life: 0.0,
            has_interacted: false,
            label_timer: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH + 1),
        }
    }

    /// Record current position to trail
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Whether the floating outcome label should be drawn
    pub fn label_visible(&self) -> bool {
        self.has_interacted && self.label_timer > 0.0
    }

    /// Past the bounds or lifetime limit
    pub fn should_retire(&self) -> bool {
        self.pos.x.abs() > RETIRE_X || self.life > MAX_LIFE
    }
}

/// Things that happened during the last tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabEvent {
    Fired { id: u32 },
    Deflected { id: u32, nucleus: usize },
    Rebounded { id: u32, nucleus: usize },
}

/// Complete lab state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct LabState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: LabPhase,
    /// Live particles (ascending id)
    pub particles: Vec<AlphaParticle>,
    /// Fixed nucleus centres inside the foil
    pub nuclei: Vec<Vec3>,
    pub stats: ScatterStats,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Events from the most recent tick
    pub events: Vec<LabEvent>,
    next_id: u32,
}

impl LabState {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: LabPhase::Running,
            particles: Vec::with_capacity(MAX_PARTICLES),
            nuclei: gold_foil_lattice(NUCLEUS_SPACING),
            stats: ScatterStats::default(),
            time_ticks: 0,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new particle ID
    pub fn next_particle_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Clear the counters and every particle in flight
    pub fn reset(&mut self) {
        self.stats = ScatterStats::default();
        self.particles.clear();
        self.events.clear();
    }

    pub fn is_paused(&self) -> bool {
        self.phase == LabPhase::Paused
    }

    pub fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            LabPhase::Running => LabPhase::Paused,
            LabPhase::Paused => LabPhase::Running,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fate_from_roll() {
        assert_eq!(Fate::from_roll(0.0), Fate::Passed);
        assert_eq!(Fate::from_roll(0.85), Fate::Passed);
        assert_eq!(Fate::from_roll(0.86), Fate::Deflected);
        assert_eq!(Fate::from_roll(0.96), Fate::Deflected);
        assert_eq!(Fate::from_roll(0.97), Fate::Rebounded);
    }

    #[test]
    fn test_trail_keeps_newest() {
        let mut p = AlphaParticle::new(1, Vec3::ZERO, Fate::Passed);
        for i in 0..20 {
            p.pos.x = i as f32;
            p.record_trail();
        }
        assert_eq!(p.trail.len(), TRAIL_LENGTH);
        assert_eq!(p.trail[0].x, 19.0);
        assert_eq!(p.trail[TRAIL_LENGTH - 1].x, 8.0);
    }

    #[test]
    fn test_new_lab() {
        let state = LabState::new(7);
        assert_eq!(state.nuclei.len(), 9);
        assert!(state.particles.is_empty());
        assert_eq!(state.phase, LabPhase::Running);
        assert_eq!(state.stats.fired, 0);
    }

    #[test]
    fn test_retire_limits() {
        let mut p = AlphaParticle::new(1, Vec3::new(-18.5, 0.0, 0.0), Fate::Passed);
        assert!(!p.should_retire());
        p.pos.x = 30.5;
        assert!(p.should_retire());
        p.pos.x = 0.0;
        p.life = 901.0;
        assert!(p.should_retire());
    }
}
