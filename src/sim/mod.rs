//! Deterministic scattering simulation
//!
//! All lab logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by particle ID)
//! - No rendering or platform dependencies

pub mod nucleus;
pub mod state;
pub mod stats;
pub mod tick;

pub use nucleus::{Interaction, check_interaction, gold_foil_lattice, in_interaction_slab};
pub use state::{AlphaParticle, Fate, LabEvent, LabPhase, LabState, ParticleStatus};
pub use stats::{FormattedStats, ScatterStats};
pub use tick::{TickInput, advance_particles, spawn_particle, tick};
