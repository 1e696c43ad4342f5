//! Per-frame simulation tick
//!
//! Spawns alpha particles, advances them, fires nucleus interactions and
//! retires particles that leave the scene.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::nucleus::{Interaction, check_interaction};
use super::state::{AlphaParticle, Fate, LabEvent, LabState, ParticleStatus};
use super::stats::ScatterStats;
use crate::beam_speed_factor;
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone)]
pub struct TickInput {
    /// Beam velocity multiplier (slider value)
    pub beam_speed: f32,
    /// Pause toggle
    pub pause: bool,
    /// Clear stats and particles in flight
    pub reset: bool,
}

impl Default for TickInput {
    fn default() -> Self {
        Self {
            beam_speed: 1.0,
            pause: false,
            reset: false,
        }
    }
}

/// Advance the lab by one frame of `dt` seconds
pub fn tick(state: &mut LabState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.pause {
        state.toggle_pause();
        log::info!("Lab {:?}", state.phase);
    }

    if input.reset {
        state.reset();
        log::info!("Lab reset (seed {})", state.seed);
    }

    if state.is_paused() {
        return;
    }

    state.time_ticks += 1;

    let speed = beam_speed_factor(input.beam_speed);
    let frame_speed = dt * FRAME_RATE * speed;

    if state.rng.random::<f32>() < SPAWN_CHANCE * speed && state.particles.len() < MAX_PARTICLES {
        spawn_particle(state);
    }

    advance_particles(state, frame_speed);
}

/// Fire one particle from the emitter with a randomly drawn fate
pub fn spawn_particle(state: &mut LabState) {
    let fate = Fate::from_roll(state.rng.random());

    let mut y = (state.rng.random::<f32>() - 0.5) * BEAM_SPREAD;
    let mut z = (state.rng.random::<f32>() - 0.5) * BEAM_SPREAD;

    // Rebound and deflect shots are aimed at a nucleus so the fate can happen
    match fate {
        Fate::Rebounded => {
            if let Some(target) = pick_nucleus(&mut state.rng, &state.nuclei) {
                y = target.y + (state.rng.random::<f32>() - 0.5) * REBOUND_JITTER;
                z = target.z + (state.rng.random::<f32>() - 0.5) * REBOUND_JITTER;
            }
        }
        Fate::Deflected => {
            if let Some(target) = pick_nucleus(&mut state.rng, &state.nuclei) {
                let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
                y = target.y + angle.cos() * DEFLECT_AIM_OFFSET;
                z = target.z + angle.sin() * DEFLECT_AIM_OFFSET;
            }
        }
        Fate::Passed => {}
    }

    let id = state.next_particle_id();
    state
        .particles
        .push(AlphaParticle::new(id, Vec3::new(SPAWN_X, y, z), fate));
    state.stats.fired += 1;
    state.events.push(LabEvent::Fired { id });
}

fn pick_nucleus(rng: &mut Pcg32, nuclei: &[Vec3]) -> Option<Vec3> {
    if nuclei.is_empty() {
        return None;
    }
    Some(nuclei[rng.random_range(0..nuclei.len())])
}

/// Move every live particle forward by `frame_speed` frame-units and drop
/// the ones that left the scene
pub fn advance_particles(state: &mut LabState, frame_speed: f32) {
    let LabState {
        particles,
        nuclei,
        rng,
        stats,
        events,
        ..
    } = state;

    for particle in particles.iter_mut() {
        // No substep may travel further than half the slab, however large the tick
        let travel = particle.vel.length() * frame_speed;
        let substeps = (travel / SLAB_HALF_WIDTH).ceil().max(1.0) as u32;
        let step = frame_speed / substeps as f32;

        for _ in 0..substeps {
            advance_particle(particle, nuclei, rng, stats, events, step);
        }

        // Deflected particles keep fanning out while still near the foil
        if particle.status == ParticleStatus::Deflected
            && particle.pos.x.abs() < DEFLECT_SPREAD_RANGE
        {
            let growth = 1.0 + DEFLECT_SPREAD * frame_speed;
            particle.vel.y *= growth;
            particle.vel.z *= growth;
        }

        if particle.life % TRAIL_INTERVAL < 1.0 {
            particle.record_trail();
        }
    }

    particles.retain(|p| !p.should_retire());
}

fn advance_particle(
    particle: &mut AlphaParticle,
    nuclei: &[Vec3],
    rng: &mut Pcg32,
    stats: &mut ScatterStats,
    events: &mut Vec<LabEvent>,
    step: f32,
) {
    particle.pos += particle.vel * step;
    particle.life += step;

    if let Some(interaction) = check_interaction(particle, nuclei) {
        match interaction {
            Interaction::Rebound { nucleus } => {
                particle.vel = Vec3::new(
                    -BEAM_VELOCITY,
                    (rng.random::<f32>() - 0.5) * REBOUND_JITTER,
                    (rng.random::<f32>() - 0.5) * REBOUND_JITTER,
                );
                particle.status = ParticleStatus::Rebounded;
                stats.rebounded += 1;
                events.push(LabEvent::Rebounded {
                    id: particle.id,
                    nucleus,
                });
            }
            Interaction::Deflect { nucleus, direction } => {
                particle.vel += direction * DEFLECT_KICK;
                particle.status = ParticleStatus::Deflected;
                stats.deflected += 1;
                events.push(LabEvent::Deflected {
                    id: particle.id,
                    nucleus,
                });
            }
        }
        particle.has_interacted = true;
        particle.label_timer = LABEL_DURATION;
    }

    if particle.label_timer > 0.0 {
        particle.label_timer -= step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::LabPhase;
    use proptest::prelude::*;

    fn run(state: &mut LabState, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            tick(state, input, SIM_DT);
        }
    }

    #[test]
    fn test_spawns_from_emitter() {
        let mut state = LabState::new(12345);
        let input = TickInput::default();
        while state.stats.fired == 0 {
            tick(&mut state, &input, SIM_DT);
        }
        assert_eq!(state.particles.len(), 1);
        let p = &state.particles[0];
        assert!(p.pos.x > SPAWN_X && p.pos.x < SPAWN_X + 1.0);
        assert!(p.pos.y.abs() <= 5.0 + NUCLEUS_SPACING);
        assert!(state.events.contains(&LabEvent::Fired { id: p.id }));
    }

    #[test]
    fn test_pause_freezes_lab() {
        let mut state = LabState::new(12345);
        run(&mut state, &TickInput::default(), 120);

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, LabPhase::Paused);

        let mut labelled = AlphaParticle::new(500, Vec3::new(1.0, 0.5, 0.0), Fate::Deflected);
        labelled.status = ParticleStatus::Deflected;
        labelled.has_interacted = true;
        labelled.label_timer = 20.0;
        state.particles.push(labelled);

        let before: Vec<Vec3> = state.particles.iter().map(|p| p.pos).collect();
        let fired = state.stats.fired;
        run(&mut state, &TickInput::default(), 60);
        let after: Vec<Vec3> = state.particles.iter().map(|p| p.pos).collect();
        assert_eq!(before, after);
        assert_eq!(fired, state.stats.fired);

        let held = state.particles.iter().find(|p| p.id == 500).unwrap();
        assert_eq!(held.label_timer, 20.0);
        assert!(held.label_visible());

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, LabPhase::Running);
    }

    #[test]
    fn test_reset_clears_stats_and_particles() {
        let mut state = LabState::new(4);
        run(&mut state, &TickInput::default(), 300);
        assert!(state.stats.fired > 0);

        let reset = TickInput {
            reset: true,
            ..Default::default()
        };
        tick(&mut state, &reset, SIM_DT);
        assert!(state.stats.fired <= 1);
        assert_eq!(state.stats.deflected, 0);
        assert_eq!(state.stats.rebounded, 0);
        assert!(state.particles.len() <= 1);
    }

    #[test]
    fn test_rebound_reverses() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(99, Vec3::new(-1.0, 4.5, 0.01), Fate::Rebounded));

        for _ in 0..10 {
            advance_particles(&mut state, 1.0);
        }

        let p = &state.particles[0];
        assert_eq!(p.status, ParticleStatus::Rebounded);
        assert!(p.has_interacted);
        assert!(p.vel.x < 0.0);
        assert!(p.pos.x < 0.0);
        assert_eq!(state.stats.rebounded, 1);
        assert_eq!(state.events, vec![LabEvent::Rebounded { id: 99, nucleus: 7 }]);
    }

    #[test]
    fn test_deflect_kicks_away_once() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(7, Vec3::new(-1.0, 0.5, 0.0), Fate::Deflected));

        for _ in 0..20 {
            advance_particles(&mut state, 1.0);
        }

        let p = &state.particles[0];
        assert_eq!(p.status, ParticleStatus::Deflected);
        assert!(p.vel.y > 0.3);
        assert!(p.vel.x > 0.0);
        assert_eq!(state.stats.deflected, 1);
        assert_eq!(state.events, vec![LabEvent::Deflected { id: 7, nucleus: 4 }]);
    }

    #[test]
    fn test_high_speed_cannot_skip_slab() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(3, Vec3::new(-1.0, -4.5, 4.5), Fate::Rebounded));

        // 3x beam speed: 1.14 units per frame, wider than the slab
        for _ in 0..5 {
            advance_particles(&mut state, 3.0);
        }
        assert_eq!(state.stats.rebounded, 1);
    }

    #[test]
    fn test_huge_tick_cannot_skip_slab() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(3, Vec3::new(-0.35, 0.0, 0.01), Fate::Rebounded));

        // One 0.2 s tick at 3x speed: over 13 units of travel
        advance_particles(&mut state, 0.2 * FRAME_RATE * MAX_BEAM_SPEED);

        assert_eq!(state.stats.rebounded, 1);
        let p = &state.particles[0];
        assert!(p.has_interacted);
        assert!(p.vel.x < 0.0);
    }

    #[test]
    fn test_beam_speed_is_continuous() {
        let mut slow = LabState::new(5);
        let mut fast = LabState::new(5);
        run(&mut slow, &TickInput::default(), 300);
        run(
            &mut fast,
            &TickInput {
                beam_speed: 1.04,
                ..Default::default()
            },
            300,
        );

        let slow_pos: Vec<Vec3> = slow.particles.iter().map(|p| p.pos).collect();
        let fast_pos: Vec<Vec3> = fast.particles.iter().map(|p| p.pos).collect();
        assert_ne!(slow_pos, fast_pos);
    }

    #[test]
    fn test_spawning_stops_at_cap() {
        let mut state = LabState::new(8);
        for i in 0..MAX_PARTICLES {
            let y = (i % 12) as f32 - 6.0;
            let z = (i / 12) as f32 - 5.0;
            state
                .particles
                .push(AlphaParticle::new(1000 + i as u32, Vec3::new(SPAWN_X, y, z), Fate::Passed));
        }

        // 30 ticks at 3x move the beam about 34 units: still short of retiring
        let input = TickInput {
            beam_speed: MAX_BEAM_SPEED,
            ..Default::default()
        };
        run(&mut state, &input, 30);

        assert_eq!(state.stats.fired, 0);
        assert_eq!(state.particles.len(), MAX_PARTICLES);
    }

    #[test]
    fn test_deflect_spread_applies_once_per_tick() {
        let mut state = LabState::new(1);
        let mut particle = AlphaParticle::new(4, Vec3::new(1.0, 2.0, 0.0), Fate::Deflected);
        particle.status = ParticleStatus::Deflected;
        particle.has_interacted = true;
        particle.vel = Vec3::new(BEAM_VELOCITY, 0.1, -0.1);
        state.particles.push(particle);

        advance_particles(&mut state, 1.0);

        let p = &state.particles[0];
        let expected = 0.1 * (1.0 + DEFLECT_SPREAD);
        assert!((p.vel.y - expected).abs() < 1e-6, "vel.y {}", p.vel.y);
        assert!((p.vel.z + expected).abs() < 1e-6, "vel.z {}", p.vel.z);
    }

    #[test]
    fn test_passed_particle_flies_straight() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(5, Vec3::new(-1.0, 0.3, 0.0), Fate::Passed));
        for _ in 0..10 {
            advance_particles(&mut state, 1.0);
        }
        let p = &state.particles[0];
        assert_eq!(p.status, ParticleStatus::Passed);
        assert_eq!(p.vel, Vec3::new(BEAM_VELOCITY, 0.0, 0.0));
        assert!(!p.trail.is_empty());
    }

    #[test]
    fn test_particles_retire() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(5, Vec3::new(29.9, 0.0, 0.0), Fate::Passed));
        advance_particles(&mut state, 1.0);
        assert!(state.particles.is_empty());
    }

    #[test]
    fn test_label_timer_counts_down() {
        let mut state = LabState::new(1);
        state
            .particles
            .push(AlphaParticle::new(8, Vec3::new(-0.2, 0.0, 0.4), Fate::Deflected));
        advance_particles(&mut state, 1.0);
        let p = &state.particles[0];
        assert!(p.label_visible());
        assert!(p.label_timer < LABEL_DURATION);

        for _ in 0..45 {
            advance_particles(&mut state, 1.0);
        }
        assert!(!state.particles[0].label_visible());
    }

    #[test]
    fn test_determinism() {
        let mut state1 = LabState::new(99999);
        let mut state2 = LabState::new(99999);

        let inputs = [
            TickInput::default(),
            TickInput {
                beam_speed: 2.4,
                ..Default::default()
            },
            TickInput {
                beam_speed: 0.5,
                ..Default::default()
            },
        ];

        for input in &inputs {
            run(&mut state1, input, 400);
            run(&mut state2, input, 400);
        }

        assert_eq!(state1.stats, state2.stats);
        assert_eq!(state1.particles.len(), state2.particles.len());
        for (a, b) in state1.particles.iter().zip(&state2.particles) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.pos, b.pos);
        }
    }

    #[test]
    fn test_outcome_ratios() {
        let mut state = LabState::new(42);
        run(&mut state, &TickInput::default(), 20_000);

        assert!(state.stats.fired > 2000);
        let deflect = state.stats.deflect_percentage();
        let rebound = state.stats.rebound_percentage();
        assert!((7.0..15.0).contains(&deflect), "deflected {deflect}");
        assert!((2.0..6.5).contains(&rebound), "rebounded {rebound}");
        assert!(state.stats.pass_percentage() > 80.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn lab_invariants_hold(seed in any::<u64>(), speed in 0.5f32..3.0, ticks in 1u32..800) {
            let mut state = LabState::new(seed);
            let input = TickInput { beam_speed: speed, ..Default::default() };
            for _ in 0..ticks {
                tick(&mut state, &input, SIM_DT);
                prop_assert!(state.particles.len() <= MAX_PARTICLES);
                prop_assert!(state.stats.deflected + state.stats.rebounded <= state.stats.fired);
            }

            // Fated particles that have not triggered yet are still upstream of the foil
            for p in &state.particles {
                if p.fate != Fate::Passed && !p.has_interacted {
                    prop_assert!(p.pos.x < -SLAB_HALF_WIDTH);
                }
                prop_assert!(p.trail.len() <= TRAIL_LENGTH);
            }
        }
    }
}
