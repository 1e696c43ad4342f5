//! Gold foil nuclei and the particle-nucleus interaction trigger

use glam::Vec3;

use super::state::{AlphaParticle, Fate};
use crate::consts::*;

/// 3x3 lattice of nuclei in the foil plane (x = 0), centred on the origin
pub fn gold_foil_lattice(spacing: f32) -> Vec<Vec3> {
    let mut nuclei = Vec::with_capacity(9);
    for i in -1..=1 {
        for j in -1..=1 {
            nuclei.push(Vec3::new(0.0, i as f32 * spacing, j as f32 * spacing));
        }
    }
    nuclei
}

/// Result of the interaction check for one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    /// Head-on: reverse along the beam
    Rebound { nucleus: usize },
    /// Close pass: kicked away from the nucleus along `direction`
    Deflect { nucleus: usize, direction: Vec3 },
}

/// Whether `x` lies inside the slab where nuclei can act on a particle
#[inline]
pub fn in_interaction_slab(x: f32) -> bool {
    (-SLAB_HALF_WIDTH..=SLAB_HALF_WIDTH).contains(&x)
}

/// Check a particle against every nucleus.
///
/// Only particles that have not interacted yet and sit inside the slab are
/// considered. The first nucleus within the fate's trigger distance wins.
/// Pass-fated particles never interact.
pub fn check_interaction(particle: &AlphaParticle, nuclei: &[Vec3]) -> Option<Interaction> {
    if particle.has_interacted || !in_interaction_slab(particle.pos.x) {
        return None;
    }

    for (index, nucleus) in nuclei.iter().enumerate() {
        let dist = particle.pos.distance(*nucleus);
        match particle.fate {
            Fate::Rebounded if dist < REBOUND_DISTANCE => {
                return Some(Interaction::Rebound { nucleus: index });
            }
            Fate::Deflected if dist < DEFLECT_DISTANCE => {
                let direction = (particle.pos - *nucleus).normalize_or_zero();
                return Some(Interaction::Deflect {
                    nucleus: index,
                    direction,
                });
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle_at(pos: Vec3, fate: Fate) -> AlphaParticle {
        AlphaParticle::new(1, pos, fate)
    }

    #[test]
    fn test_lattice_layout() {
        let nuclei = gold_foil_lattice(4.5);
        assert_eq!(nuclei.len(), 9);
        assert!(nuclei.iter().all(|n| n.x == 0.0));
        assert!(nuclei.contains(&Vec3::ZERO));
        assert!(nuclei.contains(&Vec3::new(0.0, -4.5, 4.5)));
    }

    #[test]
    fn test_rebound_trigger() {
        let nuclei = gold_foil_lattice(4.5);
        let p = particle_at(Vec3::new(0.1, 4.5, 0.2), Fate::Rebounded);
        assert_eq!(
            check_interaction(&p, &nuclei),
            Some(Interaction::Rebound { nucleus: 7 })
        );

        // Too far for a rebound
        let p = particle_at(Vec3::new(0.1, 4.5, 1.0), Fate::Rebounded);
        assert_eq!(check_interaction(&p, &nuclei), None);
    }

    #[test]
    fn test_deflect_direction_points_away() {
        let nuclei = gold_foil_lattice(4.5);
        let p = particle_at(Vec3::new(0.0, 0.5, 0.0), Fate::Deflected);
        match check_interaction(&p, &nuclei) {
            Some(Interaction::Deflect { nucleus, direction }) => {
                assert_eq!(nuclei[nucleus], Vec3::ZERO);
                assert!((direction - Vec3::Y).length() < 1e-5);
            }
            other => panic!("expected deflection, got {:?}", other),
        }
    }

    #[test]
    fn test_deflect_at_centre_has_no_direction() {
        let nuclei = gold_foil_lattice(4.5);
        let p = particle_at(Vec3::ZERO, Fate::Deflected);
        match check_interaction(&p, &nuclei) {
            Some(Interaction::Deflect { direction, .. }) => assert_eq!(direction, Vec3::ZERO),
            other => panic!("expected deflection, got {:?}", other),
        }
    }

    #[test]
    fn test_outside_slab_or_passed() {
        let nuclei = gold_foil_lattice(4.5);
        let p = particle_at(Vec3::new(-0.5, 0.0, 0.0), Fate::Rebounded);
        assert_eq!(check_interaction(&p, &nuclei), None);

        let p = particle_at(Vec3::new(0.0, 0.0, 0.0), Fate::Passed);
        assert_eq!(check_interaction(&p, &nuclei), None);

        let mut p = particle_at(Vec3::new(0.0, 0.0, 0.0), Fate::Rebounded);
        p.has_interacted = true;
        assert_eq!(check_interaction(&p, &nuclei), None);
    }
}
