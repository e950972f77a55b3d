use super::Domain;
use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use crate::particles::Particles;
use log::debug;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SedimentationReport {
    pub removed: usize,
    pub remaining: usize,
    pub removed_multiplicity: u64,
}

impl SedimentationReport {
    pub fn unchanged(sd_num: usize) -> Self {
        Self {
            removed: 0,
            remaining: sd_num,
            removed_multiplicity: 0,
        }
    }
}

/// Moves every active super-droplet down by `velocity * dt` and removes the
/// ones that end up outside `domain`.
///
/// `velocities` is indexed like `Particles::active_ids`. Inputs are checked
/// before anything is written, so an error leaves `particles` untouched.
/// Removed super-droplets keep their last committed position.
pub fn sedimentation(
    dt: Float,
    domain: &Domain,
    particles: &mut Particles,
    velocities: &[Float],
) -> Result<SedimentationReport> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimulationError::InvalidTimestep(dt));
    }
    let sd_num = particles.sd_num();
    if velocities.len() != sd_num {
        return Err(SimulationError::VelocityFieldMismatch {
            expected: sd_num,
            actual: velocities.len(),
        });
    }
    if let Some((index, &value)) = velocities
        .iter()
        .enumerate()
        .find(|(_, velocity)| !(velocity.is_finite() && **velocity >= 0.0))
    {
        return Err(SimulationError::InvalidTerminalVelocity { index, value });
    }

    let mut slot_velocity: Vec<Option<Float>> = vec![None; particles.n_slots()];
    for (&slot, &velocity) in particles.active_ids().iter().zip(velocities) {
        slot_velocity[slot] = Some(velocity);
    }

    let (z, active) = particles.columns_mut();
    z.par_iter_mut()
        .zip(active.par_iter_mut())
        .zip(slot_velocity.par_iter())
        .for_each(|((z, active), velocity)| {
            if let (true, Some(velocity)) = (*active, velocity) {
                let new_z = *z - velocity * dt;
                if domain.contains(new_z) {
                    *z = new_z;
                } else {
                    *active = false;
                }
            }
        });

    let removed_multiplicity = particles
        .active_ids()
        .par_iter()
        .filter(|&&slot| !particles.is_active(slot))
        .map(|&slot| particles.multiplicity(slot))
        .sum::<u64>();
    let removed = particles.recycle();

    debug!(
        "Sedimentation removed {removed} of {sd_num} super-droplets ({removed_multiplicity} droplets)."
    );

    Ok(SedimentationReport {
        removed,
        remaining: particles.sd_num(),
        removed_multiplicity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn particles(z: Vec<Float>) -> Particles {
        let n_sd = z.len();
        Particles::new(z, vec![1e-6; n_sd], (1..=n_sd as u64).collect()).unwrap()
    }

    fn ground() -> Domain {
        Domain::new(0.0, None).unwrap()
    }

    #[test]
    fn moves_particles_down() {
        let mut particles = particles(vec![10.0, 20.0]);
        let report = sedimentation(0.5, &ground(), &mut particles, &[2.0, 4.0]).unwrap();

        assert_eq!(report, SedimentationReport::unchanged(2));
        assert_relative_eq!(particles.z(0), 9.0);
        assert_relative_eq!(particles.z(1), 18.0);
    }

    #[test]
    fn landing_exactly_on_the_boundary_keeps_particle() {
        let mut particles = particles(vec![3.0]);
        sedimentation(1.0, &ground(), &mut particles, &[3.0]).unwrap();
        assert_eq!(particles.sd_num(), 1);
        assert_eq!(particles.z(0), 0.0);
    }

    #[test]
    fn particles_below_boundary_are_removed() {
        let mut particles = particles(vec![1.0, 50.0, 2.0]);
        let report = sedimentation(1.0, &ground(), &mut particles, &[5.0, 5.0, 5.0]).unwrap();

        assert_eq!(report.removed, 2);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.removed_multiplicity, 1 + 3);
        assert_eq!(particles.active_ids(), &[1]);
        assert!(!particles.is_active(0));
        assert_eq!(particles.z(0), 1.0);
    }

    #[test]
    fn particles_above_upper_boundary_are_removed() {
        let domain = Domain::new(0.0, Some(10.0)).unwrap();
        let mut particles = particles(vec![15.0, 5.0]);
        let report = sedimentation(1.0, &domain, &mut particles, &[1.0, 1.0]).unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(particles.active_ids(), &[1]);
    }

    #[test]
    fn field_follows_active_order_after_removals() {
        let mut particles = particles(vec![1.0, 10.0, 20.0]);
        sedimentation(1.0, &ground(), &mut particles, &[2.0, 0.0, 0.0]).unwrap();
        assert_eq!(particles.active_ids(), &[1, 2]);

        sedimentation(1.0, &ground(), &mut particles, &[1.0, 5.0]).unwrap();
        assert_relative_eq!(particles.z(1), 9.0);
        assert_relative_eq!(particles.z(2), 15.0);
    }

    #[test]
    fn removed_particle_is_neither_moved_nor_counted_again() {
        let mut particles = particles(vec![10.0, 20.0]);
        particles.remove(0);
        assert_eq!(particles.sd_num(), 1);

        let report = sedimentation(1.0, &ground(), &mut particles, &[5.0]).unwrap();

        assert_eq!(report, SedimentationReport::unchanged(1));
        assert_eq!(particles.z(0), 10.0);
        assert_relative_eq!(particles.z(1), 15.0);
        assert_eq!(particles.active_ids(), &[1]);
    }

    #[test]
    fn field_sized_for_removed_particle_is_rejected() {
        let mut particles = particles(vec![10.0, 20.0]);
        particles.remove(0);
        assert!(matches!(
            sedimentation(1.0, &ground(), &mut particles, &[5.0, 5.0]),
            Err(SimulationError::VelocityFieldMismatch {
                expected: 1,
                actual: 2
            })
        ));
        assert_eq!(particles.z(1), 20.0);
    }

    #[test]
    fn removing_the_largest_multiplicities_does_not_overflow() {
        let mut particles =
            Particles::new(vec![1.0, 2.0], vec![1e-6; 2], vec![u64::MAX / 2, u64::MAX / 2])
                .unwrap();
        let report = sedimentation(1.0, &ground(), &mut particles, &[1000.0, 1000.0]).unwrap();
        assert_eq!(report.removed_multiplicity, u64::MAX - 1);
        assert_eq!(particles.sd_num(), 0);
    }

    #[test]
    fn invalid_timestep_leaves_state_untouched() {
        let mut particles = particles(vec![1.0]);
        for dt in [0.0, -1.0, Float::NAN, Float::INFINITY] {
            assert!(matches!(
                sedimentation(dt, &ground(), &mut particles, &[1000.0]),
                Err(SimulationError::InvalidTimestep(_))
            ));
        }
        assert_eq!(particles.sd_num(), 1);
        assert_eq!(particles.z(0), 1.0);
    }

    #[test]
    fn mismatched_field_is_rejected() {
        let mut particles = particles(vec![1.0, 2.0]);
        let result = sedimentation(1.0, &ground(), &mut particles, &[1000.0]);
        assert!(matches!(
            result,
            Err(SimulationError::VelocityFieldMismatch {
                expected: 2,
                actual: 1
            })
        ));
        assert_eq!(particles.sd_num(), 2);
    }

    #[test]
    fn negative_velocity_is_rejected() {
        let mut particles = particles(vec![1.0, 2.0]);
        let result = sedimentation(1.0, &ground(), &mut particles, &[0.0, -1.0]);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidTerminalVelocity { index: 1, .. })
        ));
        assert_eq!(particles.z(0), 1.0);
    }
}
