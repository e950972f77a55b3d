use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use rayon::prelude::*;

/// Super-droplet attributes stored column-wise.
///
/// Storage never shrinks. `idx` lists the active slots in a stable order and
/// every per-particle field handed to or returned from this struct (e.g.
/// terminal velocities) follows it. The total multiplicity fits in a `u64`,
/// so sums over any subset of slots cannot overflow.
#[derive(Clone, Debug)]
pub struct Particles {
    z: Vec<Float>,
    radius: Vec<Float>,
    multiplicity: Vec<u64>,
    active: Vec<bool>,
    idx: Vec<usize>,
}

impl Particles {
    pub fn new(z: Vec<Float>, radius: Vec<Float>, multiplicity: Vec<u64>) -> Result<Self> {
        let n_sd = z.len();
        if radius.len() != n_sd {
            return Err(SimulationError::AttributeLengthMismatch {
                attribute: "radius",
                expected: n_sd,
                actual: radius.len(),
            });
        }
        if multiplicity.len() != n_sd {
            return Err(SimulationError::AttributeLengthMismatch {
                attribute: "multiplicity",
                expected: n_sd,
                actual: multiplicity.len(),
            });
        }
        if multiplicity
            .iter()
            .try_fold(0u64, |total, &n| total.checked_add(n))
            .is_none()
        {
            return Err(SimulationError::MultiplicityOverflow);
        }
        Ok(Self {
            z,
            radius,
            multiplicity,
            active: vec![true; n_sd],
            idx: (0..n_sd).collect(),
        })
    }

    /// Number of active super-droplets (`SD_num`).
    pub fn sd_num(&self) -> usize {
        self.idx.len()
    }

    pub fn n_slots(&self) -> usize {
        self.z.len()
    }

    pub fn active_ids(&self) -> &[usize] {
        &self.idx
    }

    /// Height of a slot, active or not.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn z(&self, slot: usize) -> Float {
        self.z[slot]
    }

    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn radius(&self, slot: usize) -> Float {
        self.radius[slot]
    }

    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn multiplicity(&self, slot: usize) -> u64 {
        self.multiplicity[slot]
    }

    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn is_active(&self, slot: usize) -> bool {
        self.active[slot]
    }

    /// Removes a slot for good. `sd_num` no longer counts it once this
    /// returns. Removing an already removed slot does nothing.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= n_slots()`.
    pub fn remove(&mut self, slot: usize) {
        if self.active[slot] {
            self.active[slot] = false;
            self.idx.retain(|&i| i != slot);
        }
    }

    /// Drops slots whose flag was cleared through `columns_mut` from the
    /// active index and returns how many were dropped.
    pub(crate) fn recycle(&mut self) -> usize {
        let before = self.idx.len();
        let active = &self.active;
        self.idx.retain(|&slot| active[slot]);
        before - self.idx.len()
    }

    pub fn mean_z(&self) -> Option<Float> {
        if self.idx.is_empty() {
            return None;
        }
        let sum = self.idx.par_iter().map(|&slot| self.z[slot]).sum::<Float>();
        Some(sum / self.idx.len() as Float)
    }

    pub fn total_multiplicity(&self) -> u64 {
        self.idx
            .par_iter()
            .map(|&slot| self.multiplicity[slot])
            .sum::<u64>()
    }

    pub(crate) fn columns_mut(&mut self) -> (&mut [Float], &mut [bool]) {
        (self.z.as_mut_slice(), self.active.as_mut_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_particles() -> Particles {
        Particles::new(vec![1.0, 2.0, 3.0], vec![1e-6; 3], vec![10, 20, 30]).unwrap()
    }

    #[test]
    fn new_particles_are_all_active() {
        let particles = three_particles();
        assert_eq!(particles.sd_num(), 3);
        assert_eq!(particles.active_ids(), &[0, 1, 2]);
        assert!((0..3).all(|slot| particles.is_active(slot)));
    }

    #[test]
    fn mismatched_attribute_lengths_are_rejected() {
        let result = Particles::new(vec![1.0, 2.0], vec![1e-6], vec![1, 1]);
        assert!(matches!(
            result,
            Err(SimulationError::AttributeLengthMismatch {
                attribute: "radius",
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn recycle_keeps_order_of_remaining_slots() {
        let mut particles = three_particles();
        particles.remove(1);

        assert_eq!(particles.sd_num(), 2);
        assert_eq!(particles.active_ids(), &[0, 2]);
        assert_eq!(particles.n_slots(), 3);
        assert!(!particles.is_active(1));
        assert_eq!(particles.recycle(), 0);
    }

    #[test]
    fn removing_twice_is_harmless() {
        let mut particles = three_particles();
        particles.remove(0);
        particles.remove(0);
        assert_eq!(particles.sd_num(), 2);
        assert_eq!(particles.active_ids(), &[1, 2]);
    }

    #[test]
    fn recycle_drops_flags_cleared_in_bulk() {
        let mut particles = three_particles();
        {
            let (_, active) = particles.columns_mut();
            active[0] = false;
            active[2] = false;
        }
        assert_eq!(particles.recycle(), 2);
        assert_eq!(particles.active_ids(), &[1]);
    }

    #[test]
    fn summaries_ignore_removed_slots() {
        let mut particles = three_particles();
        particles.remove(2);
        assert_eq!(particles.total_multiplicity(), 30);
        assert_eq!(particles.mean_z(), Some(1.5));
    }

    #[test]
    fn overflowing_total_multiplicity_is_rejected() {
        let result = Particles::new(vec![1.0, 2.0], vec![1e-6; 2], vec![u64::MAX / 2 + 1; 2]);
        assert!(matches!(result, Err(SimulationError::MultiplicityOverflow)));
    }

    #[test]
    fn largest_total_multiplicity_is_accepted() {
        let particles = Particles::new(vec![1.0, 2.0], vec![1e-6; 2], vec![u64::MAX - 1, 1]).unwrap();
        assert_eq!(particles.total_multiplicity(), u64::MAX);
    }

    #[test]
    #[should_panic]
    fn out_of_range_slot_panics() {
        three_particles().z(3);
    }

    #[test]
    fn empty_set_has_no_mean_height() {
        let particles = Particles::new(vec![], vec![], vec![]).unwrap();
        assert_eq!(particles.sd_num(), 0);
        assert_eq!(particles.mean_z(), None);
        assert_eq!(particles.total_multiplicity(), 0);
    }
}
