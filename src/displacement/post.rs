use super::Displacement;
use crate::global_variables::*;
use crate::particles::Particles;
use crate::post::PostResult;

pub fn compute_mean_height(particles: &Particles, _displacement: &Displacement) -> Vec<PostResult> {
    let sd_num = PostResult::new(
        "sd_num",
        "number of super-droplets",
        particles.sd_num() as Float,
        None,
    );
    let mean_height = PostResult::new(
        "mean_height",
        "mean height",
        particles.mean_z().unwrap_or(Float::NAN),
        Some("m"),
    );
    vec![sd_num, mean_height]
}

pub fn compute_precipitation(particles: &Particles, displacement: &Displacement) -> Vec<PostResult> {
    let removed_total = PostResult::new(
        "removed_sd",
        "removed super-droplets",
        displacement.removed_total as Float,
        None,
    );
    let precipitated = PostResult::new(
        "precipitated_n",
        "precipitated droplets",
        displacement.precipitated_multiplicity as Float,
        None,
    );
    let airborne = PostResult::new(
        "airborne_n",
        "airborne droplets",
        particles.total_multiplicity() as Float,
        None,
    );
    vec![removed_total, precipitated, airborne]
}
