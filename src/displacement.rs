pub mod io;
pub mod post;
pub mod sedimentation;
pub mod setup;

pub use sedimentation::{sedimentation, SedimentationReport};
pub use setup::Setup;

use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use crate::io::WriteDataMode;
use crate::particles::Particles;
use crate::terminal_velocity::TerminalVelocity;
use log::{debug, info};
use std::time::Instant;

/// Valid vertical extent of the column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub lower_boundary: Float,
    pub upper_boundary: Option<Float>,
}

impl Domain {
    pub fn new(lower_boundary: Float, upper_boundary: Option<Float>) -> Result<Self> {
        if !lower_boundary.is_finite() {
            return Err(SimulationError::DomainConfiguration(format!(
                "lower boundary {lower_boundary} is not finite"
            )));
        }
        if let Some(upper_boundary) = upper_boundary {
            if !upper_boundary.is_finite() || upper_boundary <= lower_boundary {
                return Err(SimulationError::DomainConfiguration(format!(
                    "upper boundary {upper_boundary} must be finite and above the lower boundary {lower_boundary}"
                )));
            }
        }
        Ok(Self {
            lower_boundary,
            upper_boundary,
        })
    }

    pub fn contains(&self, z: Float) -> bool {
        z >= self.lower_boundary && self.upper_boundary.map_or(true, |upper| z <= upper)
    }
}

/// The displacement dynamic. Only sedimentation moves particles here.
#[derive(Clone, Debug)]
pub struct Displacement {
    pub dt: Float,
    pub sedimentation_enabled: bool,
    pub domain: Domain,
    pub removed_total: usize,
    pub precipitated_multiplicity: u64,
}

impl Displacement {
    pub fn new(dt: Float, sedimentation_enabled: bool, domain: Domain) -> Result<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimulationError::InvalidTimestep(dt));
        }
        Ok(Self {
            dt,
            sedimentation_enabled,
            domain,
            removed_total: 0,
            precipitated_multiplicity: 0,
        })
    }

    pub fn step(
        &mut self,
        particles: &mut Particles,
        terminal_velocity: &dyn TerminalVelocity,
    ) -> Result<SedimentationReport> {
        if !self.sedimentation_enabled {
            return Ok(SedimentationReport::unchanged(particles.sd_num()));
        }
        let velocities = terminal_velocity.compute(particles);
        self.apply(particles, &velocities)
    }

    /// Runs the sedimentation step with an already computed velocity field.
    pub fn apply(
        &mut self,
        particles: &mut Particles,
        velocities: &[Float],
    ) -> Result<SedimentationReport> {
        if !self.sedimentation_enabled {
            return Ok(SedimentationReport::unchanged(particles.sd_num()));
        }
        let report = sedimentation(self.dt, &self.domain, particles, velocities)?;
        self.removed_total += report.removed;
        self.precipitated_multiplicity = self
            .precipitated_multiplicity
            .saturating_add(report.removed_multiplicity);
        Ok(report)
    }
}

#[derive(Clone, Debug)]
pub struct Simulation {
    pub case_name: String,
    pub time_step: usize,
    pub n_steps: usize,
    pub simulation_time: Instant,
    pub write_data_mode: WriteDataMode,
}

impl Simulation {
    pub fn new(setup: &Setup) -> Self {
        Self {
            case_name: setup.case_name.clone(),
            time_step: 0,
            n_steps: setup.n_steps,
            simulation_time: Instant::now(),
            write_data_mode: setup.write_data_mode.clone(),
        }
    }

    pub fn next_step(&mut self) {
        self.time_step += 1;
    }

    pub fn stop_condition(&self, particles: &Particles) -> bool {
        self.time_step >= self.n_steps || particles.sd_num() == 0
    }
}

pub fn run() -> Result<()> {
    let setup = Setup::build_case_setup()?;
    let mut simulation = Simulation::new(&setup);
    let (mut displacement, mut particles) = setup.get_displacement()?;
    let terminal_velocity = setup.terminal_velocity_provider();

    info!(
        "Starting `{}` with {} super-droplets, dt = {} s.",
        simulation.case_name,
        particles.sd_num(),
        displacement.dt
    );

    simulation.create_script_for_sd_num_graph()?;
    simulation.write_data_from_steps(&particles)?;

    loop {
        let report = displacement.step(&mut particles, terminal_velocity.as_ref())?;
        simulation.next_step();

        simulation.print_report(&report, &displacement);
        simulation.write_report(&report, &displacement)?;

        simulation.write_post_processing_from_each_n_steps(
            &particles,
            &displacement,
            1,
            post::compute_mean_height,
            "mean_height.dat",
        )?;

        simulation.write_post_processing_from_each_n_steps(
            &particles,
            &displacement,
            1,
            post::compute_precipitation,
            "precipitation.dat",
        )?;

        if simulation.stop_condition(&particles) {
            simulation.write_data_from_steps(&particles)?;
            info!(
                "Stopped at step {} with {} super-droplets left after {:.2} s.",
                simulation.time_step,
                particles.sd_num(),
                simulation.simulation_time.elapsed().as_secs_f64()
            );
            break;
        }

        simulation.write_data(&particles)?;
    }
    Ok(())
}

pub fn run_benchmark() -> Result<()> {
    let bcs_time = Instant::now();
    let setup = Setup::build_case_setup()?;
    let mut simulation = Simulation::new(&setup);
    let bcs_duration = bcs_time.elapsed();

    let gd_time = Instant::now();
    let (mut displacement, mut particles) = setup.get_displacement()?;
    let terminal_velocity = setup.terminal_velocity_provider();
    let gd_duration = gd_time.elapsed();

    loop {
        let loop_time = Instant::now();

        let tv_time = Instant::now();
        let velocities = if displacement.sedimentation_enabled {
            terminal_velocity.compute(&particles)
        } else {
            Vec::new()
        };
        let tv_duration = tv_time.elapsed();

        let sd_time = Instant::now();
        let report = displacement.apply(&mut particles, &velocities)?;
        let sd_duration = sd_time.elapsed();

        simulation.next_step();

        let pr_time = Instant::now();
        simulation.print_report(&report, &displacement);
        simulation.write_report(&report, &displacement)?;
        let pr_duration = pr_time.elapsed();

        let sc_time = Instant::now();
        let stop = simulation.stop_condition(&particles);
        let sc_duration = sc_time.elapsed();

        let loop_duration = loop_time.elapsed();

        let elapsed_times = [
            ("bcs", bcs_duration),
            ("gd", gd_duration),
            ("tv", tv_duration),
            ("sd", sd_duration),
            ("pr", pr_duration),
            ("sc", sc_duration),
            ("loop", loop_duration),
        ];

        crate::io::write_inside_loop_elapsed_time(&elapsed_times, &simulation.time_step)?;

        if stop {
            debug!("Benchmark finished at step {}.", simulation.time_step);
            break;
        }
    }
    Ok(())
}
