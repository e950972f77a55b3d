use super::{Displacement, Domain};
use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use crate::io::WriteDataMode;
use crate::particles::Particles;
use crate::terminal_velocity::{TerminalVelocity, TerminalVelocityKind};
use std::collections::HashMap;
use std::str::FromStr;

/// Case configuration. Defaults describe a 100 m column with droplets
/// spread below 75 m and a constant terminal velocity of 1000 m/s.
#[derive(Clone, Debug, PartialEq)]
pub struct Setup {
    pub case_name: String,
    pub dt: Float,
    pub n_steps: usize,
    pub sedimentation_enabled: bool,
    pub n_sd: usize,
    pub lower_boundary: Float,
    pub upper_boundary: Option<Float>,
    pub initial_height: Float,
    pub radius: Float,
    pub multiplicity: u64,
    pub terminal_velocity: TerminalVelocityKind,
    pub write_data_mode: WriteDataMode,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            case_name: String::from(CASE_NAME),
            dt: DELTA_T,
            n_steps: N_STEPS,
            sedimentation_enabled: true,
            n_sd: N_SD,
            lower_boundary: LOWER_BOUNDARY,
            upper_boundary: Some(UPPER_BOUNDARY),
            initial_height: INITIAL_HEIGHT,
            radius: DROPLET_RADIUS,
            multiplicity: MULTIPLICITY,
            terminal_velocity: TerminalVelocityKind::default(),
            write_data_mode: WriteDataMode::Frequency(100),
        }
    }
}

impl Setup {
    pub fn from_parameters(parameters: HashMap<String, String>) -> Result<Self> {
        let default = Setup::default();
        let upper_boundary = match parameters.get("upper_boundary").map(String::as_str) {
            None => default.upper_boundary,
            Some("none") => None,
            Some(value) => Some(parse_value("upper_boundary", value)?),
        };
        let terminal_velocity = match parameters.get("terminal_velocity") {
            Some(value) => TerminalVelocityKind::parse(value)?,
            None => default.terminal_velocity,
        };
        let write_data_mode = match parameters.get("write_data_mode") {
            Some(value) => WriteDataMode::parse(value)?,
            None => default.write_data_mode,
        };
        Ok(Self {
            case_name: parameters
                .get("case_name")
                .cloned()
                .unwrap_or(default.case_name),
            dt: parse_or(&parameters, "dt", default.dt)?,
            n_steps: parse_or(&parameters, "n_steps", default.n_steps)?,
            sedimentation_enabled: parse_or(
                &parameters,
                "sedimentation",
                default.sedimentation_enabled,
            )?,
            n_sd: parse_or(&parameters, "n_sd", default.n_sd)?,
            lower_boundary: parse_or(&parameters, "lower_boundary", default.lower_boundary)?,
            upper_boundary,
            initial_height: parse_or(&parameters, "initial_height", default.initial_height)?,
            radius: parse_or(&parameters, "radius", default.radius)?,
            multiplicity: parse_or(&parameters, "multiplicity", default.multiplicity)?,
            terminal_velocity,
            write_data_mode,
        })
    }

    /// Builds the displacement dynamic and an initial column of
    /// super-droplets evenly spaced between the lower boundary and
    /// `initial_height`.
    pub fn get_displacement(&self) -> Result<(Displacement, Particles)> {
        let domain = Domain::new(self.lower_boundary, self.upper_boundary)?;
        if !(self.initial_height.is_finite() && domain.contains(self.initial_height)) {
            return Err(SimulationError::DomainConfiguration(format!(
                "initial height {} lies outside the domain",
                self.initial_height
            )));
        }
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(SimulationError::InvalidParameter {
                key: String::from("radius"),
                value: self.radius.to_string(),
            });
        }
        let displacement = Displacement::new(self.dt, self.sedimentation_enabled, domain)?;

        let spacing = (self.initial_height - self.lower_boundary) / self.n_sd as Float;
        let z = (0..self.n_sd)
            .map(|i| self.lower_boundary + (i as Float + 0.5) * spacing)
            .collect();
        let particles = Particles::new(
            z,
            vec![self.radius; self.n_sd],
            vec![self.multiplicity; self.n_sd],
        )?;
        Ok((displacement, particles))
    }

    pub fn terminal_velocity_provider(&self) -> Box<dyn TerminalVelocity> {
        self.terminal_velocity.provider()
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| SimulationError::InvalidParameter {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn parse_or<T: FromStr>(parameters: &HashMap<String, String>, key: &str, default: T) -> Result<T> {
    match parameters.get(key) {
        Some(value) => parse_value(key, value),
        None => Ok(default),
    }
}
