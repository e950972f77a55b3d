use crate::error::{Result, SimulationError};
use crate::global_variables::*;
use crate::particles::Particles;
use rayon::prelude::*;

/// Supplies one settling speed per active super-droplet, in
/// `Particles::active_ids` order.
pub trait TerminalVelocity: Send + Sync {
    fn compute(&self, particles: &Particles) -> Vec<Float>;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConstantTerminalVelocity {
    pub value: Float,
}

impl ConstantTerminalVelocity {
    pub fn new(value: Float) -> Self {
        Self { value }
    }
}

impl TerminalVelocity for ConstantTerminalVelocity {
    fn compute(&self, particles: &Particles) -> Vec<Float> {
        vec![self.value; particles.sd_num()]
    }
}

/// Piecewise radius law from Rogers & Yau (1989), in SI units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RogersYau {
    pub k1: Float,
    pub k2: Float,
    pub k3: Float,
    pub r0: Float,
    pub r1: Float,
}

impl Default for RogersYau {
    fn default() -> Self {
        Self {
            k1: 1.19e8,
            k2: 8e3,
            k3: 201.0,
            r0: 35e-6,
            r1: 600e-6,
        }
    }
}

impl RogersYau {
    pub fn velocity(&self, radius: Float) -> Float {
        if radius < self.r0 {
            self.k1 * radius * radius
        } else if radius < self.r1 {
            self.k2 * radius
        } else {
            self.k3 * radius.sqrt()
        }
    }
}

impl TerminalVelocity for RogersYau {
    fn compute(&self, particles: &Particles) -> Vec<Float> {
        particles
            .active_ids()
            .par_iter()
            .map(|&slot| self.velocity(particles.radius(slot)))
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TerminalVelocityKind {
    Constant(Float),
    RogersYau,
}

impl TerminalVelocityKind {
    /// Parses `constant <value>` or `rogers_yau`.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || SimulationError::InvalidParameter {
            key: String::from("terminal_velocity"),
            value: value.to_string(),
        };
        let mut words = value.split_whitespace();
        match words.next() {
            Some("constant") => {
                let velocity = words
                    .next()
                    .ok_or_else(invalid)?
                    .parse::<Float>()
                    .map_err(|_| invalid())?;
                if !velocity.is_finite() || velocity < 0.0 {
                    return Err(invalid());
                }
                Ok(TerminalVelocityKind::Constant(velocity))
            }
            Some("rogers_yau") => Ok(TerminalVelocityKind::RogersYau),
            _ => Err(invalid()),
        }
    }

    pub fn provider(&self) -> Box<dyn TerminalVelocity> {
        match *self {
            TerminalVelocityKind::Constant(value) => Box::new(ConstantTerminalVelocity::new(value)),
            TerminalVelocityKind::RogersYau => Box::new(RogersYau::default()),
        }
    }
}

impl Default for TerminalVelocityKind {
    fn default() -> Self {
        TerminalVelocityKind::Constant(CONSTANT_TERMINAL_VELOCITY)
    }
}
