use crate::global_variables::Float;
use thiserror::Error;

/// Errors surfaced to the simulation loop. None of them are transient.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid timestep {0}: it must be finite and greater than zero")]
    InvalidTimestep(Float),

    #[error("terminal velocity field has {actual} values but there are {expected} active super-droplets")]
    VelocityFieldMismatch { expected: usize, actual: usize },

    #[error("terminal velocity {value} at position {index} must be finite and non-negative")]
    InvalidTerminalVelocity { index: usize, value: Float },

    #[error("invalid domain configuration: {0}")]
    DomainConfiguration(String),

    #[error("attribute `{attribute}` has {actual} values, expected {expected}")]
    AttributeLengthMismatch {
        attribute: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("total multiplicity of the super-droplets does not fit in 64 bits")]
    MultiplicityOverflow,

    #[error("invalid value `{value}` for parameter `{key}`")]
    InvalidParameter { key: String, value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
