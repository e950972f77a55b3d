pub mod displacement;
pub mod error;
pub mod global_variables;
pub mod io;
pub mod logging;
pub mod particles;
pub mod post;
pub mod terminal_velocity;

pub use error::{Result, SimulationError};
pub use global_variables::*;
pub use particles::Particles;
pub use terminal_velocity::{ConstantTerminalVelocity, RogersYau, TerminalVelocity};
