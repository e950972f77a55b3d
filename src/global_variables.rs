pub const CASE_NAME: &'static str = "Sedimentation Test";

pub type Float = f64;

pub const DELTA_T: Float = 1.0;

pub const N_STEPS: usize = 1000;

pub const N_SD: usize = 64;

pub const LOWER_BOUNDARY: Float = 0.0;

pub const UPPER_BOUNDARY: Float = 100.0;

pub const INITIAL_HEIGHT: Float = 75.0;

pub const DROPLET_RADIUS: Float = 10e-6;

pub const MULTIPLICITY: u64 = 1_000_000;

pub const CONSTANT_TERMINAL_VELOCITY: Float = 1000.0;

pub const REPORT_HEADER_FREQUENCY: usize = 100;
