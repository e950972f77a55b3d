use env_logger::{Builder, Env};
use log::LevelFilter;

/// Installs the logger behind the `-v/--verbose` flag of the simulation CLI.
///
/// Without `RUST_LOG`, only this crate's messages are shown: debug level
/// (per-step removal counts) when `verbose` is set, info level (case start
/// and stop) otherwise. Dependencies stay silent unless `RUST_LOG` asks for
/// them.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp(None);

    // Tests may install a logger more than once.
    let _ = builder.try_init();
}

fn default_filter(verbose: bool) -> String {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    format!("{}={}", env!("CARGO_CRATE_NAME"), level)
}
