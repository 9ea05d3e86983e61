use specdeck::{core, status::ExitStatus};
use tracing_subscriber::EnvFilter;

/// Log filter variable, e.g. `SPECDECK_LOG=specdeck=debug`
const LOG_ENV: &str = "SPECDECK_LOG";

/// Entry point - installs logging and calls core::run()
///
/// Returns ExitStatus directly, which implements std::process::Termination.
fn main() -> ExitStatus {
    let args: Vec<String> = std::env::args().collect();

    // --debug wins over the environment; arguments are not parsed yet
    let debug = args.iter().any(|a| a == "--debug");
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    core::run(args)
}
