use ondemand_core::logging;

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log file under the XDG state dir; stderr if that can't be set up.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("ondemand error: {:#}", err);
        std::process::exit(1);
    }
}
