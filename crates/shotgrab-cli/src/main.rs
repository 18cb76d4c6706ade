use shotgrab_core::logging;

mod cli;

fn main() {
    // Initialize logging as early as possible; stderr if the state dir is unusable.
    if logging::init_logging().is_err() {
        logging::init_logging_stderr();
    }

    if let Err(err) = cli::run_from_args() {
        tracing::error!("run failed: {:#}", err);
        eprintln!("shotgrab error: {:#}", err);
        std::process::exit(1);
    }
}
