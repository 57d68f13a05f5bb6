use clap::Parser;
use std::sync::Mutex;
use tabpipe::cli::{Cli, chain_command};
use tabpipe::config::constants;
use tabpipe::logging::create_log_file;
use tabpipe::pipeline::StageContext;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    constants::init_constants();

    let (file_layer, log_file) = match create_log_file() {
        Ok(log) => (
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(log.file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_level(true)
                    .with_filter(EnvFilter::new("debug")),
            ),
            Ok(log.path),
        ),
        Err(e) => (None, Err(e.to_string())),
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_level(true)
                .with_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
                ),
        )
        .with(file_layer)
        .init();

    match log_file {
        Ok(path) => debug!("Log file created: {}", path.display()),
        Err(e) => warn!("Running without a log file: {}", e),
    }

    std::process::exit(run());
}

fn run() -> i32 {
    let args = Cli::parse();
    let strict = args.strict;
    let commands = args.invocations().unwrap_or_else(|e| e.exit());

    let ctx = StageContext::default();
    let report = chain_command(commands, &ctx);
    report.exit_code(strict)
}
