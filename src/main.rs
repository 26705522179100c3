use anyhow::Context;                            // Context for report write errors
use clap::Parser;                               // Command-line parsing
use piapprox::{report, Backend, Coordinator, LogLevel, OutputFormat, RunConfig};
use std::io::{self, Write};                     // Output with flush
use std::process::ExitCode;                     // Exit status 1 on any failure
use std::time::Instant;                         // Timing for the report
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Approximate pi with the Monte Carlo method over a fixed pool of workers
#[derive(Parser, Debug)]
#[command(name = "piapprox")]
#[command(version, about, long_about = None)]
struct Args {
    /// Total number of random points to draw (must be > 1)
    samples: u64,

    /// Number of workers; more workers than points runs on one
    workers: usize,

    /// Execution backend (threads, rayon)
    #[arg(short, long, env = "PIAPPROX_BACKEND", default_value_t = Backend::Threads)]
    backend: Backend,

    /// Report format (text, json)
    #[arg(short, long, env = "PIAPPROX_FORMAT", default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(long, env = "PIAPPROX_LOG_LEVEL", default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

impl From<Args> for RunConfig {
    fn from(args: Args) -> Self {
        RunConfig {
            samples: args.samples,
            workers: args.workers,
            backend: args.backend,
            format: args.format,
            log_level: args.log_level,
        }
    }
}

fn init_tracing(log_level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(config: &RunConfig) -> anyhow::Result<()> {
    let start = Instant::now(); // Timing starts before the workers are spawned
    let estimate = Coordinator::new(config.backend).estimate(config.samples, config.workers)?;
    let elapsed = start.elapsed(); // Everything joined and summed

    let stdout = io::stdout();
    let mut out = stdout.lock(); // Report goes to stdout, logs to stderr
    let written = match config.format {
        OutputFormat::Text => report::write_text(&mut out, &estimate, elapsed),
        OutputFormat::Json => report::write_json(&mut out, &estimate, elapsed),
    };
    written
        .and_then(|()| out.flush())
        .context("failed to write report")
}

fn main() -> ExitCode {
    let config: RunConfig = Args::parse().into();
    init_tracing(config.log_level);

    tracing::debug!(
        version = piapprox::VERSION,
        samples = config.samples,
        workers = config.workers,
        backend = %config.backend,
        format = %config.format,
        "starting"
    );

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
