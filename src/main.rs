use std::io::{self, BufRead};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gelfpipe::adapter::{self, AdapterRegistry};
use gelfpipe::cli::Cli;
use gelfpipe::config::Config;
use gelfpipe::pipeline::{CHANNEL_CAPACITY, FanOut};

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so an upstream writer gets a clean
    // SIGPIPE instead of a BrokenPipeError when gelfpipe exits early.
    reset_sigpipe();

    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        clap_complete::generate(shell, &mut Cli::command(), "gelfpipe", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    init_logging(cli.verbose);

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("gelfpipe: {e}");
            return ExitCode::from(1);
        }
    };

    let host = config.host_identity();
    tracing::debug!(%host, "resolved host identity");
    let ctx = config.adapter_context(host);

    let mut registry = AdapterRegistry::new();
    adapter::register(&mut registry);

    let mut adapters = Vec::with_capacity(config.routes.len());
    for route in &config.routes {
        match registry.build(route, &ctx) {
            Ok(adapter) => adapters.push(adapter),
            Err(e) => {
                eprintln!("gelfpipe: {route}: {e}");
                return ExitCode::from(1);
            }
        }
    }

    let mut fan_out = match FanOut::spawn(adapters, CHANNEL_CAPACITY) {
        Ok(fan_out) => fan_out,
        Err(e) => {
            eprintln!("gelfpipe: cannot start adapter thread: {e}");
            return ExitCode::from(1);
        }
    };

    let decoder = config.line_decoder();
    let mut status = ExitCode::SUCCESS;

    for line_result in io::stdin().lock().lines() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => continue,
            Err(e) => {
                eprintln!("gelfpipe: read error: {e}");
                status = ExitCode::from(2);
                break;
            }
        };

        if let Some(record) = decoder.decode(line) {
            fan_out.dispatch(record);
        }
    }

    // Closing the channels ends every adapter's stream.
    let summary = fan_out.finish();
    if summary.panicked > 0 {
        eprintln!("gelfpipe: {} adapter thread(s) panicked", summary.panicked);
        status = ExitCode::from(2);
    }
    tracing::info!(
        received = summary.stats.received,
        sent = summary.stats.sent,
        dropped = summary.stats.dropped,
        "input closed"
    );

    status
}

/// Initialise tracing on stderr; stdout may carry messages.
///
/// `RUST_LOG` wins over the built-in filter.
fn init_logging(verbose: bool) {
    let default = if verbose { "gelfpipe=debug" } else { "gelfpipe=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors. With
/// `gelf+stdout://` routes that would turn a closed reader into a stream of
/// dropped records instead of a prompt exit.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
