use std::env;
use std::error::Error;
use std::io;
use std::process;

use rusty_rollup::Report;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        process::exit(1);
    }
}

/// Logs go to stderr so stdout only carries the report. `RUST_LOG` overrides
/// the default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}

const USAGE: &str = "Usage: cargo run -- [--async] [--report sums|types|status] transactions.csv";

fn run() -> Result<(), Box<dyn Error>> {
    let mut use_async = false;
    let mut report = Report::default();
    let mut path = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--async" => use_async = true,
            "--report" => report = args.next().ok_or(USAGE)?.parse()?,
            _ if path.is_none() => path = Some(arg),
            _ => return Err(USAGE.into()),
        }
    }
    let path = path.ok_or(USAGE)?;

    if use_async {
        let runtime = tokio::runtime::Runtime::new()?;
        runtime
            .block_on(rusty_rollup::run_async(path, report, io::stdout().lock()))
            .map_err(|err| err as Box<dyn Error>)
    } else {
        rusty_rollup::run(path, report, io::stdout().lock())
    }
}
