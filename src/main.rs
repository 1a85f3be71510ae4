use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use flightmr::{MRController, MRParameters, MalformedPolicy, ScanStrategy};

/// Finds the passenger(s) with the most flights in a flight records file.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Comma separated records; the first field is the passenger id.
    #[arg(default_value = "AComp_Passenger_data_no_error.csv")]
    path: PathBuf,

    /// Number of concurrent map workers.
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Let every worker read the file from the beginning instead of seeking.
    #[arg(long)]
    rescan: bool,

    /// Skip records without passenger id instead of failing.
    #[arg(long)]
    skip_malformed: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_thread_ids(verbose >= 3)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let params = MRParameters::new()
        .set_workers(args.workers)
        .set_scan_strategy(if args.rescan { ScanStrategy::Rescan } else { ScanStrategy::Seek })
        .set_malformed_policy(if args.skip_malformed { MalformedPolicy::Skip } else { MalformedPolicy::Fail });

    let report = MRController::run(&args.path, params)
        .with_context(|| format!("counting flights in {}", args.path.display()))?;

    info!(records = report.records,
          skipped = report.skipped,
          workers = report.workers,
          started_at = %report.started_at,
          elapsed_ms = report.elapsed.whole_milliseconds() as u64,
          "run finished");
    println!("{}", report.top);
    Ok(())
}
