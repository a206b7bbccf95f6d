//! Reference worker for `relaunch`
//!
//! Loads a job file, resumes from the last checkpoint in the job's log, and
//! appends a checkpoint line after every unit it finishes.

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use relaunch::logging;
use relaunch::worker::{CheckpointWriter, JobFile, SimulatedWorker, WorkerRuntime};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "relaunch-worker")]
#[command(about = "Process a job's units, checkpointing each one", long_about = None)]
#[command(version)]
struct Cli {
    /// Job file (TOML)
    job: PathBuf,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<()> {
    let job = JobFile::load(&cli.job)?;
    let hold = job.hold_on_finish;

    let writer = CheckpointWriter::open(&job.log_path)
        .context("Failed to open checkpoint log")?;

    let mut runtime = WorkerRuntime::new(SimulatedWorker::new(job));
    runtime.set_load_handler(Box::new(writer));
    runtime.load_job();
    runtime.run_pending()?;

    info!(completed = runtime.host().completed(), "Job finished");

    // An interactive worker stays open after its last unit.
    if hold {
        loop {
            thread::park_timeout(Duration::from_secs(3600));
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            ExitCode::from(101)
        }
    }
}
