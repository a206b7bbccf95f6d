//! `relaunch run`: supervise a worker until Ctrl+C

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::warn;

use crate::error::ConfigurationError;
use crate::recent::RecentPathsStore;
use crate::settings::SettingsFile;
use crate::supervisor::{ConsoleObserver, JobConfig, StartOutcome, Supervisor, SupervisorSettings};
use crate::worker::JobFile;

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Worker executable (defaults to the last one used)
    #[arg(short, long)]
    pub worker: Option<PathBuf>,

    /// Job file passed to the worker (defaults to the last one used)
    #[arg(short, long)]
    pub job: Option<PathBuf>,

    /// Checkpoint log the worker writes (defaults to the last one used)
    #[arg(short, long)]
    pub log: Option<PathBuf>,

    /// Process name to look for instead of the worker's file name
    #[arg(long)]
    pub process_name: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seconds between worker liveness checks
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub liveness_interval: Option<u64>,

    /// Seconds between checkpoint log reads
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub tail_interval: Option<u64>,

    /// Do not save these paths as defaults for next time
    #[arg(long)]
    pub no_remember: bool,
}

/// Resolved inputs for a run
struct Plan {
    settings: SupervisorSettings,
    config: JobConfig,
    store: RecentPathsStore,
}

fn plan(args: RunArgs) -> Result<Plan> {
    let file = match &args.config {
        Some(path) => SettingsFile::load(path)?,
        None => SettingsFile::default(),
    };

    let mut settings = file.supervisor_settings();
    if let Some(secs) = args.liveness_interval {
        settings.liveness_interval = Duration::from_secs(secs);
    }
    if let Some(secs) = args.tail_interval {
        settings.tail_interval = Duration::from_secs(secs);
    }
    if args.process_name.is_some() {
        settings.process_name = args.process_name;
    }

    let store = file
        .recent_paths_file
        .clone()
        .map(RecentPathsStore::new)
        .unwrap_or_else(RecentPathsStore::default_location);
    let recent = store.load();

    let config = JobConfig::new(
        args.worker.or_else(|| recent.worker()).unwrap_or_default(),
        args.job.or_else(|| recent.job()).unwrap_or_default(),
        args.log.or_else(|| recent.log()).unwrap_or_default(),
    );

    Ok(Plan {
        settings,
        config,
        store,
    })
}

/// Start a session and, once it has started, save its paths to `store`.
///
/// Nothing is saved when the config is rejected or a session is already active.
fn start_session(
    supervisor: &Supervisor,
    config: JobConfig,
    store: Option<&RecentPathsStore>,
) -> Result<StartOutcome, ConfigurationError> {
    let outcome = supervisor.start(config)?;
    if outcome == StartOutcome::Started {
        if let (Some(store), Some(config)) = (store, supervisor.config()) {
            store.remember(&config);
        }
    }
    Ok(outcome)
}

/// The log named in the job file, when the reference worker's job format is used and
/// it names a different log than the one being tailed.
fn job_log_mismatch(config: &JobConfig) -> Option<PathBuf> {
    let job = JobFile::load(&config.job_path).ok()?;
    (!same_location(&job.log_path, &config.log_path)).then_some(job.log_path)
}

fn same_location(a: &Path, b: &Path) -> bool {
    fn normalized(path: &Path) -> Option<PathBuf> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        Some(dir.canonicalize().ok()?.join(path.file_name()?))
    }

    a == b || matches!((normalized(a), normalized(b)), (Some(x), Some(y)) if x == y)
}

pub fn execute(args: RunArgs) -> Result<()> {
    let remember = !args.no_remember;
    let Plan {
        settings,
        config,
        store,
    } = plan(args)?;

    if let Some(job_log) = job_log_mismatch(&config) {
        warn!(
            job_log = %job_log.display(),
            log = %config.log_path.display(),
            "Job file writes to a different log"
        );
        println!(
            "{} Job file writes checkpoints to {}, but {} is being watched",
            "!".yellow().bold(),
            job_log.display(),
            config.log_path.display()
        );
    }

    let supervisor = Supervisor::new(settings, Arc::new(ConsoleObserver));
    match start_session(&supervisor, config, remember.then_some(&store)) {
        Ok(StartOutcome::Started) => {}
        Ok(StartOutcome::AlreadyRunning | StartOutcome::Stopping) => return Ok(()),
        Err(_) => bail!("Monitoring not started"),
    }

    let (tx, rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        let _ = tx.send(());
    })
    .context("Failed to set Ctrl+C handler")?;

    println!("{}", "Press Ctrl+C to stop monitoring".dimmed());
    let _ = rx.recv();

    supervisor.stop();
    Ok(())
}
