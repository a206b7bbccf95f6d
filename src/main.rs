use anyhow::Result;
use clap::{Parser, Subcommand};
use relaunch::commands::{recent, resume_point, run};
use relaunch::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "relaunch")]
#[command(about = "Keep a checkpointed worker running and report its progress", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Supervise a worker: restart it when it dies and report completed units
    Run(run::RunArgs),

    /// Show the unit a worker would resume from, given its checkpoint log
    ResumePoint {
        /// Path to the checkpoint log
        log: PathBuf,
    },

    /// Show the remembered worker, job, and log paths
    Recent {
        /// Recent-paths file (defaults to the one in the user config directory)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Forget the remembered paths
        #[arg(long)]
        clear: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run(args) => run::execute(args),
        Commands::ResumePoint { log } => resume_point::execute(&log),
        Commands::Recent { file, clear } => recent::execute(file, clear),
    }
}
