//! `relaunch resume-point`: show where a worker would pick up from

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use crate::checkpoint::{last_checkpoint, UnitId, DEFAULT_RESUME_POINT};

/// What the log says about resuming
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResumeReport {
    pub last_checkpoint: Option<UnitId>,
    pub resume_point: UnitId,
}

pub fn inspect(log_path: &Path) -> Result<ResumeReport> {
    let last = last_checkpoint(log_path)?;
    Ok(ResumeReport {
        last_checkpoint: last,
        resume_point: last.unwrap_or(DEFAULT_RESUME_POINT),
    })
}

pub fn execute(log_path: &Path) -> Result<()> {
    let report = inspect(log_path)?;

    match report.last_checkpoint {
        Some(unit) => println!("{} Last checkpoint: {}", "✓".green().bold(), unit),
        None => println!(
            "{} No checkpoints in {}",
            "─".dimmed(),
            log_path.display()
        ),
    }
    println!(
        "{} Resuming from frame: {}",
        "→".cyan().bold(),
        report.resume_point.to_string().bold()
    );
    Ok(())
}
