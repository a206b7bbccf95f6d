//! `relaunch recent`: show or forget the remembered paths

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::recent::{RecentPaths, RecentPathsStore};

fn store_at(file: Option<PathBuf>) -> RecentPathsStore {
    file.map(RecentPathsStore::new)
        .unwrap_or_else(RecentPathsStore::default_location)
}

/// Remove the record. Returns whether there was one.
pub fn clear(store: &RecentPathsStore) -> Result<bool> {
    match fs::remove_file(store.path()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e)
            .with_context(|| format!("Failed to remove {}", store.path().display())),
    }
}

fn print_entry(label: &str, value: &str) {
    if value.is_empty() {
        println!("  {:<8} {}", label, "(not set)".dimmed());
    } else {
        println!("  {:<8} {}", label, value);
    }
}

pub fn execute(file: Option<PathBuf>, clear_paths: bool) -> Result<()> {
    let store = store_at(file);

    if clear_paths {
        if clear(&store)? {
            println!("{} Forgot recent paths", "✓".green().bold());
        } else {
            println!("{} No recent paths saved", "─".dimmed());
        }
        return Ok(());
    }

    let RecentPaths {
        worker_path,
        job_path,
        log_path,
    } = store.try_load()?;
    println!("{} {}", "Recent paths".bold(), store.path().display().to_string().dimmed());
    print_entry("worker", &worker_path);
    print_entry("job", &job_path);
    print_entry("log", &log_path);
    Ok(())
}
