//! Name-based liveness check against the OS process table

#[cfg(target_os = "linux")]
use std::fs;
#[cfg(not(target_os = "linux"))]
use std::process::Command;

use tracing::trace;

use super::is_process_alive;
use crate::error::LivenessQueryError;

/// Answers "is a process matching this name running?".
///
/// `Err` means the question could not be answered, which is not the same as "no".
pub trait ProcessProbe: Send + Sync {
    fn is_running(&self, name_hint: &str) -> Result<bool, LivenessQueryError>;
}

/// [`ProcessProbe`] backed by the real process table.
///
/// A process matches when its name or the file name of its executable contains
/// the hint, case-insensitively. Zombies and this process itself never match.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessTable;

impl ProcessProbe for ProcessTable {
    fn is_running(&self, name_hint: &str) -> Result<bool, LivenessQueryError> {
        let hint = name_hint.to_lowercase();
        let own_pid = std::process::id();

        for entry in list_processes()? {
            if entry.pid == own_pid || entry.zombie {
                continue;
            }
            if entry.names.iter().any(|n| n.to_lowercase().contains(&hint))
                && is_process_alive(entry.pid)
            {
                trace!(pid = entry.pid, hint = %name_hint, "Matched running process");
                return Ok(true);
            }
        }

        Ok(false)
    }
}

#[derive(Debug, PartialEq, Eq)]
struct ProcessEntry {
    pid: u32,
    zombie: bool,
    names: Vec<String>,
}

/// Enumerate processes via /proc (Linux)
#[cfg(target_os = "linux")]
fn list_processes() -> Result<Vec<ProcessEntry>, LivenessQueryError> {
    let mut processes = Vec::new();

    for entry in fs::read_dir("/proc")?.flatten() {
        let Ok(pid) = entry.file_name().to_string_lossy().parse::<u32>() else {
            continue;
        };

        // The process may exit between listing and reading; skip it if so
        let Ok(stat) = fs::read_to_string(entry.path().join("stat")) else {
            continue;
        };
        let Some((comm, state)) = parse_proc_stat(&stat) else {
            continue;
        };

        let mut names = vec![comm.to_string()];
        if let Ok(cmdline) = fs::read(entry.path().join("cmdline")) {
            if let Some(exe) = argv0_file_name(&cmdline) {
                names.push(exe);
            }
        }

        processes.push(ProcessEntry {
            pid,
            zombie: matches!(state, 'Z' | 'X'),
            names,
        });
    }

    Ok(processes)
}

/// Enumerate processes via `ps` (macOS and other Unixes)
#[cfg(not(target_os = "linux"))]
fn list_processes() -> Result<Vec<ProcessEntry>, LivenessQueryError> {
    let output = Command::new("ps").args(["-axo", "pid=,stat=,comm="]).output()?;
    if !output.status.success() {
        return Err(LivenessQueryError::Command(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(parse_ps_line)
        .collect())
}

/// Split `/proc/<pid>/stat` into the command name and state letter.
///
/// The name sits in parentheses and may itself contain spaces or `)`.
fn parse_proc_stat(stat: &str) -> Option<(&str, char)> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    if close < open {
        return None;
    }
    let comm = &stat[open + 1..close];
    let state = stat[close + 1..].trim_start().chars().next()?;
    Some((comm, state))
}

/// File name of argv[0] from a NUL-separated `/proc/<pid>/cmdline`.
fn argv0_file_name(cmdline: &[u8]) -> Option<String> {
    let argv0 = cmdline.split(|&b| b == 0).next()?;
    if argv0.is_empty() {
        return None;
    }
    let argv0 = String::from_utf8_lossy(argv0);
    let name = argv0.rsplit(['/', '\\']).next()?;
    Some(name.to_string())
}

/// Parse one line of `ps -axo pid=,stat=,comm=`.
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn parse_ps_line(line: &str) -> Option<ProcessEntry> {
    let mut parts = line.split_whitespace();
    let pid = parts.next()?.parse().ok()?;
    let stat = parts.next()?;
    let command = parts.collect::<Vec<_>>().join(" ");
    if command.is_empty() {
        return None;
    }
    let exe = command.rsplit('/').next().unwrap_or(&command).to_string();

    Some(ProcessEntry {
        pid,
        zombie: stat.starts_with('Z'),
        names: vec![command, exe],
    })
}
