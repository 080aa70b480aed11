//! Single-run lock.
//!
//! A sync or scheduler process records its pid in a file next to the movies
//! cache. A second process refuses to start while that pid is alive, and
//! `cancel` uses it to find the process to signal.

use anyhow::{bail, Context};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

pub const LOCK_FILE_NAME: &str = "bazarr-sync.pid";

/// Lock file location for a given movies cache path.
pub fn lock_path(movies_cache: &Path) -> PathBuf {
    movies_cache.with_file_name(LOCK_FILE_NAME)
}

/// Held for the duration of a run. The file is removed on drop.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: &Path) -> anyhow::Result<Self> {
        if let Some(pid) = read_pid(path) {
            if process_alive(pid) {
                bail!(
                    "another sync is already running (PID: {}); stop it with `bazarr-sync cancel`",
                    pid
                );
            }
            warn!(pid, path = %path.display(), "Removing stale run lock");
        }
        // A lock without a readable pid is stale as well.
        if path.exists() {
            fs::remove_file(path)
                .with_context(|| format!("Failed to remove stale lock {}", path.display()))?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .with_context(|| format!("Failed to create lock {}", path.display()))?;
        writeln!(file, "{}", std::process::id())
            .with_context(|| format!("Failed to write lock {}", path.display()))?;

        debug!(path = %path.display(), "Run lock acquired");
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove run lock");
        }
    }
}

/// Pid of the process holding the lock, if it is still running.
pub fn running_pid(path: &Path) -> Option<u32> {
    read_pid(path).filter(|pid| process_alive(*pid))
}

fn read_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    if pid == std::process::id() {
        return true;
    }
    Command::new("kill")
        .arg("-0")
        .arg(pid.to_string())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn process_alive(pid: u32) -> bool {
    pid == std::process::id()
}

/// Ask the process to stop the way Ctrl-C would.
#[cfg(unix)]
pub fn send_terminate(pid: u32) -> anyhow::Result<()> {
    let status = Command::new("kill")
        .arg("-TERM")
        .arg(pid.to_string())
        .stderr(Stdio::null())
        .status()
        .context("Failed to run kill")?;
    if !status.success() {
        bail!("kill -TERM {} exited with {}", pid, status);
    }
    Ok(())
}

#[cfg(not(unix))]
pub fn send_terminate(_pid: u32) -> anyhow::Result<()> {
    bail!("cancel is only supported on unix; press Ctrl-C in the running sync instead")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lock_path_sits_next_to_movies_cache() {
        assert_eq!(
            lock_path(Path::new("/data/movies-cache")),
            PathBuf::from("/data/bazarr-sync.pid")
        );
        assert_eq!(lock_path(Path::new("movies-cache")), PathBuf::from(LOCK_FILE_NAME));
    }

    #[test]
    fn test_acquire_writes_pid_and_drop_removes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let lock = RunLock::acquire(&path).unwrap();
        assert_eq!(read_pid(lock.path()), Some(std::process::id()));
        assert_eq!(running_pid(&path), Some(std::process::id()));

        drop(lock);
        assert!(!path.exists());
        assert_eq!(running_pid(&path), None);
    }

    #[test]
    fn test_live_lock_is_refused() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);

        let _held = RunLock::acquire(&path).unwrap();
        let err = RunLock::acquire(&path).unwrap_err();
        assert!(err.to_string().contains("already running"));
    }

    #[test]
    fn test_unreadable_lock_is_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(LOCK_FILE_NAME);
        fs::write(&path, "not a pid\n").unwrap();

        let lock = RunLock::acquire(&path).unwrap();
        assert_eq!(read_pid(lock.path()), Some(std::process::id()));
    }
}
