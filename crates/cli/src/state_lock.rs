//! Advisory lock around the registry state file.
//!
//! Mutating commands hold the exclusive lock from load until the new snapshot
//! is persisted; read-only commands hold a shared lock while loading.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct StateLock {
    path: PathBuf,
    file: File,
}

impl StateLock {
    /// Block until no other process or thread holds the state lock.
    pub fn exclusive(state_path: &Path, purpose: &str) -> Result<Self> {
        let (path, file) = open_lock_file(state_path)?;
        FileExt::lock_exclusive(&file)
            .with_context(|| format!("failed to lock {}", path.display()))?;

        file.set_len(0)?;
        writeln!(&file, "pid={};purpose={}", std::process::id(), purpose)?;
        debug!(path = %path.display(), purpose, "State lock acquired");

        Ok(Self { path, file })
    }

    /// Block until no writer holds the state lock.
    pub fn shared(state_path: &Path) -> Result<Self> {
        let (path, file) = open_lock_file(state_path)?;
        FileExt::lock_shared(&file)
            .with_context(|| format!("failed to lock {}", path.display()))?;
        Ok(Self { path, file })
    }
}

impl Drop for StateLock {
    // The lock file stays on disk: unlinking it would let a waiter lock a
    // stale inode while a newcomer locks a fresh one.
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(path = %self.path.display(), "State lock released");
    }
}

/// `<state>.lock`, next to the state file.
pub fn lock_path(state_path: &Path) -> PathBuf {
    let mut name = state_path.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}

fn open_lock_file(state_path: &Path) -> Result<(PathBuf, File)> {
    if let Some(parent) = state_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let path = lock_path(state_path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&path)
        .with_context(|| format!("failed to open lock file {}", path.display()))?;
    Ok((path, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn lock_file_sits_next_to_state() {
        assert_eq!(
            lock_path(Path::new("/var/lib/diploma/registry.json")),
            PathBuf::from("/var/lib/diploma/registry.json.lock")
        );
    }

    #[test]
    fn exclusive_lock_blocks_second_writer() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("registry.json");

        let first = StateLock::exclusive(&state, "issue").unwrap();
        let contents = fs::read_to_string(lock_path(&state)).unwrap();
        assert!(contents.contains("purpose=issue"));

        let released = Arc::new(AtomicBool::new(false));
        let waiter = {
            let state = state.clone();
            let released = Arc::clone(&released);
            thread::spawn(move || {
                let _second = StateLock::exclusive(&state, "issue").unwrap();
                released.load(Ordering::SeqCst)
            })
        };

        thread::sleep(Duration::from_millis(100));
        released.store(true, Ordering::SeqCst);
        drop(first);

        assert!(waiter.join().unwrap());
        assert!(lock_path(&state).exists());
    }

    #[test]
    fn shared_locks_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("registry.json");

        let _a = StateLock::shared(&state).unwrap();
        let _b = StateLock::shared(&state).unwrap();
    }
}
