use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Exclusive write lock on a workspace, held as a flock on `chores/.lock`.
///
/// The lock file is permanent. Releasing closes the handle; the path is
/// never unlinked, so every contender locks the same inode whether it
/// opened the file before or after the previous holder let go.
pub struct WorkspaceLock {
    _handle: File,
}

/// Error type for lock operations
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not create lock file at {path}: {source}")]
    Create {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not acquire lock on {path}: another ch process may be writing")]
    Busy { path: PathBuf },
}

impl WorkspaceLock {
    /// How long `acquire_default` waits for the current holder before
    /// reporting `Busy`.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

    const RETRY_INTERVAL: Duration = Duration::from_millis(25);

    /// Take the workspace write lock, waiting up to `timeout` for the
    /// current holder to release it.
    pub fn acquire(chores_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = chores_dir.join(".lock");
        let handle = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Create {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while flock_nonblocking(&handle).is_err() {
            if Instant::now() >= deadline {
                return Err(LockError::Busy { path });
            }
            std::thread::sleep(Self::RETRY_INTERVAL);
        }
        Ok(WorkspaceLock { _handle: handle })
    }

    pub fn acquire_default(chores_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(chores_dir, Self::DEFAULT_TIMEOUT)
    }
}

/// One non-blocking LOCK_EX attempt on the open handle.
#[cfg(unix)]
fn flock_nonblocking(file: &File) -> Result<(), std::io::Error> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Non-unix builds run unlocked.
#[cfg(not(unix))]
fn flock_nonblocking(_file: &File) -> Result<(), std::io::Error> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use tempfile::TempDir;

    fn lock_dir() -> (TempDir, PathBuf) {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("chores");
        std::fs::create_dir_all(&dir).unwrap();
        (tmp, dir)
    }

    #[test]
    fn test_acquire_release_reacquire() {
        let (_tmp, dir) = lock_dir();
        let first = WorkspaceLock::acquire_default(&dir).unwrap();
        drop(first);
        assert!(WorkspaceLock::acquire_default(&dir).is_ok());
    }

    #[test]
    fn test_holder_blocks_second_acquire() {
        let (_tmp, dir) = lock_dir();
        let _held = WorkspaceLock::acquire_default(&dir).unwrap();
        let second = WorkspaceLock::acquire(&dir, Duration::from_millis(50));
        assert!(matches!(second, Err(LockError::Busy { .. })));
    }

    #[test]
    fn test_release_keeps_the_lock_file() {
        let (_tmp, dir) = lock_dir();
        let lock_path = dir.join(".lock");
        let held = WorkspaceLock::acquire_default(&dir).unwrap();
        assert!(lock_path.exists());
        drop(held);
        // Release closes the handle but must not unlink the path.
        assert!(lock_path.exists());
    }

    #[test]
    fn test_waiter_and_newcomer_contend_on_one_inode() {
        let (_tmp, dir) = lock_dir();
        let first = WorkspaceLock::acquire_default(&dir).unwrap();

        // A waiter opens the lock file while it is still held and spins.
        let waiter_dir = dir.clone();
        let (tx, rx) = mpsc::channel();
        let waiter = std::thread::spawn(move || {
            let lock = WorkspaceLock::acquire_default(&waiter_dir).unwrap();
            tx.send(()).unwrap();
            std::thread::sleep(Duration::from_millis(400));
            drop(lock);
        });

        std::thread::sleep(Duration::from_millis(50));
        drop(first);

        // Once the waiter owns the lock, a fresh open of the same path
        // must see it as busy.
        rx.recv().unwrap();
        let newcomer = WorkspaceLock::acquire(&dir, Duration::from_millis(100));
        assert!(matches!(newcomer, Err(LockError::Busy { .. })));

        waiter.join().unwrap();
        assert!(WorkspaceLock::acquire_default(&dir).is_ok());
    }

    #[test]
    fn test_default_timeout_is_five_seconds() {
        assert_eq!(WorkspaceLock::DEFAULT_TIMEOUT, Duration::from_secs(5));
    }
}
