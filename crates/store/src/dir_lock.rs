//! Exclusive lock on a data directory.
//!
//! Every [`crate::FileStore`] call holds a `flock` on `lot.lock` for its
//! whole read-check-write. `flock` locks belong to the open file description,
//! so two handles conflict whether they live in one process or in two.

use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::store_error::StoreError;

/// Name of the lock file inside the data directory.
pub const LOCK_FILE: &str = "lot.lock";

/// Held lock; released on drop.
pub struct DirLock {
    #[cfg(unix)]
    _flock: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _file: File,
}

/// Block until the exclusive lock on `dir` is ours.
pub fn lock_dir(dir: &Path) -> Result<DirLock, StoreError> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(dir.join(LOCK_FILE))?;

    #[cfg(unix)]
    {
        use nix::fcntl::{Flock, FlockArg};
        let flock = Flock::lock(file, FlockArg::LockExclusive)
            .map_err(|(_, errno)| StoreError::Io(errno.into()))?;
        Ok(DirLock { _flock: flock })
    }
    // No OS lock off unix; handles in one process still share the
    // `FileStore` mutex.
    #[cfg(not(unix))]
    {
        Ok(DirLock { _file: file })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn test_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from(format!("/tmp/parking_dir_lock_test_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_second_lock_waits_for_first() {
        let dir = test_dir("waits");
        let first = lock_dir(&dir).unwrap();
        assert!(dir.join(LOCK_FILE).exists());

        let (tx, rx) = mpsc::channel();
        let waiter_dir = dir.clone();
        let waiter = thread::spawn(move || {
            let _second = lock_dir(&waiter_dir).unwrap();
            tx.send(()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
        drop(first);
        rx.recv_timeout(Duration::from_secs(5)).unwrap();
        waiter.join().unwrap();

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_relock_after_drop() {
        let dir = test_dir("relock");
        drop(lock_dir(&dir).unwrap());
        drop(lock_dir(&dir).unwrap());
        let _ = fs::remove_dir_all(&dir);
    }
}
