use std::env::var;
use std::fs::{File, remove_file};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::constants::{FALLBACK_DIR, LOCK_FILE, RUNTIME_DIR, STATE_FILE};
use crate::prelude::*;

/// Outcome of a lock attempt. `AlreadyHeld` is the signal that a daemon
/// instance owns the lock and this invocation should act as a toggle.
#[derive(Debug)]
pub enum LockOutcome {
    Acquired(File),
    AlreadyHeld,
}

/// Directory holding the lock and state files. `XDG_RUNTIME_DIR` is
/// honoured only when it is an absolute path.
pub fn runtime_dir() -> PathBuf {
    match var(RUNTIME_DIR) {
        Ok(dir) if Path::new(&dir).is_absolute() => PathBuf::from(dir),
        _ => PathBuf::from(FALLBACK_DIR),
    }
}

pub fn lock_path() -> PathBuf {
    runtime_dir().join(LOCK_FILE)
}

pub fn state_path() -> PathBuf {
    runtime_dir().join(STATE_FILE)
}

/// Tries to take the whole-file exclusive lock without blocking. Failing
/// to create the file is an error; failing to lock it means another
/// instance is alive. The lock is held as long as the returned `File` is.
pub fn try_acquire(path: &Path) -> Result<LockOutcome> {
    let file = File::create(path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(LockOutcome::Acquired(file)),
        Err(_) => Ok(LockOutcome::AlreadyHeld),
    }
}

/// Best-effort removal of the lock file path. The OS drops the lock itself
/// when the owning process dies; unlinking only keeps the runtime
/// directory free of a stale entry.
pub fn unlink_lock_file(path: &Path) {
    if let Err(e) = remove_file(path) {
        debug!("Could not remove lock file {}: {e}", path.display());
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]
    use std::sync::{LazyLock, Mutex};

    use super::*;

    // runtime_dir tests mutate the process environment
    static TEST_MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    fn temp_lock_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("focus-last-lock-{}-{name}.lock", std::process::id()))
    }

    #[test]
    fn second_acquire_sees_already_held() {
        let path = temp_lock_path("contended");

        let first = try_acquire(&path).unwrap();
        assert!(matches!(first, LockOutcome::Acquired(_)));
        assert!(matches!(try_acquire(&path).unwrap(), LockOutcome::AlreadyHeld));
        // a toggle invocation must never block, so a third attempt while
        // the lock is held has to come straight back too
        assert!(matches!(try_acquire(&path).unwrap(), LockOutcome::AlreadyHeld));

        drop(first);
        assert!(matches!(try_acquire(&path).unwrap(), LockOutcome::Acquired(_)));

        remove_file(&path).unwrap();
    }

    #[test]
    fn lock_is_released_with_its_handle() {
        let path = temp_lock_path("released");

        drop(try_acquire(&path).unwrap());
        assert!(matches!(try_acquire(&path).unwrap(), LockOutcome::Acquired(_)));

        remove_file(&path).unwrap();
    }

    #[test]
    fn unlink_is_best_effort() {
        let path = temp_lock_path("unlinked");

        File::create(&path).unwrap();
        unlink_lock_file(&path);
        assert!(!path.exists());

        // unlinking an absent path must not panic
        unlink_lock_file(&path);
    }

    #[test]
    fn runtime_dir_requires_an_absolute_path() {
        let _guard = TEST_MUTEX.lock().unwrap();

        unsafe { std::env::set_var(RUNTIME_DIR, "/run/user/1000") };
        assert_eq!(runtime_dir(), PathBuf::from("/run/user/1000"));
        assert_eq!(lock_path(), PathBuf::from("/run/user/1000").join(LOCK_FILE));
        assert_eq!(state_path(), PathBuf::from("/run/user/1000").join(STATE_FILE));

        unsafe { std::env::set_var(RUNTIME_DIR, "run/user/1000") };
        assert_eq!(runtime_dir(), PathBuf::from(FALLBACK_DIR));

        unsafe { std::env::remove_var(RUNTIME_DIR) };
        assert_eq!(runtime_dir(), PathBuf::from(FALLBACK_DIR));
    }
}
