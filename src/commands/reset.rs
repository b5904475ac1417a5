//! Reset command implementation.

use anyhow::Result;

use crate::cmd_abstraction::RealCommandExecutor;
use crate::config::Paths;
use crate::lock::LockGuard;
use crate::pipeline;

/// Remove all artifacts and state, then deactivate.
pub async fn run(paths: &Paths) -> Result<()> {
    super::check_root()?;
    let _lock = acquire_reset_lock(paths)?;
    let executor = RealCommandExecutor::new();
    pipeline::run_reset(paths, &executor)
}

/// Take the run lock so a reset cannot race a refresh that is mid-swap.
///
/// When the state directory does not exist there is nothing to lock on (and
/// no refresh can hold the lock), so the no-op reset path proceeds without
/// creating it.
fn acquire_reset_lock(paths: &Paths) -> Result<Option<LockGuard>> {
    if paths.state_dir.exists() {
        Ok(Some(LockGuard::acquire(paths)?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_reset_refused_while_lock_held() {
        let root = tempdir().unwrap();
        let paths = Paths::new(root.path(), root.path().join("fw"));

        let guard = LockGuard::acquire(&paths).unwrap();
        assert!(acquire_reset_lock(&paths).is_err());
        drop(guard);
        assert!(acquire_reset_lock(&paths).unwrap().is_some());
    }

    #[test]
    fn test_reset_lock_skipped_without_state_dir() {
        let root = tempdir().unwrap();
        let paths = Paths::new(root.path().join("state"), root.path().join("fw"));

        assert!(acquire_reset_lock(&paths).unwrap().is_none());
        // The no-op path must not create the state directory as a side effect.
        assert!(!paths.state_dir.exists());
    }
}
