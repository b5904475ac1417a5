//! Runtime path configuration.
//!
//! All filesystem locations flow through an explicit [`Paths`] object passed
//! into the pipeline, so tests can point every component at a scratch
//! directory instead of the live system.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_DIR: &str = "/var/lib/firewalld-ext";
pub const DEFAULT_FIREWALLD_DIR: &str = "/etc/firewalld";

/// Filesystem layout for state and generated artifacts.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Directory owning the persisted snapshot and the run lock.
    pub state_dir: PathBuf,
    /// firewalld configuration root.
    pub firewalld_dir: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            firewalld_dir: PathBuf::from(DEFAULT_FIREWALLD_DIR),
        }
    }
}

impl Paths {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(state_dir: P, firewalld_dir: Q) -> Self {
        Self {
            state_dir: state_dir.as_ref().to_path_buf(),
            firewalld_dir: firewalld_dir.as_ref().to_path_buf(),
        }
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.state_dir.join("snapshot.json")
    }

    pub fn lock_file(&self) -> PathBuf {
        self.state_dir.join("run.lock")
    }

    /// Staging directory for artifact generation; files are renamed out of
    /// here into their live locations.
    pub fn temp_dir(&self) -> PathBuf {
        self.firewalld_dir.join("temp")
    }

    pub fn direct_xml(&self) -> PathBuf {
        self.firewalld_dir.join("direct.xml")
    }

    pub fn ipset_dir(&self) -> PathBuf {
        self.firewalld_dir.join("ipsets")
    }

    pub fn ipset_v4(&self) -> PathBuf {
        self.ipset_dir().join("blocked_v4.xml")
    }

    pub fn ipset_v6(&self) -> PathBuf {
        self.ipset_dir().join("blocked_v6.xml")
    }

    /// The live artifact files, in promotion order.
    pub fn live_artifacts(&self) -> [PathBuf; 3] {
        [self.direct_xml(), self.ipset_v4(), self.ipset_v6()]
    }

    /// Create the directories a run writes into.
    pub fn bootstrap(&self) -> Result<()> {
        for dir in [&self.state_dir, &self.temp_dir(), &self.ipset_dir()] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout() {
        let paths = Paths::default();
        assert_eq!(
            paths.snapshot_file(),
            PathBuf::from("/var/lib/firewalld-ext/snapshot.json")
        );
        assert_eq!(
            paths.ipset_v4(),
            PathBuf::from("/etc/firewalld/ipsets/blocked_v4.xml")
        );
        assert_eq!(
            paths.direct_xml(),
            PathBuf::from("/etc/firewalld/direct.xml")
        );
        assert_eq!(paths.temp_dir(), PathBuf::from("/etc/firewalld/temp"));
    }

    #[test]
    fn test_bootstrap_creates_dirs() {
        let root = tempfile::tempdir().unwrap();
        let paths = Paths::new(root.path().join("state"), root.path().join("fw"));
        paths.bootstrap().unwrap();
        assert!(paths.state_dir.is_dir());
        assert!(paths.temp_dir().is_dir());
        assert!(paths.ipset_dir().is_dir());
    }
}
