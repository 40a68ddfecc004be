//! Host collaborators: persisted document storage and the analysis capability.

use crate::error::{PropertiesError, Result};
use crate::models::ProjectId;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

pub const PROPERTIES_FILE: &str = ".pmd";
pub const CAPABILITY_FILE: &str = ".pmd-enabled";

/// Byte-level access to a project's persisted properties document.
pub trait PropertiesStorage: Send + Sync {
    /// `Ok(None)` when the project has no document yet.
    fn read(&self, project: &ProjectId) -> Result<Option<Vec<u8>>>;
    fn write(&self, project: &ProjectId, bytes: &[u8]) -> Result<()>;
}

/// Probe and toggle of the host's "analysis enabled" flag for a project.
pub trait Capability: Send + Sync {
    fn is_enabled(&self, project: &ProjectId) -> bool;
    fn set_enabled(&self, project: &ProjectId, enabled: bool) -> Result<()>;
}

#[derive(Debug, Clone)]
/// Stores the document as a dotfile in the project root.
pub struct FsStorage {
    file_name: String,
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::new(PROPERTIES_FILE)
    }
}

impl FsStorage {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn path_for(&self, project: &ProjectId) -> PathBuf {
        project.root().join(&self.file_name)
    }
}

impl PropertiesStorage for FsStorage {
    fn read(&self, project: &ProjectId) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(project);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PropertiesError::Io { path, source }),
        }
    }

    fn write(&self, project: &ProjectId, bytes: &[u8]) -> Result<()> {
        let path = self.path_for(project);
        fs::write(&path, bytes).map_err(|source| PropertiesError::Io { path, source })
    }
}

#[derive(Debug, Clone)]
/// Represents the capability as the presence of a marker file in the project root.
pub struct MarkerFileCapability {
    file_name: String,
}

impl Default for MarkerFileCapability {
    fn default() -> Self {
        Self::new(CAPABILITY_FILE)
    }
}

impl MarkerFileCapability {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }
}

impl Capability for MarkerFileCapability {
    fn is_enabled(&self, project: &ProjectId) -> bool {
        project.root().join(&self.file_name).is_file()
    }

    fn set_enabled(&self, project: &ProjectId, enabled: bool) -> Result<()> {
        let path = project.root().join(&self.file_name);
        let res = if enabled {
            fs::write(&path, b"")
        } else {
            match fs::remove_file(&path) {
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                other => other,
            }
        };
        res.map_err(|source| PropertiesError::Io { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_fs_storage_read_missing_then_write() {
        let dir = tempdir().unwrap();
        let project = ProjectId::new(dir.path());
        let storage = FsStorage::default();
        assert!(storage.read(&project).unwrap().is_none());
        storage.write(&project, b"ruleSetStoredInProject = true\n").unwrap();
        assert!(dir.path().join(PROPERTIES_FILE).exists());
        assert_eq!(
            storage.read(&project).unwrap().unwrap(),
            b"ruleSetStoredInProject = true\n".to_vec()
        );
    }

    #[test]
    fn test_fs_storage_write_into_missing_dir_fails() {
        let dir = tempdir().unwrap();
        let project = ProjectId::new(dir.path().join("gone"));
        let err = FsStorage::default().write(&project, b"x").unwrap_err();
        assert!(matches!(err, PropertiesError::Io { .. }));
    }

    #[test]
    fn test_marker_capability_toggle() {
        let dir = tempdir().unwrap();
        let project = ProjectId::new(dir.path());
        let cap = MarkerFileCapability::default();
        assert!(!cap.is_enabled(&project));
        cap.set_enabled(&project, true).unwrap();
        assert!(cap.is_enabled(&project));
        cap.set_enabled(&project, false).unwrap();
        cap.set_enabled(&project, false).unwrap();
        assert!(!cap.is_enabled(&project));
    }
}
