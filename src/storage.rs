//! Persistence collaborators: byte-level load/save of the settings document.
//!
//! The store only ever sees opaque bytes through [`ConfigStorage`]; what sits
//! behind it (a file, a test buffer, a database) is a deployment choice.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{Error, Result};
use crate::sync::MutexExt;

/// Byte-level storage for the persisted configuration document.
pub trait ConfigStorage: Send + Sync {
    /// Read the persisted document. `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Vec<u8>>>;

    /// Write the full document.
    fn save(&self, bytes: &[u8]) -> Result<()>;
}

// =============================================================================
// File Storage
// =============================================================================

/// File-backed storage with atomic writes (temp file + rename).
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default document location under the platform config directory.
    pub fn default_path(app: &str) -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(app)
            .join("config.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStorage for FileStorage {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::FileRead {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::DirectoryCreate {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        // Atomic write: temp file + rename
        let file_name = self.path.file_name().ok_or_else(|| {
            Error::Storage(format!(
                "Invalid path '{}': must have a filename",
                self.path.display()
            ))
        })?;
        let mut temp_filename = file_name.to_os_string();
        temp_filename.push(".tmp");
        let temp_path = self.path.with_file_name(temp_filename);

        std::fs::write(&temp_path, bytes).map_err(|e| Error::FileWrite {
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &self.path).map_err(|e| Error::FileWrite {
            path: self.path.clone(),
            source: e,
        })
    }
}

// =============================================================================
// Memory Storage
// =============================================================================

/// In-memory storage, mainly for tests.
#[derive(Default)]
pub struct MemoryStorage {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with a pre-existing document.
    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes.into())),
        }
    }

    /// Snapshot of the last saved document, if any.
    pub fn contents(&self) -> Option<Vec<u8>> {
        self.bytes.lock_recovered().clone()
    }
}

impl ConfigStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.bytes.lock_recovered().clone())
    }

    fn save(&self, bytes: &[u8]) -> Result<()> {
        *self.bytes.lock_recovered() = Some(bytes.to_vec());
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
