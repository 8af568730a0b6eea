//! Persistence of the backend-assigned client identifier.
//!
//! The backend hands out a `user_id` on first contact and expects it back
//! on every later question so the conversation keeps its context.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Storage for the client identifier.
pub trait UserIdStore {
    /// Load the stored identifier, `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the backing storage cannot be read.
    fn load(&self) -> io::Result<Option<String>>;

    /// Store a new identifier, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the backing storage cannot be written.
    fn save(&mut self, user_id: &str) -> io::Result<()>;

    /// Forget the stored identifier.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the backing storage cannot be modified.
    fn clear(&mut self) -> io::Result<()>;
}

/// Identifier kept in a plain text file.
#[derive(Debug, Clone)]
pub struct FileUserIdStore {
    path: PathBuf,
}

impl FileUserIdStore {
    /// Create a store backed by `path`. The file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UserIdStore for FileUserIdStore {
    fn load(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| id.to_owned()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn save(&mut self, user_id: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, user_id)
    }

    fn clear(&mut self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Identifier kept in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserIdStore {
    user_id: Option<String>,
}

impl MemoryUserIdStore {
    /// Create a store that already holds `user_id`.
    #[must_use]
    pub fn with_user_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
        }
    }
}

impl UserIdStore for MemoryUserIdStore {
    fn load(&self) -> io::Result<Option<String>> {
        Ok(self.user_id.clone())
    }

    fn save(&mut self, user_id: &str) -> io::Result<()> {
        self.user_id = Some(user_id.to_owned());
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.user_id = None;
        Ok(())
    }
}
