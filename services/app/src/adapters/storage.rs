//! services/app/src/adapters/storage.rs
//!
//! File-backed implementation of the `SessionStorage` port: one JSON file
//! holding the serialized session record, the durable-storage analog of the
//! original's single localStorage key.

use std::io::ErrorKind;
use std::path::PathBuf;

use polaris_core::domain::User;
use polaris_core::ports::SessionStorage;
use tracing::warn;

pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStorage for FileSessionStorage {
    /// A missing file means no session; so does a malformed record, which
    /// is discarded rather than allowed to break restoration.
    fn load(&self) -> Option<User> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!("Discarding malformed session record: {}", e);
                None
            }
        }
    }

    fn save(&self, user: &User) -> std::io::Result<()> {
        let raw = serde_json::to_string(user)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, raw)
    }

    fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!("Failed to remove session record: {}", e);
            }
        }
    }
}
