//! Durable key-value slots: one JSON file per key inside a directory.
//!
//! Writes go to a sibling temp file first and are renamed into place, so a
//! reader never sees a half-written slot.

use std::path::{Path, PathBuf};

use super::StoreError;

const SLOT_EXTENSION: &str = "json";

#[derive(Debug, Clone)]
pub struct KeyValueSlots {
    dir: PathBuf,
}

impl KeyValueSlots {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Read a slot. A slot that was never written reads as `None`.
    pub async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a slot's value atomically.
    pub async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let tmp = path.with_extension(format!("{SLOT_EXTENSION}.tmp"));
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Keys are restricted to `[A-Za-z0-9_-]` so they cannot escape `dir`.
    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.{SLOT_EXTENSION}")))
    }
}
