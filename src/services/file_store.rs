//! File-backed key-value store, one JSON file per key

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::key_value::KeyValueStore;
use crate::error::PersistenceError;

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-save never leaves a truncated document behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid storage key {:?}", key),
            ));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let read_err = |source: io::Error| PersistenceError::Read {
            key: key.to_string(),
            source,
        };
        let path = self.path_for(key).map_err(read_err)?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(read_err(e)),
        }
    }

    async fn save(&self, key: &str, value: &[u8]) -> Result<(), PersistenceError> {
        let write_err = |source: io::Error| PersistenceError::Write {
            key: key.to_string(),
            source,
        };
        let path = self.path_for(key).map_err(write_err)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));

        fs::create_dir_all(&self.dir).await.map_err(write_err)?;
        fs::write(&tmp, value).await.map_err(write_err)?;
        fs::rename(&tmp, &path).await.map_err(write_err)?;

        debug!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }
}
