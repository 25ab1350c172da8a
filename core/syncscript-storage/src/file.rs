//! File-backed adapter: one `<key>.json` file per key.

use crate::adapter::PersistenceAdapter;
use crate::error::{StorageError, StorageResult};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use syncscript_types::StorageKey;
use tracing::debug;

/// Persists each key as a JSON file inside a data directory.
///
/// Writes go to a temporary sibling and are renamed into place, so a
/// crash mid-write leaves the previous value intact.
#[derive(Debug, Clone)]
pub struct FileAdapter {
    dir: PathBuf,
    max_value_bytes: Option<usize>,
}

impl FileAdapter {
    /// Opens (creating if needed) the data directory and checks that it is
    /// writable.
    pub fn open(dir: impl AsRef<Path>) -> StorageResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        let probe = dir.join(".write-probe");
        fs::write(&probe, b"ok")?;
        fs::remove_file(&probe)?;
        Ok(Self {
            dir,
            max_value_bytes: None,
        })
    }

    /// Rejects values larger than `limit` bytes with `QuotaExceeded`.
    #[must_use]
    pub fn with_max_value_bytes(mut self, limit: Option<usize>) -> Self {
        self.max_value_bytes = limit;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The file backing `key`. Storage keys are restricted to
    /// `[a-z0-9_.-]`, so they are always safe file names.
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl PersistenceAdapter for FileAdapter {
    fn name(&self) -> &'static str {
        "file"
    }

    fn load(&self, key: &StorageKey) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &StorageKey, value: &str) -> StorageResult<()> {
        if let Some(limit) = self.max_value_bytes {
            if value.len() > limit {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                    limit,
                });
            }
        }

        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;
        debug!(key = %key, bytes = value.len(), "saved");
        Ok(())
    }

    fn remove(&self, key: &StorageKey) -> StorageResult<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
