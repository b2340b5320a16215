use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const FILE_TO_KEY: &str = "file-to-key.json";
const KEY_TO_FILE: &str = "key-to-file.json";

/// One analyzed file, keyed in the file map by its absolute path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    pub keys: Vec<String>,
    pub mtime_ms: u64,
    pub filename: String,
    pub analyzed_at: DateTime<Utc>,
}

/// file path -> record of its keys (the "map" side of the pipeline).
pub type FileMap = BTreeMap<String, FileRecord>;

/// tag key -> file paths carrying it (the "reduce" side).
pub type KeyIndex = BTreeMap<String, Vec<String>>;

/// Owns the cache directory and its two JSON documents.
///
/// Both documents tolerate being missing or corrupt: they load as empty and
/// are rewritten wholesale on save. BTreeMap keeps them deterministically
/// ordered, which the view layer relies on.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the cache directory and both documents exist.
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create cache dir: {}", self.dir.display()))?;
        if !self.file_map_path().exists() {
            self.save_file_map(&FileMap::new())?;
        }
        if !self.key_index_path().exists() {
            self.save_key_index(&KeyIndex::new())?;
        }
        Ok(())
    }

    pub fn load_file_map(&self) -> FileMap {
        read_json(&self.file_map_path())
    }

    pub fn save_file_map(&self, map: &FileMap) -> Result<()> {
        write_json(&self.file_map_path(), map)
    }

    pub fn load_key_index(&self) -> KeyIndex {
        read_json(&self.key_index_path())
    }

    pub fn save_key_index(&self, index: &KeyIndex) -> Result<()> {
        write_json(&self.key_index_path(), index)
    }

    /// Reset both documents to empty.
    pub fn clear_all(&self) -> Result<()> {
        tracing::info!(dir = %self.dir.display(), "clearing caches");
        self.save_file_map(&FileMap::new())?;
        self.save_key_index(&KeyIndex::new())
    }

    fn file_map_path(&self) -> PathBuf {
        self.dir.join(FILE_TO_KEY)
    }

    fn key_index_path(&self) -> PathBuf {
        self.dir.join(KEY_TO_FILE)
    }
}

/// Missing or unparseable documents are treated as empty rather than fatal.
fn read_json<T: serde::de::DeserializeOwned + Default>(path: &Path) -> T {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return T::default(),
    };
    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "corrupt cache file, starting empty");
            T::default()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .context("Failed to serialize cache document")?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))
}
