use crate::cache::{CacheStore, FileRecord, KeyIndex};
use crate::gemini::Classifier;
use anyhow::{Context, Result};
use chrono::Utc;
use std::path::Path;
use std::time::UNIX_EPOCH;
use walkdir::WalkDir;

/// Map phase: scan the target folder and (re)classify new or changed files.
///
/// A file is skipped when the file map already holds a record with the same
/// mtime. Classifier failures are not fatal: the file is recorded with an
/// empty key list so the run completes, and a later run with a bumped mtime
/// can retry it. Returns the number of files analyzed this run.
pub async fn run_analysis(
    target: &Path,
    classifier: &dyn Classifier,
    allowed_keys: &[String],
    cache: &CacheStore,
) -> Result<usize> {
    let mut file_map = cache.load_file_map();
    let mut analyzed: usize = 0;

    // Drop records for files that no longer exist on disk.
    let stale: Vec<String> = file_map
        .keys()
        .filter(|path| !Path::new(path.as_str()).exists())
        .cloned()
        .collect();
    for path in stale {
        tracing::debug!(path, "pruning record for deleted file");
        file_map.remove(&path);
    }

    for entry in WalkDir::new(target).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = match std::fs::canonicalize(entry.path()) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "failed to resolve path");
                continue;
            }
        };
        let path_key = path.to_string_lossy().to_string();

        let mtime_ms = match file_mtime_ms(&path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to stat file");
                continue;
            }
        };

        // Unchanged since last run: keep the cached record.
        if file_map.get(&path_key).is_some_and(|rec| rec.mtime_ms == mtime_ms) {
            continue;
        }

        let content = match std::fs::read(&path) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read file");
                continue;
            }
        };

        let mut keys = match classifier.classify(&path, &content, allowed_keys).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "classification failed");
                Vec::new()
            }
        };
        keys.sort();

        let filename = entry.file_name().to_string_lossy().to_string();
        tracing::info!(file = %filename, ?keys, "analyzed");
        file_map.insert(
            path_key,
            FileRecord {
                keys,
                mtime_ms,
                filename,
                analyzed_at: Utc::now(),
            },
        );
        analyzed += 1;
    }

    cache.save_file_map(&file_map)?;
    Ok(analyzed)
}

/// Reduce phase: invert the file map into key -> files and persist it.
pub async fn run_reduce(cache: &CacheStore) -> Result<()> {
    let file_map = cache.load_file_map();
    let mut index = KeyIndex::new();

    for (path, record) in &file_map {
        for key in &record.keys {
            index.entry(key.clone()).or_default().push(path.clone());
        }
    }

    cache.save_key_index(&index)?;
    tracing::info!(groups = index.len(), files = file_map.len(), "reduce phase complete");
    Ok(())
}

fn file_mtime_ms(path: &Path) -> Result<u64> {
    let modified = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .with_context(|| format!("no mtime for {}", path.display()))?;
    let since_epoch = modified
        .duration_since(UNIX_EPOCH)
        .context("mtime predates the unix epoch")?;
    Ok(since_epoch.as_millis() as u64)
}
