use crate::cache::{FileMap, KeyIndex};
use serde::Serialize;
use std::collections::BTreeMap;

/// One file as the dashboard shows it: display name plus every key the file
/// carries, so the renderer can mark the pill matching the enclosing group.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FileEntry {
    pub name: String,
    pub all_keys: Vec<String>,
}

/// group key -> files in that group, iterated in sorted key order.
pub type GroupedView = BTreeMap<String, Vec<FileEntry>>;

/// Join the key index against the file map into the shape the UI consumes.
///
/// Index entries whose path has no file-map record are dropped; the two
/// documents can briefly disagree when a reduce predates a prune.
pub fn build_view(key_index: &KeyIndex, file_map: &FileMap) -> GroupedView {
    let mut view = GroupedView::new();

    for (group_key, paths) in key_index {
        let files: Vec<FileEntry> = paths
            .iter()
            .filter_map(|path| {
                file_map.get(path).map(|record| FileEntry {
                    name: record.filename.clone(),
                    all_keys: record.keys.clone(),
                })
            })
            .collect();
        view.insert(group_key.clone(), files);
    }

    view
}
