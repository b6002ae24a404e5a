//! Nested directory tree from flat paths

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Key under which a directory lists its own files.
pub const FILES_KEY: &str = "_files";

/// A directory: its files plus exclusively owned child directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirNode {
    pub files: Vec<String>,
    pub dirs: BTreeMap<String, DirNode>,
}

impl DirNode {
    /// Build a tree from slash-separated paths. Empty segments are skipped.
    pub fn from_paths<'p>(paths: impl IntoIterator<Item = &'p str>) -> Self {
        let mut root = DirNode::default();
        for path in paths {
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
            let Some((file, parents)) = segments.split_last() else {
                continue;
            };
            let mut node = &mut root;
            for dir in parents {
                node = node.dirs.entry((*dir).to_string()).or_default();
            }
            node.files.push((*file).to_string());
        }
        root
    }

    /// Total number of files beneath this node.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.dirs.values().map(DirNode::file_count).sum::<usize>()
    }
}

// Directories serialize as `{ "<child>": {...}, "_files": [...] }`; the
// files key is omitted for directories without direct files. A directory
// literally named `_files` is written as `_files/` so keys stay unique.
impl Serialize for DirNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let has_files = !self.files.is_empty();
        let mut map = serializer.serialize_map(Some(self.dirs.len() + usize::from(has_files)))?;
        for (name, child) in &self.dirs {
            if name == FILES_KEY {
                map.serialize_entry(&format!("{FILES_KEY}/"), child)?;
            } else {
                map.serialize_entry(name, child)?;
            }
        }
        if has_files {
            map.serialize_entry(FILES_KEY, &self.files)?;
        }
        map.end()
    }
}
