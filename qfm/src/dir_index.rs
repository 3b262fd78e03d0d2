//! Directory index backing jump mode.
//!
//! Holds every directory below the session root plus a leaf-name index
//! (basename to full paths, many paths per name). The walk is iterative and
//! does not follow symlinks; unreadable subtrees are recorded and skipped.

use crate::dirs::leaf_name;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Result of resolving a leaf name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JumpResolution {
    NotFound,
    Unique(PathBuf),
    Ambiguous(Vec<PathBuf>),
}

#[derive(Debug, Clone, Default)]
pub struct DirectoryIndex {
    root: PathBuf,
    dirs: BTreeSet<PathBuf>,
    leaves: BTreeMap<String, BTreeSet<PathBuf>>,
    skipped: Vec<PathBuf>,
}

impl DirectoryIndex {
    /// Walk `root` and index every directory below it.
    pub fn build(root: impl Into<PathBuf>) -> Self {
        let mut index = DirectoryIndex {
            root: root.into(),
            ..Default::default()
        };
        index.rescan();
        index
    }

    /// Drop all bookkeeping and walk the root again.
    pub fn rescan(&mut self) {
        self.dirs.clear();
        self.leaves.clear();
        self.skipped.clear();
        let root = self.root.clone();
        self.walk_into(&root);
        debug!(
            "indexed {} directories under {:?} ({} skipped)",
            self.dirs.len(),
            self.root,
            self.skipped.len()
        );
    }

    fn walk_into(&mut self, start: &Path) {
        for entry in WalkDir::new(start).follow_links(false).min_depth(1) {
            match entry {
                Ok(entry) if entry.file_type().is_dir() => {
                    self.add(entry.path());
                }
                Ok(_) => {}
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| start.to_path_buf());
                    warn!("skipping {:?} while indexing: {}", path, err);
                    self.skipped.push(path);
                }
            }
        }
    }

    fn add(&mut self, path: &Path) {
        if path == self.root || !path.starts_with(&self.root) {
            return;
        }
        if self.dirs.insert(path.to_path_buf()) {
            self.leaves
                .entry(leaf_name(path))
                .or_default()
                .insert(path.to_path_buf());
        }
    }

    /// Record a newly created directory.
    pub fn insert(&mut self, path: &Path) {
        self.add(path);
    }

    /// Record `path` and every directory below it.
    pub fn insert_tree(&mut self, path: &Path) {
        self.add(path);
        let start = path.to_path_buf();
        self.walk_into(&start);
    }

    /// Forget `path` and every directory below it.
    pub fn remove_tree(&mut self, path: &Path) {
        let doomed: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|dir| dir.starts_with(path))
            .cloned()
            .collect();
        for dir in doomed {
            self.dirs.remove(&dir);
            let leaf = leaf_name(&dir);
            if let Some(paths) = self.leaves.get_mut(&leaf) {
                paths.remove(&dir);
                if paths.is_empty() {
                    self.leaves.remove(&leaf);
                }
            }
        }
    }

    /// Move the subtree at `from` to `to`.
    pub fn relocate(&mut self, from: &Path, to: &Path) {
        let moved: Vec<PathBuf> = self
            .dirs
            .iter()
            .filter(|dir| dir.starts_with(from))
            .filter_map(|dir| dir.strip_prefix(from).ok())
            .map(|rel| {
                if rel.as_os_str().is_empty() {
                    to.to_path_buf()
                } else {
                    to.join(rel)
                }
            })
            .collect();
        self.remove_tree(from);
        for dir in moved {
            self.add(&dir);
        }
        // An empty `to` may not have been known under `from`; make sure it is.
        self.add(to);
    }

    pub fn resolve(&self, leaf: &str) -> JumpResolution {
        match self.leaves.get(leaf) {
            None => JumpResolution::NotFound,
            Some(paths) if paths.len() == 1 => match paths.iter().next() {
                Some(path) => JumpResolution::Unique(path.clone()),
                None => JumpResolution::NotFound,
            },
            Some(paths) => JumpResolution::Ambiguous(paths.iter().cloned().collect()),
        }
    }

    /// Distinct leaf names, alphabetically.
    pub fn leaf_names(&self) -> impl Iterator<Item = &str> {
        self.leaves.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.dirs.contains(path)
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    /// Paths that could not be read during the last walk.
    pub fn skipped(&self) -> &[PathBuf] {
        &self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/logs")).unwrap();
        fs::create_dir_all(dir.path().join("b/logs/old")).unwrap();
        fs::create_dir_all(dir.path().join("c")).unwrap();
        fs::write(dir.path().join("c/file.txt"), "x").unwrap();
        dir
    }

    #[test]
    fn test_build_indexes_all_directories() {
        let dir = tree();
        let index = DirectoryIndex::build(dir.path());
        assert_eq!(index.len(), 6);
        assert!(index.contains(&dir.path().join("b/logs/old")));
        assert!(!index.contains(&dir.path().join("c/file.txt")));
    }

    #[test]
    fn test_resolve_unique_and_ambiguous() {
        let dir = tree();
        let index = DirectoryIndex::build(dir.path());
        assert_eq!(
            index.resolve("old"),
            JumpResolution::Unique(dir.path().join("b/logs/old"))
        );
        assert_eq!(
            index.resolve("logs"),
            JumpResolution::Ambiguous(vec![dir.path().join("a/logs"), dir.path().join("b/logs")])
        );
        assert_eq!(index.resolve("missing"), JumpResolution::NotFound);
    }

    #[test]
    fn test_relocate_moves_subtree() {
        let dir = tree();
        let mut index = DirectoryIndex::build(dir.path());
        let from = dir.path().join("b/logs");
        let to = dir.path().join("c/archive");
        index.relocate(&from, &to);
        assert!(!index.contains(&from));
        assert!(index.contains(&to.join("old")));
        assert_eq!(index.resolve("archive"), JumpResolution::Unique(to.clone()));
        assert_eq!(
            index.resolve("logs"),
            JumpResolution::Unique(dir.path().join("a/logs"))
        );
    }

    #[test]
    fn test_remove_tree_prunes_leaf_index() {
        let dir = tree();
        let mut index = DirectoryIndex::build(dir.path());
        index.remove_tree(&dir.path().join("b"));
        assert_eq!(index.len(), 3);
        assert_eq!(index.resolve("old"), JumpResolution::NotFound);
    }

    #[test]
    fn test_insert_tree_walks_new_copy() {
        let dir = tree();
        let mut index = DirectoryIndex::build(dir.path());
        fs::create_dir_all(dir.path().join("copy/logs/old")).unwrap();
        index.insert_tree(&dir.path().join("copy"));
        assert!(index.contains(&dir.path().join("copy/logs/old")));
        assert!(matches!(index.resolve("logs"), JumpResolution::Ambiguous(v) if v.len() == 3));
    }

    #[test]
    fn test_paths_outside_root_are_ignored() {
        let dir = tree();
        let mut index = DirectoryIndex::build(dir.path().join("a"));
        index.insert(Path::new("/somewhere/else"));
        assert_eq!(index.len(), 1);
    }
}
