//! Recursive traversal of a project tree.
//!
//! Every directory level is listed in full, sorted by name, before any of its
//! entries is visited. A visitor may therefore rename the node it receives
//! without disturbing the sibling list that is still being iterated.
//!
//! Symbolic links are classified by what they point to. A linked directory is
//! descended into unless it resolves to one of the directories already being
//! walked; a dangling link is visited but is neither a file nor a directory.

use crate::error::Result;
use log::debug;
use std::fs::{self, FileType};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A visited file-system entry. Only valid for the duration of a callback.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Base name of the entry.
    pub name: String,
    /// Directory containing the entry.
    pub parent: PathBuf,
    /// Zero for direct children of the walk root.
    pub depth: usize,
    /// File type of the entry, or of its target for a symbolic link.
    pub file_type: FileType,
    /// Whether the entry itself is a symbolic link.
    pub is_symlink: bool,
}

impl FileNode {
    fn from_entry(entry: &DirEntry, parent: &Path, depth: usize) -> Self {
        let is_symlink = entry.path_is_symlink();
        let file_type = if is_symlink {
            match fs::metadata(entry.path()) {
                Ok(target) => target.file_type(),
                Err(e) => {
                    debug!("Dangling link '{}': {}", entry.path().display(), e);
                    entry.file_type()
                }
            }
        } else {
            entry.file_type()
        };

        Self {
            path: entry.path().to_path_buf(),
            name: entry.file_name().to_string_lossy().into_owned(),
            parent: parent.to_path_buf(),
            depth,
            file_type,
            is_symlink,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.file_type.is_dir()
    }

    pub fn is_file(&self) -> bool {
        self.file_type.is_file()
    }
}

type Filter<'f> = Box<dyn FnMut(&FileNode) -> bool + 'f>;

/// Depth-first walker with a pruning filter.
pub struct Walker<'f> {
    root: PathBuf,
    filter: Option<Filter<'f>>,
}

impl<'f> Walker<'f> {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), filter: None }
    }

    /// Sets the inclusion predicate. An entry for which it returns `false` is
    /// skipped, and a rejected directory is not descended into.
    pub fn filter<F>(mut self, filter: F) -> Self
    where
        F: FnMut(&FileNode) -> bool + 'f,
    {
        self.filter = Some(Box::new(filter));
        self
    }

    /// Walks the tree, calling `visit` for every accepted file and directory.
    ///
    /// Directories are descended into before they are visited themselves.
    /// Returns the paths of all visited files, as they were when listed.
    ///
    /// # Errors
    /// Any file-system error aborts the walk, as does any error returned by
    /// `visit`.
    pub fn walk<V>(mut self, mut visit: V) -> Result<Vec<PathBuf>>
    where
        V: FnMut(&FileNode) -> Result<()>,
    {
        let root = std::path::absolute(&self.root)?;
        debug!("Walking '{}'.", root.display());

        let mut files = Vec::new();
        let mut ancestors = vec![fs::canonicalize(&root)?];
        self.walk_level(&root, 0, &mut ancestors, &mut visit, &mut files)?;
        Ok(files)
    }

    fn walk_level(
        &mut self,
        dir: &Path,
        depth: usize,
        ancestors: &mut Vec<PathBuf>,
        visit: &mut dyn FnMut(&FileNode) -> Result<()>,
        files: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for entry in &entries {
            let node = FileNode::from_entry(entry, dir, depth);

            if let Some(filter) = self.filter.as_mut() {
                if !filter(&node) {
                    debug!("Skipping '{}'.", node.path.display());
                    continue;
                }
            }

            if node.is_dir() {
                let resolved = fs::canonicalize(&node.path)?;
                if ancestors.contains(&resolved) {
                    debug!("Not descending into '{}': link loop.", node.path.display());
                } else {
                    ancestors.push(resolved);
                    self.walk_level(&node.path, depth + 1, ancestors, visit, files)?;
                    ancestors.pop();
                }
                visit(&node)?;
            } else if node.is_file() {
                visit(&node)?;
                files.push(node.path);
            } else if node.is_symlink {
                visit(&node)?;
            }
        }

        Ok(())
    }
}
