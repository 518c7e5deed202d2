//! Rewrites a freshly cloned project tree in place.
//! File and directory names go through `__NAME__` substitution and file
//! contents through `<<<NAME>>>` substitution.

use crate::error::Result;
use crate::tokens::{substitute_content, substitute_file_name, TokenContext};
use crate::walker::{FileNode, Walker};
use globset::{Glob, GlobSet, GlobSetBuilder};
use log::debug;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

/// Directories never descended into by default.
pub const DEFAULT_EXCLUDED_DIRS: [&str; 1] = ["node_modules"];

/// Paths touched by a template pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct TemplateReport {
    /// Entries renamed, as `(from, to)`.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Files whose content was rewritten, at their final path.
    pub rewritten: Vec<PathBuf>,
}

impl TemplateReport {
    pub fn is_unchanged(&self) -> bool {
        self.renamed.is_empty() && self.rewritten.is_empty()
    }
}

pub struct TemplateEngine<'a> {
    context: &'a TokenContext,
    excluded_dirs: GlobSet,
}

fn build_globset<S: AsRef<str>>(patterns: &[S]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    Ok(builder.build()?)
}

impl<'a> TemplateEngine<'a> {
    /// Creates an engine that skips [`DEFAULT_EXCLUDED_DIRS`].
    pub fn new(context: &'a TokenContext) -> Result<Self> {
        Self::with_excluded_dirs(context, &DEFAULT_EXCLUDED_DIRS)
    }

    /// Creates an engine that skips directories whose base name matches any
    /// of the given glob patterns.
    pub fn with_excluded_dirs<S: AsRef<str>>(
        context: &'a TokenContext,
        patterns: &[S],
    ) -> Result<Self> {
        Ok(Self { context, excluded_dirs: build_globset(patterns)? })
    }

    fn is_excluded(&self, node: &FileNode) -> bool {
        node.is_dir() && self.excluded_dirs.is_match(&node.name)
    }

    /// Applies the template pass to every entry under `root`.
    ///
    /// # Errors
    /// The first failed rename, read or write aborts the pass. Entries
    /// already processed keep their new names and contents.
    pub fn apply<P: AsRef<Path>>(&self, root: P) -> Result<TemplateReport> {
        let mut report = TemplateReport::default();

        Walker::new(root)
            .filter(|node| !self.is_excluded(node))
            .walk(|node| self.process(node, &mut report))?;

        debug!(
            "Template pass renamed {} entries and rewrote {} files.",
            report.renamed.len(),
            report.rewritten.len()
        );
        Ok(report)
    }

    fn process(&self, node: &FileNode, report: &mut TemplateReport) -> Result<()> {
        let mut path = node.path.clone();

        let new_name = substitute_file_name(&node.name, self.context);
        if new_name != node.name {
            let target = node.parent.join(&new_name);
            debug!("Renaming '{}' to '{}'.", path.display(), target.display());
            fs::rename(&path, &target)?;
            report.renamed.push((path, target.clone()));
            path = target;
        }

        if node.is_file() && self.rewrite_content(&path)? {
            report.rewritten.push(path);
        }

        Ok(())
    }

    // Non UTF-8 files are decoded lossily and only written back when they
    // contain a content token.
    fn rewrite_content(&self, path: &Path) -> Result<bool> {
        let bytes = fs::read(path)?;
        let content = String::from_utf8_lossy(&bytes);

        match substitute_content(&content, self.context) {
            Cow::Borrowed(_) => Ok(false),
            Cow::Owned(new_content) => {
                if new_content == content {
                    return Ok(false);
                }
                debug!("Rewriting '{}'.", path.display());
                fs::write(path, new_content)?;
                Ok(true)
            }
        }
    }
}
