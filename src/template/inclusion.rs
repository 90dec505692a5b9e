//! Recursive `{{file: path}}` inclusion.
//!
//! Inclusion paths are resolved relative to the template directory and
//! form a directed graph. Following an edge back to a file that is still
//! being expanded is a cycle and aborts resolution. Including the same
//! file from two sibling tokens (a diamond) is fine: the ancestor stack
//! only holds the current branch.
//!
//! File contents are memoized by canonical path for the lifetime of the
//! resolver.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PromptkitError, Result};

use super::token::{tokenize, Segment};

/// Expands inclusion tokens in template content.
#[derive(Debug)]
pub struct InclusionResolver {
    base_dir: PathBuf,
    cache: HashMap<PathBuf, String>,
}

impl InclusionResolver {
    /// Create a resolver rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: HashMap::new(),
        }
    }

    /// Directory inclusion paths are relative to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Number of distinct files read so far.
    pub fn cached_files(&self) -> usize {
        self.cache.len()
    }

    /// Expand every inclusion token in `content`, recursively.
    ///
    /// # Errors
    ///
    /// Returns `FileInclusion` if a referenced file cannot be read, and
    /// `InclusionCycle` if a file includes one of its ancestors.
    pub fn resolve(&mut self, content: &str) -> Result<String> {
        let mut ancestors = Vec::new();
        self.expand(content, &mut ancestors)
    }

    fn expand(&mut self, content: &str, ancestors: &mut Vec<PathBuf>) -> Result<String> {
        let mut output = String::with_capacity(content.len());

        for segment in tokenize(content) {
            let Segment::Include { path, .. } = segment else {
                output.push_str(segment.source());
                continue;
            };

            let resolved = self.locate(&path)?;
            if let Some(start) = ancestors.iter().position(|p| *p == resolved) {
                return Err(PromptkitError::InclusionCycle {
                    chain: self.format_chain(&ancestors[start..], &resolved),
                });
            }

            let text = self.read(&resolved)?;
            tracing::debug!("Including {}", resolved.display());

            ancestors.push(resolved);
            let expanded = self.expand(&text, ancestors);
            ancestors.pop();

            output.push_str(&expanded?);
        }

        Ok(output)
    }

    fn locate(&self, path: &str) -> Result<PathBuf> {
        let joined = self.base_dir.join(path);
        fs::canonicalize(&joined).map_err(|e| PromptkitError::FileInclusion {
            path: joined,
            message: e.to_string(),
        })
    }

    fn read(&mut self, path: &Path) -> Result<String> {
        if let Some(content) = self.cache.get(path) {
            return Ok(content.clone());
        }

        let content = fs::read_to_string(path).map_err(|e| PromptkitError::FileInclusion {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.cache.insert(path.to_path_buf(), content.clone());
        Ok(content)
    }

    fn format_chain(&self, cycle: &[PathBuf], repeated: &Path) -> String {
        let base = fs::canonicalize(&self.base_dir).unwrap_or_else(|_| self.base_dir.clone());
        let display = |p: &Path| p.strip_prefix(&base).unwrap_or(p).display().to_string();

        let mut names: Vec<String> = cycle.iter().map(|p| display(p.as_path())).collect();
        names.push(display(repeated));
        names.join(" -> ")
    }
}
