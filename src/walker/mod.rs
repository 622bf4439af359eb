//! Fixed-depth directory traversal
//!
//! Only `root/category/subfolder/file` is visited. Non-directories at the
//! category and subfolder levels are skipped, as is anything deeper. Any
//! listing or stat failure aborts the walk.

use crate::config::WalkerConfig;
use crate::domain::outcome::{NormalizeError, NormalizeResult};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Depth of target files below the root
const FILE_DEPTH: usize = 3;
const CATEGORY_DEPTH: usize = 1;

/// Enumerates target files two directory levels below a root
#[derive(Debug, Clone)]
pub struct DirectoryWalker {
    /// Extension a file name must end with, after its last dot
    extension: String,
    /// Sort each directory listing by file name
    sort_entries: bool,
    /// Category directory names that are never descended
    ignored_categories: Vec<glob::Pattern>,
}

impl DirectoryWalker {
    /// Create a walker for the given target extension
    pub fn new(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            sort_entries: false,
            ignored_categories: Vec::new(),
        }
    }

    /// Create a walker from the traversal section of the configuration
    pub fn from_config(config: &WalkerConfig) -> NormalizeResult<Self> {
        let mut walker = Self::new(config.extension.clone()).with_sorted_entries(config.sort_entries);
        for pattern in &config.ignored_categories {
            walker.ignore_category(pattern)?;
        }
        Ok(walker)
    }

    /// Sort directory listings by name instead of using listing order
    pub fn with_sorted_entries(mut self, sort: bool) -> Self {
        self.sort_entries = sort;
        self
    }

    /// Skip category directories whose name matches a glob
    pub fn ignore_category(&mut self, pattern: &str) -> NormalizeResult<()> {
        let pattern = glob::Pattern::new(pattern).map_err(|e| {
            NormalizeError::pattern(format!("Invalid ignored category '{pattern}': {e}"))
        })?;
        self.ignored_categories.push(pattern);
        Ok(())
    }

    /// Target extension
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Call `visit` for every target file, in traversal order
    ///
    /// Files are handed over as they are discovered, so an error returned by
    /// `visit` stops the walk before later files are seen.
    pub fn walk<P, F>(&self, root: P, mut visit: F) -> NormalizeResult<()>
    where
        P: AsRef<Path>,
        F: FnMut(&Path) -> NormalizeResult<()>,
    {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(NormalizeError::NotADirectory { path: root.to_path_buf() });
        }

        let mut walk = WalkDir::new(root)
            .min_depth(1)
            .max_depth(FILE_DEPTH)
            .follow_links(true);
        if self.sort_entries {
            walk = walk.sort_by_file_name();
        }

        let entries = walk.into_iter().filter_entry(|entry| !self.is_ignored_category(entry));

        for entry in entries {
            let entry = entry.map_err(|source| NormalizeError::Traversal {
                path: source.path().unwrap_or(root).to_path_buf(),
                source,
            })?;

            if entry.depth() != FILE_DEPTH || !entry.file_type().is_file() {
                continue;
            }

            if !self.matches_extension(entry.file_name()) {
                tracing::debug!("Skipping {} (extension)", entry.path().display());
                continue;
            }

            tracing::debug!("Discovered {}", entry.path().display());
            visit(entry.path())?;
        }

        Ok(())
    }

    /// Collect all target files below `root`
    pub fn find_files<P: AsRef<Path>>(&self, root: P) -> NormalizeResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        self.walk(root, |path| {
            files.push(path.to_path_buf());
            Ok(())
        })?;
        Ok(files)
    }

    /// Whether a file name carries the target extension
    pub fn matches_extension(&self, file_name: &OsStr) -> bool {
        extension_of(file_name) == Some(self.extension.as_str())
    }

    fn is_ignored_category(&self, entry: &DirEntry) -> bool {
        if entry.depth() != CATEGORY_DEPTH || !entry.file_type().is_dir() {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        let ignored = self.ignored_categories.iter().any(|p| p.matches(&name));
        if ignored {
            tracing::debug!("Ignoring category {}", entry.path().display());
        }
        ignored
    }
}

/// Substring after the last `.` of a file name, case preserved
///
/// Unlike `Path::extension`, a leading dot counts: `.md` has extension `md`.
pub fn extension_of(file_name: &OsStr) -> Option<&str> {
    file_name.to_str()?.rsplit_once('.').map(|(_, ext)| ext)
}
