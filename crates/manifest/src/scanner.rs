use crate::config::ManifestConfig;
use crate::error::{ManifestError, Result};
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Source file found under a challenge root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the root, `/`-separated
    pub short_path: String,
    pub path: PathBuf,
}

/// Scanner for finding annotatable source files in a challenge tree
pub struct FileScanner<'a> {
    root: PathBuf,
    config: &'a ManifestConfig,
}

impl<'a> FileScanner<'a> {
    pub fn new(root: impl AsRef<Path>, config: &'a ManifestConfig) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            config,
        }
    }

    /// Walk the tree in file-name order. Symbolic links are not followed.
    pub fn scan(&self) -> Result<Vec<ScannedFile>> {
        if !self.root.is_dir() {
            return Err(ManifestError::InvalidPath(format!(
                "{} is not a directory",
                self.root.display()
            )));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored_scope(entry));

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.config.is_source_file(path) {
                log::trace!("Skipping non-source file {}", path.display());
                continue;
            }

            files.push(ScannedFile {
                short_path: self.short_path(path)?,
                path: path.to_path_buf(),
            });
        }

        log::info!(
            "Found {} source files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn is_ignored_scope(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.config.is_ignored_dir(name))
    }

    fn short_path(&self, path: &Path) -> Result<String> {
        let relative = path.strip_prefix(&self.root).map_err(|_| {
            ManifestError::InvalidPath(format!(
                "{} is outside {}",
                path.display(),
                self.root.display()
            ))
        })?;

        let parts: Vec<_> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        Ok(parts.join("/"))
    }
}
