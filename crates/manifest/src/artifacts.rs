use crate::error::{ManifestError, Result};
use patchmark_annotation::{write_atomically, DirectiveScanner, LineBlocks};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Contents of the `patch` and `vuln` artifacts: file -> first line -> body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatchSet {
    files: BTreeMap<String, LineBlocks>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, short_path: impl Into<String>, blocks: LineBlocks) {
        self.files.insert(short_path.into(), blocks);
    }

    pub fn files(&self) -> &BTreeMap<String, LineBlocks> {
        &self.files
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// One `(file, line, code)` row per body line, code stripped of whitespace
    pub fn rows(&self) -> Vec<(&str, usize, &str)> {
        self.files
            .iter()
            .flat_map(|(file, blocks)| {
                blocks.iter().flat_map(move |(first, body)| {
                    body.iter()
                        .enumerate()
                        .map(move |(offset, line)| (file.as_str(), first + offset, line.trim()))
                })
            })
            .collect()
    }

    /// Serialize with 2-space indentation
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        Ok(write_atomically(path, self.to_json()?)?)
    }

    pub fn read_json(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).map_err(|err| ManifestError::file_access(path, err))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// One vulnerable line reported to a fault-localization consumer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaultLocation {
    pub path: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column of the first non-whitespace character
    pub column: usize,
}

impl FaultLocation {
    /// Blank lines report column 1
    pub fn new(path: PathBuf, line: usize, code: &str) -> Self {
        let trimmed = code.trim_start();
        let column = if trimmed.is_empty() {
            1
        } else {
            code.len() - trimmed.len() + 1
        };
        Self { path, line, column }
    }
}

impl fmt::Display for FaultLocation {
    // Start and end of the location are the same point.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let loc = format!("{} {} {}", self.path.display(), self.line, self.column);
        write!(f, "{loc} {loc}")
    }
}

/// Relative paths listed in a `manifest` artifact
pub fn read_listing(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path).map_err(|err| ManifestError::file_access(path, err))?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        // Hunk listings carry `path:hunks`.
        .map(|line| line.split_once(':').map_or(line, |(path, _)| path).to_string())
        .collect())
}

/// Rewrite every file named in a `manifest` listing, parsing each afresh.
///
/// Files that were already rewritten have no annotations left and are
/// skipped. Returns the number of files rewritten.
pub fn remove_patches_from_listing(
    source_root: &Path,
    listing: &Path,
    scanner: &DirectiveScanner,
) -> Result<usize> {
    let mut rewritten = 0;

    for short_path in read_listing(listing)? {
        let mut file = scanner.scan_file(source_root.join(&short_path))?;
        if !file.has_snippets() {
            log::warn!("{short_path} has no annotated blocks left, skipping");
            continue;
        }
        file.remove_patch()?;
        rewritten += 1;
    }

    log::info!("Removed patches from {rewritten} files");
    Ok(rewritten)
}

/// Delete the named artifacts from `root`, returning the names that existed
pub fn clean_artifacts<'a>(root: &Path, names: &[&'a str]) -> Result<Vec<&'a str>> {
    let mut removed = Vec::new();

    for &name in names {
        let path = root.join(name);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                log::info!("Removed {}", path.display());
                removed.push(name);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(ManifestError::file_access(path, err)),
        }
    }

    Ok(removed)
}
