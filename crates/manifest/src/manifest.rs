use crate::artifacts::{FaultLocation, PatchSet};
use crate::config::ManifestConfig;
use crate::error::{ManifestError, Result};
use crate::instrumented::{map_instrumented_files, InstrumentMode};
use crate::scanner::FileScanner;
use crate::stats::LineStats;
use patchmark_annotation::{write_atomically, DirectiveScanner, ScanConfig, SourceFile};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Annotated and plain source files of one challenge
#[derive(Debug)]
pub struct Manifest {
    root: PathBuf,
    config: ManifestConfig,
    source_files: BTreeMap<String, SourceFile>,
    vuln_files: BTreeMap<String, SourceFile>,
    stats: LineStats,
}

impl Manifest {
    /// Walk `root` and parse every source file with default settings
    pub fn new(root: impl AsRef<Path>) -> Result<Self> {
        let scanner = DirectiveScanner::new(ScanConfig::default())?;
        Self::build(root, ManifestConfig::default(), &scanner)
    }

    /// Walk `root` and parse every source file
    pub fn build(
        root: impl AsRef<Path>,
        config: ManifestConfig,
        scanner: &DirectiveScanner,
    ) -> Result<Self> {
        config.validate().map_err(ManifestError::Other)?;
        let root = root.as_ref().to_path_buf();

        let mut source_files = BTreeMap::new();
        let mut vuln_files = BTreeMap::new();
        let mut stats = LineStats::new();

        for scanned in FileScanner::new(&root, &config).scan()? {
            let file = scanner.scan_file(&scanned.path)?;
            stats.add_file(&file);

            if file.has_snippets() {
                vuln_files.insert(scanned.short_path, file);
            } else {
                source_files.insert(scanned.short_path, file);
            }
        }

        log::info!(
            "Manifest for {}: {} annotated of {} files, {} vuln / {} patch lines",
            root.display(),
            stats.vuln_files,
            stats.files,
            stats.vuln_lines,
            stats.patch_lines
        );

        Ok(Self {
            root,
            config,
            source_files,
            vuln_files,
            stats,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &ManifestConfig {
        &self.config
    }

    /// Files without annotated blocks
    pub fn source_files(&self) -> &BTreeMap<String, SourceFile> {
        &self.source_files
    }

    /// Files with at least one annotated block
    pub fn vuln_files(&self) -> &BTreeMap<String, SourceFile> {
        &self.vuln_files
    }

    pub fn stats(&self) -> LineStats {
        self.stats
    }

    pub fn total_lines(&self) -> usize {
        self.stats.total_lines
    }

    pub fn vuln_lines(&self) -> usize {
        self.stats.vuln_lines
    }

    pub fn patch_lines(&self) -> usize {
        self.stats.patch_lines
    }

    /// Default location of an artifact inside the source root
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Rewrite every annotated file so only vulnerable code remains
    pub fn remove_patches(&mut self) -> Result<usize> {
        let mut rewritten = 0;
        for file in self.vuln_files.values_mut() {
            if file.remove_patch()? {
                rewritten += 1;
            }
        }

        log::info!("Removed patches from {rewritten} files");
        Ok(rewritten)
    }

    /// One relative path per annotated file
    pub fn listing(&self) -> String {
        self.vuln_files
            .keys()
            .map(|short_path| format!("{short_path}\n"))
            .collect()
    }

    /// `path:start,end;...` per annotated file
    pub fn hunk_listing(&self) -> String {
        self.vuln_files
            .iter()
            .map(|(short_path, file)| format!("{short_path}:{}\n", file.get_vuln_hunks()))
            .collect()
    }

    /// Write the `manifest` artifact
    pub fn write(&self, out: &Path) -> Result<()> {
        Ok(write_atomically(out, self.listing())?)
    }

    /// Write the manifest with each file's vulnerable hunks
    pub fn write_with_hunks(&self, out: &Path) -> Result<()> {
        Ok(write_atomically(out, self.hunk_listing())?)
    }

    /// Patch branches of every annotated file
    pub fn get_patches(&self) -> PatchSet {
        let mut set = PatchSet::new();
        for (short_path, file) in &self.vuln_files {
            set.insert(short_path.as_str(), file.get_patch());
        }
        set
    }

    /// Vulnerable branches of every annotated file
    pub fn get_vulns(&self) -> PatchSet {
        let mut set = PatchSet::new();
        for (short_path, file) in &self.vuln_files {
            set.insert(short_path.as_str(), file.get_vuln());
        }
        set
    }

    /// Vulnerable lines addressed under `base` (the checked-out source tree)
    pub fn fault_locations(&self, base: &Path) -> Vec<FaultLocation> {
        self.vuln_files
            .iter()
            .flat_map(|(short_path, file)| {
                let full_path = base.join(short_path);
                file.snippets().iter().flat_map(move |snippet| {
                    let hunk = snippet.vuln_hunk();
                    let full_path = full_path.clone();
                    snippet
                        .vuln
                        .iter()
                        .zip(hunk.lines())
                        .map(move |(code, line)| FaultLocation::new(full_path.clone(), line, code))
                })
            })
            .collect()
    }

    /// Map annotated sources to externally produced files
    pub fn map_instrumented_files<C: AsRef<Path>>(
        &self,
        candidates: &[C],
        mode: InstrumentMode,
    ) -> BTreeMap<String, String> {
        map_instrumented_files(
            self.vuln_files.keys().map(String::as_str),
            candidates,
            mode,
            &self.config,
        )
    }
}
