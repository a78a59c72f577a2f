use patchmark_annotation::SourceFile;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Line counters aggregated over a challenge's source tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineStats {
    /// Number of files visited
    pub files: usize,

    /// Number of files with at least one annotated block
    pub vuln_files: usize,

    /// Total lines of every visited file
    pub total_lines: usize,

    /// Vulnerable branch body lines
    pub vuln_lines: usize,

    /// Patch branch body lines
    pub patch_lines: usize,
}

impl LineStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters contributed by a single parsed file
    pub fn of_file(file: &SourceFile) -> Self {
        Self {
            files: 1,
            vuln_files: usize::from(file.has_snippets()),
            total_lines: file.total_lines(),
            vuln_lines: file.vuln_lines(),
            patch_lines: file.patch_lines(),
        }
    }

    pub fn add_file(&mut self, file: &SourceFile) {
        *self += Self::of_file(file);
    }
}

impl AddAssign for LineStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.vuln_files += other.vuln_files;
        self.total_lines += other.total_lines;
        self.vuln_lines += other.vuln_lines;
        self.patch_lines += other.patch_lines;
    }
}
