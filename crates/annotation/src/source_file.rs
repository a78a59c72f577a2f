use crate::atomic::write_atomically;
use crate::config::ScanConfig;
use crate::error::Result;
use crate::scanner::{DirectiveScanner, ScanOutput};
use crate::snippet::{Hunk, Snippet};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Branch bodies keyed by the 1-based line number of their first line
pub type LineBlocks = BTreeMap<usize, Vec<String>>;

/// Parse result of one annotated (or plain) source file
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    lines: Vec<String>,
    total_lines: usize,
    snippets: Vec<Snippet>,
    vuln_lines: usize,
    patch_lines: usize,
    placeholder: String,
    removed: bool,
}

/// Buffer and relocated hunks produced by planning a patch removal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub lines: Vec<String>,
    pub hunks: Vec<Hunk>,
}

impl SourceFile {
    /// Read and scan `path` with the default directives
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        DirectiveScanner::new(ScanConfig::default())?.scan_file(path)
    }

    pub(crate) fn from_scan(
        path: PathBuf,
        lines: Vec<String>,
        output: ScanOutput,
        placeholder: String,
    ) -> Self {
        let ScanOutput {
            snippets,
            patch_lines,
            vuln_lines,
        } = output;

        Self {
            path,
            total_lines: lines.len(),
            lines,
            snippets,
            vuln_lines,
            patch_lines,
            placeholder,
            removed: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current line buffer (the rewritten one after [`Self::remove_patch`])
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Line count when the file was scanned
    #[must_use]
    pub const fn total_lines(&self) -> usize {
        self.total_lines
    }

    #[must_use]
    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    #[must_use]
    pub const fn vuln_lines(&self) -> usize {
        self.vuln_lines
    }

    #[must_use]
    pub const fn patch_lines(&self) -> usize {
        self.patch_lines
    }

    #[must_use]
    pub fn has_snippets(&self) -> bool {
        !self.snippets.is_empty()
    }

    #[must_use]
    pub const fn is_removed(&self) -> bool {
        self.removed
    }

    /// Patch branch of every snippet, keyed by its first body line.
    ///
    /// Keys always address the scanned buffer: the patch lines no longer
    /// exist once [`Self::remove_patch`] ran, while [`Self::get_vuln`] then
    /// switches to positions in the rewritten file.
    #[must_use]
    pub fn get_patch(&self) -> LineBlocks {
        self.snippets
            .iter()
            .map(|snippet| (snippet.patch_first_line(), self.body_or_placeholder(&snippet.patch)))
            .collect()
    }

    /// Vulnerable branch of every snippet, keyed by its first body line
    #[must_use]
    pub fn get_vuln(&self) -> LineBlocks {
        self.snippets
            .iter()
            .map(|snippet| (snippet.vuln_hunk().start, self.body_or_placeholder(&snippet.vuln)))
            .collect()
    }

    /// Vulnerable hunks in snippet order
    #[must_use]
    pub fn vuln_hunk_list(&self) -> Vec<Hunk> {
        self.snippets.iter().map(Snippet::vuln_hunk).collect()
    }

    /// Vulnerable hunks as `start,end;` tokens
    #[must_use]
    pub fn get_vuln_hunks(&self) -> String {
        self.snippets
            .iter()
            .map(|snippet| format!("{};", snippet.vuln_hunk()))
            .collect()
    }

    /// Every 1-based line number covered by a vulnerable hunk
    #[must_use]
    pub fn vuln_line_numbers(&self) -> Vec<usize> {
        self.snippets
            .iter()
            .flat_map(|snippet| snippet.vuln_hunk().lines())
            .collect()
    }

    fn body_or_placeholder(&self, body: &[String]) -> Vec<String> {
        if body.is_empty() {
            vec![self.placeholder.clone()]
        } else {
            body.to_vec()
        }
    }

    /// Compute the buffer left after deleting every patch branch and directive.
    ///
    /// Pure: neither the file nor this instance is touched. Once the patch has
    /// been removed, this is the current buffer with the relocated hunks.
    #[must_use]
    pub fn plan_removal(&self) -> Rewrite {
        if self.removed {
            return Rewrite {
                lines: self.lines.clone(),
                hunks: self.vuln_hunk_list(),
            };
        }

        let mut kept: Vec<Option<String>> = self.lines.iter().cloned().map(Some).collect();
        let mut hunks = Vec::with_capacity(self.snippets.len());
        let mut shift = 0;

        for snippet in &self.snippets {
            let patch_size = snippet.patch_size();
            let first_vuln = snippet.change.unwrap_or(snippet.start) + 1;

            if patch_size > 0 && !snippet.vuln.is_empty() {
                let indent = leading_whitespace(&self.lines[snippet.start]);
                let body = self.lines[first_vuln].trim_start_matches([' ', '\t']);
                kept[first_vuln] = Some(format!("{indent}{body}"));
            }

            kept[snippet.start] = None;
            if let Some(change) = snippet.change {
                for slot in &mut kept[snippet.start + 1..=change] {
                    *slot = None;
                }
            }
            kept[snippet.end] = None;

            let relocated_start = snippet.start - shift + 1;
            hunks.push(Hunk::new(relocated_start, relocated_start + snippet.vuln_size()));
            shift += patch_size + snippet.directive_lines();
        }

        Rewrite {
            lines: kept.into_iter().flatten().collect(),
            hunks,
        }
    }

    /// Rewrite the file on disk without patch branches or directives.
    ///
    /// Returns `false` when this instance was already rewritten. A fresh
    /// instance of an already rewritten file has no snippets left to remove.
    pub fn remove_patch(&mut self) -> Result<bool> {
        if self.removed {
            log::debug!("{} already rewritten, skipping", self.path.display());
            return Ok(false);
        }

        let Rewrite { lines, hunks } = self.plan_removal();
        write_atomically(&self.path, lines.concat())?;

        log::debug!(
            "Removed {} patch lines from {} ({} -> {} lines)",
            self.patch_lines,
            self.path.display(),
            self.total_lines,
            lines.len()
        );

        for (snippet, hunk) in self.snippets.iter_mut().zip(hunks) {
            snippet.relocate(hunk);
        }
        self.lines = lines;
        self.removed = true;

        Ok(true)
    }
}

fn leading_whitespace(line: &str) -> &str {
    let trimmed = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - trimmed.len()]
}
