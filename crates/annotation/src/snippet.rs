use serde::{Deserialize, Serialize};
use std::fmt;

/// One annotated block inside a source file.
///
/// Indices are 0-based positions in the line buffer the snippet was scanned
/// from. `patch` holds the lines between the opening directive and `#else`,
/// `vuln` the lines between `#else` and `#endif`. A block without `#else`
/// keeps its whole body in `vuln`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    /// Index of the opening directive
    pub start: usize,

    /// Index of the `#else` directive, if the block has one
    pub change: Option<usize>,

    /// Index of the closing `#endif`
    pub end: usize,

    /// Patched branch body
    pub patch: Vec<String>,

    /// Vulnerable branch body
    pub vuln: Vec<String>,

    /// Vulnerable hunk inside the rewritten file, once the patch is removed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relocated: Option<Hunk>,
}

impl Snippet {
    #[must_use]
    pub const fn new(
        start: usize,
        change: Option<usize>,
        end: usize,
        patch: Vec<String>,
        vuln: Vec<String>,
    ) -> Self {
        Self {
            start,
            change,
            end,
            patch,
            vuln,
            relocated: None,
        }
    }

    /// 1-based line number of the first patch body line
    #[must_use]
    pub const fn patch_first_line(&self) -> usize {
        self.start + 2
    }

    /// 1-based hunk covering the vulnerable body, end exclusive.
    ///
    /// Before removal this addresses the scanned buffer; afterwards it
    /// addresses the rewritten file.
    #[must_use]
    pub fn vuln_hunk(&self) -> Hunk {
        if let Some(hunk) = self.relocated {
            return hunk;
        }

        let opener = self.change.unwrap_or(self.start);
        Hunk::new(opener + 2, self.end + 1)
    }

    /// Number of patch body lines
    #[must_use]
    pub fn patch_size(&self) -> usize {
        self.patch.len()
    }

    /// Number of vulnerable body lines
    #[must_use]
    pub fn vuln_size(&self) -> usize {
        self.vuln.len()
    }

    /// Directive lines delimiting this block (2 or 3)
    #[must_use]
    pub const fn directive_lines(&self) -> usize {
        if self.change.is_some() {
            3
        } else {
            2
        }
    }

    /// Whether the block has a patched alternative
    #[must_use]
    pub const fn has_fix(&self) -> bool {
        self.change.is_some()
    }

    /// Whether the snippet has been relocated by a patch removal
    #[must_use]
    pub const fn is_relocated(&self) -> bool {
        self.relocated.is_some()
    }

    pub(crate) fn relocate(&mut self, hunk: Hunk) {
        self.relocated = Some(hunk);
    }
}

/// Contiguous 1-based line range, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hunk {
    pub start: usize,
    pub end: usize,
}

impl Hunk {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 1-based line numbers covered by the hunk
    pub fn lines(&self) -> impl Iterator<Item = usize> {
        self.start..self.end
    }

    /// Lines of `buffer` covered by the hunk, clamped to the buffer
    #[must_use]
    pub fn slice<'a>(&self, buffer: &'a [String]) -> &'a [String] {
        let from = self.start.saturating_sub(1).min(buffer.len());
        let to = self.end.saturating_sub(1).clamp(from, buffer.len());
        &buffer[from..to]
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.start, self.end)
    }
}
