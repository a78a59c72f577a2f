use crate::config::{ScanConfig, UnterminatedPolicy};
use crate::directive::{Directive, DirectiveSet};
use crate::error::{AnnotationError, MalformedKind, Result};
use crate::snippet::Snippet;
use crate::source_file::SourceFile;
use std::path::Path;

/// Turns annotated line buffers into snippets
#[derive(Debug, Clone)]
pub struct DirectiveScanner {
    config: ScanConfig,
    directives: DirectiveSet,
}

/// Snippets and per-branch line counts of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub snippets: Vec<Snippet>,
    pub patch_lines: usize,
    pub vuln_lines: usize,
}

/// Block under construction
#[derive(Debug)]
struct OpenBlock {
    start: usize,
    change: Option<usize>,
    branch_a: Vec<String>,
    branch_b: Vec<String>,
}

impl OpenBlock {
    fn new(start: usize) -> Self {
        Self {
            start,
            change: None,
            branch_a: Vec::new(),
            branch_b: Vec::new(),
        }
    }

    fn push(&mut self, line: &str) {
        if self.change.is_some() {
            self.branch_b.push(line.to_string());
        } else {
            self.branch_a.push(line.to_string());
        }
    }

    fn close(self, end: usize) -> Snippet {
        match self.change {
            Some(change) => Snippet::new(self.start, Some(change), end, self.branch_a, self.branch_b),
            // Without an alternative the body is vulnerable code with no known fix.
            None => Snippet::new(self.start, None, end, Vec::new(), self.branch_a),
        }
    }
}

enum ScanState {
    Outside,
    InBlock(OpenBlock),
}

impl DirectiveScanner {
    /// Create a scanner, compiling the configured directives
    pub fn new(config: ScanConfig) -> Result<Self> {
        let directives = DirectiveSet::compile(&config)?;
        Ok(Self { config, directives })
    }

    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Read and scan a file
    pub fn scan_file(&self, path: impl AsRef<Path>) -> Result<SourceFile> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|err| AnnotationError::file_access(path, err))?;

        self.scan_str(path, &content)
    }

    /// Scan in-memory content as if it were read from `path`
    pub fn scan_str(&self, path: impl AsRef<Path>, content: &str) -> Result<SourceFile> {
        let path = path.as_ref();
        let lines: Vec<String> = content.split_inclusive('\n').map(str::to_owned).collect();
        let output = self.scan_lines(path, &lines)?;

        log::debug!(
            "Scanned {}: {} snippets, {} patch lines, {} vuln lines",
            path.display(),
            output.snippets.len(),
            output.patch_lines,
            output.vuln_lines
        );

        Ok(SourceFile::from_scan(
            path.to_path_buf(),
            lines,
            output,
            self.config.placeholder.clone(),
        ))
    }

    /// Single forward pass over `lines`; `path` is only used for diagnostics
    pub fn scan_lines(&self, path: &Path, lines: &[String]) -> Result<ScanOutput> {
        let mut output = ScanOutput::default();
        let mut state = ScanState::Outside;

        for (index, line) in lines.iter().enumerate() {
            let directive = self.directives.classify(line);

            state = match state {
                ScanState::Outside => match directive {
                    Some(Directive::Open) => ScanState::InBlock(OpenBlock::new(index)),
                    Some(_) => {
                        log::trace!(
                            "{}:{}: directive outside an annotated block",
                            path.display(),
                            index + 1
                        );
                        ScanState::Outside
                    }
                    None => ScanState::Outside,
                },
                ScanState::InBlock(mut block) => match directive {
                    Some(Directive::Change) if block.change.is_some() => {
                        // Usually a nested conditional inside the vulnerable branch.
                        log::warn!(
                            "{}:{}: repeated {} kept as vulnerable code",
                            path.display(),
                            index + 1,
                            self.config.change_directive
                        );
                        block.push(line);
                        ScanState::InBlock(block)
                    }
                    Some(Directive::Change) => {
                        block.change = Some(index);
                        ScanState::InBlock(block)
                    }
                    Some(Directive::Close) => {
                        let snippet = block.close(index);
                        output.patch_lines += snippet.patch_size();
                        output.vuln_lines += snippet.vuln_size();
                        output.snippets.push(snippet);
                        ScanState::Outside
                    }
                    // Nested opening directives are body lines.
                    Some(Directive::Open) | None => {
                        block.push(line);
                        ScanState::InBlock(block)
                    }
                },
            };
        }

        if let ScanState::InBlock(block) = state {
            match self.config.on_unterminated {
                UnterminatedPolicy::Error => {
                    return Err(AnnotationError::malformed(
                        path,
                        block.start + 1,
                        MalformedKind::Unterminated,
                    ));
                }
                UnterminatedPolicy::Drop => {
                    log::warn!(
                        "{}:{}: dropping annotated block that is never closed",
                        path.display(),
                        block.start + 1
                    );
                }
            }
        }

        Ok(output)
    }
}
