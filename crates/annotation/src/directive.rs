use crate::config::ScanConfig;
use crate::error::{AnnotationError, Result};
use regex::Regex;

/// Preprocessor line that delimits an annotated block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Directive {
    /// `#if PATCHED`, `#ifdef PATCHED`, `#ifndef PATCHED`
    Open,
    /// `#else`
    Change,
    /// `#endif`
    Close,
}

/// Compiled directive matchers
#[derive(Debug, Clone)]
pub(crate) struct DirectiveSet {
    start: Regex,
    change: String,
    end: String,
}

impl DirectiveSet {
    pub(crate) fn compile(config: &ScanConfig) -> Result<Self> {
        config.validate().map_err(AnnotationError::invalid_config)?;

        Ok(Self {
            start: Regex::new(&config.start_pattern)?,
            change: config.change_directive.clone(),
            end: config.end_directive.clone(),
        })
    }

    /// Classify a raw line (terminator included). Whitespace is trimmed first.
    pub(crate) fn classify(&self, line: &str) -> Option<Directive> {
        let stripped = line.trim();

        if self.start.is_match(stripped) {
            Some(Directive::Open)
        } else if stripped.starts_with(&self.change) {
            Some(Directive::Change)
        } else if stripped.starts_with(&self.end) {
            Some(Directive::Close)
        } else {
            None
        }
    }
}
