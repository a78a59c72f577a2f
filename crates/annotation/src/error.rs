use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for annotation operations
pub type Result<T> = std::result::Result<T, AnnotationError>;

/// Errors that can occur while scanning or rewriting annotated sources
#[derive(Error, Debug)]
pub enum AnnotationError {
    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A specific file could not be read or written
    #[error("Cannot access {}: {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directive structure that the scanner cannot turn into a snippet
    #[error("Malformed annotation in {} at line {line}: {kind}", path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        kind: MalformedKind,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Start pattern failed to compile
    #[error("Invalid start pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// Kind of directive misuse detected during a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedKind {
    /// File ended while a block was still open
    Unterminated,
}

impl fmt::Display for MalformedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unterminated => f.write_str("block is never closed"),
        }
    }
}

impl AnnotationError {
    /// Create an invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Attach a path to an IO error
    pub fn file_access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a malformed annotation error; `line` is 1-based
    pub fn malformed(path: impl Into<PathBuf>, line: usize, kind: MalformedKind) -> Self {
        Self::Malformed {
            path: path.into(),
            line,
            kind,
        }
    }
}
