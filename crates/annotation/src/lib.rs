//! # Patchmark Annotation
//!
//! Line-oriented scanning of `PATCHED` preprocessor annotations in C/C++
//! sources.
//!
//! ## Annotation format
//!
//! ```text
//! #ifdef PATCHED          <- opening directive (#if / #ifdef / #ifndef)
//!     fixed code          <- patch branch
//! #else
//!     vulnerable code     <- vulnerable branch
//! #endif
//! ```
//!
//! A block without `#else` holds vulnerable code with no known fix.
//!
//! ## Pipeline
//!
//! ```text
//! Source file
//!     │
//!     ├──> DirectiveScanner (single forward pass)
//!     │      └─> Snippet[] + patch/vuln line counts
//!     │
//!     ├──> Extraction
//!     │      ├─> get_patch() / get_vuln()   (line blocks)
//!     │      └─> get_vuln_hunks()           ("start,end;" tokens)
//!     │
//!     └──> remove_patch()
//!            └─> file rewritten with only the vulnerable code left
//! ```
//!
//! ## Example
//!
//! ```rust
//! use patchmark_annotation::{DirectiveScanner, ScanConfig};
//!
//! let scanner = DirectiveScanner::new(ScanConfig::default()).unwrap();
//! let code = "#ifdef PATCHED\n  int x = 1;\n#else\n  int x = 0;\n#endif\n";
//!
//! let file = scanner.scan_str("service.c", code).unwrap();
//! assert_eq!(file.snippets().len(), 1);
//! assert_eq!(file.get_vuln_hunks(), "4,5;");
//! ```

mod atomic;
mod config;
mod directive;
mod error;
mod scanner;
mod snippet;
mod source_file;

pub use atomic::write_atomically;
pub use config::{ScanConfig, UnterminatedPolicy, DEFAULT_START_PATTERN};
pub use error::{AnnotationError, MalformedKind, Result};
pub use scanner::{DirectiveScanner, ScanOutput};
pub use snippet::{Hunk, Snippet};
pub use source_file::{LineBlocks, Rewrite, SourceFile};
