//! # Patchmark Manifest
//!
//! Challenge-wide aggregation of annotated sources.
//!
//! ## Pipeline
//!
//! ```text
//! Challenge source root
//!     │
//!     ├──> File Scanner (extension filter, skips polls/pov/support)
//!     │      └─> .c / .cc / .h files
//!     │
//!     ├──> DirectiveScanner (per file)
//!     │      └─> SourceFile, LineStats
//!     │
//!     └──> Artifacts
//!            ├─> manifest            (annotated file listing)
//!            ├─> patch / vuln        (JSON line blocks)
//!            └─> fault_localization  (one row per vulnerable line)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use patchmark_manifest::Manifest;
//!
//! fn main() -> patchmark_manifest::Result<()> {
//!     let manifest = Manifest::new("/path/to/challenge/src")?;
//!     manifest.write(&manifest.artifact_path("manifest"))?;
//!
//!     println!(
//!         "{} annotated files, {} vulnerable lines",
//!         manifest.vuln_files().len(),
//!         manifest.vuln_lines()
//!     );
//!     Ok(())
//! }
//! ```

mod artifacts;
mod config;
mod error;
mod instrumented;
mod manifest;
mod scanner;
mod stats;

pub use artifacts::{clean_artifacts, read_listing, remove_patches_from_listing, FaultLocation, PatchSet};
pub use config::{ArtifactNames, ManifestConfig};
pub use error::{ManifestError, Result};
pub use instrumented::{map_instrumented_files, InstrumentMode};
pub use manifest::Manifest;
pub use scanner::{FileScanner, ScannedFile};
pub use stats::LineStats;
