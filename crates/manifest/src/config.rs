use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tree walk and artifact settings for one challenge source root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// File extensions (without dot) that are scanned for annotations
    pub extensions: Vec<String>,

    /// Directory names whose subtrees are never visited
    pub ignored_dirs: Vec<String>,

    /// Extensions treated as headers by the instrumented-file mapping
    pub header_extensions: Vec<String>,

    /// Extension produced by the preprocessor for a source file
    pub preprocessed_extension: String,

    /// Artifact file names written into the source root
    pub artifacts: ArtifactNames,
}

/// File names of the persisted artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    pub manifest: String,
    pub patch: String,
    pub vuln: String,
    pub fault_localization: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            manifest: "manifest".to_string(),
            patch: "patch".to_string(),
            vuln: "vuln".to_string(),
            fault_localization: "fault_localization".to_string(),
        }
    }
}

impl ArtifactNames {
    /// All artifact names, in cleanup order
    pub fn all(&self) -> [&str; 4] {
        [
            self.patch.as_str(),
            self.vuln.as_str(),
            self.manifest.as_str(),
            self.fault_localization.as_str(),
        ]
    }
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["c".to_string(), "cc".to_string(), "h".to_string()],
            ignored_dirs: vec!["polls".to_string(), "pov".to_string(), "support".to_string()],
            header_extensions: vec!["h".to_string()],
            preprocessed_extension: "i".to_string(),
            artifacts: ArtifactNames::default(),
        }
    }
}

impl ManifestConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.extensions.is_empty() {
            return Err("extensions must list at least one suffix".to_string());
        }

        if let Some(ext) = self
            .extensions
            .iter()
            .chain(&self.header_extensions)
            .chain(std::iter::once(&self.preprocessed_extension))
            .find(|ext| ext.is_empty() || ext.starts_with('.'))
        {
            return Err(format!(
                "extension '{ext}' must be non-empty and given without a leading dot"
            ));
        }

        if self.extensions.contains(&self.preprocessed_extension) {
            return Err(format!(
                "preprocessed_extension '{}' collides with a source extension",
                self.preprocessed_extension
            ));
        }

        Ok(())
    }

    /// Whether `path` has one of the scanned extensions
    pub fn is_source_file(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.extensions)
    }

    pub fn is_header(&self, path: &Path) -> bool {
        Self::has_extension(path, &self.header_extensions)
    }

    pub fn is_ignored_dir(&self, name: &str) -> bool {
        self.ignored_dirs.iter().any(|ignored| ignored == name)
    }

    fn has_extension(path: &Path, candidates: &[String]) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| candidates.iter().any(|candidate| candidate == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ManifestConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ManifestConfig::default();

        config.extensions = vec![];
        assert!(config.validate().is_err());

        config.extensions = vec![".c".to_string()];
        assert!(config.validate().is_err());

        config.extensions = vec!["c".to_string(), "i".to_string()];
        assert!(config.validate().is_err());

        config.extensions = vec!["c".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_extension_matching_is_exact() {
        let config = ManifestConfig::default();
        assert!(config.is_source_file(Path::new("src/main.c")));
        assert!(config.is_source_file(Path::new("lib/x.cc")));
        assert!(config.is_source_file(Path::new("include/x.h")));
        assert!(!config.is_source_file(Path::new("build.xml")));
        assert!(!config.is_source_file(Path::new("x.cpp")));
        assert!(!config.is_source_file(Path::new("Makefile")));
        assert!(config.is_header(Path::new("x.h")));
        assert!(!config.is_header(Path::new("x.c")));
    }
}
