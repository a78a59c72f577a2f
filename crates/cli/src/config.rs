use anyhow::{Context as AnyhowContext, Result};
use patchmark_annotation::ScanConfig;
use patchmark_manifest::ManifestConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming a TOML config file
pub const CONFIG_ENV: &str = "PATCHMARK_CONFIG";

/// Settings file layout:
///
/// ```toml
/// [scan]
/// on_unterminated = "drop"
///
/// [manifest]
/// ignored_dirs = ["polls", "pov", "support", "tests"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub scan: ScanConfig,
    pub manifest: ManifestConfig,
}

impl HarnessConfig {
    /// Load from `explicit`, else from `$PATCHMARK_CONFIG`, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from));

        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.scan.validate().map_err(anyhow::Error::msg)?;
        config.manifest.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patchmark_annotation::UnterminatedPolicy;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_file_gives_defaults() {
        assert_eq!(HarnessConfig::from_toml("").unwrap(), HarnessConfig::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = HarnessConfig::from_toml(
            r#"
[scan]
on_unterminated = "drop"

[manifest]
ignored_dirs = ["polls", "pov", "support", "tests"]

[manifest.artifacts]
manifest = "manifest.txt"
"#,
        )
        .unwrap();

        assert_eq!(config.scan.on_unterminated, UnterminatedPolicy::Drop);
        assert_eq!(config.scan.end_directive, "#endif");
        assert_eq!(config.manifest.ignored_dirs.len(), 4);
        assert_eq!(config.manifest.artifacts.manifest, "manifest.txt");
        assert_eq!(config.manifest.artifacts.patch, "patch");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(HarnessConfig::from_toml("[scan]\nend_directive = \"\"\n").is_err());
        assert!(HarnessConfig::from_toml("[manifest]\nextensions = [\".c\"]\n").is_err());
    }
}
