use crate::config::ManifestConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How externally produced files relate to the manifest's sources
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentMode {
    /// Files keep the source extension (`src/a.c`)
    #[default]
    Raw,
    /// Files are preprocessor output (`src/a.i`)
    Preprocessed,
}

impl InstrumentMode {
    /// Relative path an instrumented counterpart of `short_path` must end with
    fn expected_path(self, short_path: &str, config: &ManifestConfig) -> String {
        match self {
            Self::Raw => short_path.to_string(),
            Self::Preprocessed => Path::new(short_path)
                .with_extension(&config.preprocessed_extension)
                .to_string_lossy()
                .replace('\\', "/"),
        }
    }
}

/// Map manifest-listed sources to externally produced files.
///
/// A candidate matches when its trailing path components equal the source's
/// relative path after extension normalization. Headers are skipped, the
/// first matching candidate wins, and unmatched sources are left out.
pub fn map_instrumented_files<'a, S, C>(
    short_paths: S,
    candidates: &[C],
    mode: InstrumentMode,
    config: &ManifestConfig,
) -> BTreeMap<String, String>
where
    S: IntoIterator<Item = &'a str>,
    C: AsRef<Path>,
{
    let mut mapping = BTreeMap::new();

    for short_path in short_paths {
        if config.is_header(Path::new(short_path)) {
            continue;
        }

        let expected = mode.expected_path(short_path, config);
        let found = candidates
            .iter()
            .map(|candidate| candidate.as_ref())
            .find(|candidate| candidate.ends_with(&expected));

        match found {
            Some(candidate) => {
                log::debug!("Mapped {short_path} -> {}", candidate.display());
                mapping.insert(
                    short_path.to_string(),
                    candidate.to_string_lossy().into_owned(),
                );
            }
            None => log::debug!("No instrumented file for {short_path}"),
        }
    }

    mapping
}
