use serde::{Deserialize, Serialize};

/// Directive pattern matching an opening `PATCHED` conditional
pub const DEFAULT_START_PATTERN: &str = "^#(if|ifndef|ifdef) PATCHED";

/// Configuration for directive scanning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Regular expression matched against the trimmed line to open a block
    pub start_pattern: String,

    /// Prefix of the trimmed line that switches to the vulnerable branch
    pub change_directive: String,

    /// Prefix of the trimmed line that closes a block
    pub end_directive: String,

    /// Single line emitted for a branch with no body
    pub placeholder: String,

    /// What to do with a block still open at end of file
    pub on_unterminated: UnterminatedPolicy,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_pattern: DEFAULT_START_PATTERN.to_string(),
            change_directive: "#else".to_string(),
            end_directive: "#endif".to_string(),
            placeholder: " ".to_string(),
            on_unterminated: UnterminatedPolicy::Error,
        }
    }
}

impl ScanConfig {
    /// Lenient preset: unterminated blocks are dropped with a warning
    pub fn lenient() -> Self {
        Self {
            on_unterminated: UnterminatedPolicy::Drop,
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.start_pattern.trim().is_empty() {
            return Err("start_pattern must not be empty".to_string());
        }

        if self.change_directive.trim().is_empty() {
            return Err("change_directive must not be empty".to_string());
        }

        if self.end_directive.trim().is_empty() {
            return Err("end_directive must not be empty".to_string());
        }

        if self.change_directive == self.end_directive {
            return Err(format!(
                "change_directive and end_directive are both '{}'",
                self.end_directive
            ));
        }

        if self.placeholder.is_empty() {
            return Err("placeholder must contain at least one character".to_string());
        }

        Ok(())
    }
}

/// Handling of a block that reaches end of file without its closing directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnterminatedPolicy {
    /// Fail the scan with a malformed annotation error
    #[default]
    Error,

    /// Discard the open block and keep the snippets closed before it
    Drop,
}
