//! Config struct definition and default implementation.

use crate::shell::DEFAULT_MAX_OUTPUT_BYTES;
use serde::{Deserialize, Serialize};

/// File name looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = ".changewise.yaml";

/// Configuration for changewise.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Command execution
    // =========================================================================
    /// Git executable, looked up on PATH unless absolute.
    #[serde(default = "default_git_binary")]
    pub git_binary: String,

    /// Ceiling on captured command stdout, in bytes.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,

    /// Per-command deadline in seconds (none means wait indefinitely).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,

    // =========================================================================
    // Change-set filtering
    // =========================================================================
    /// Glob patterns for paths dropped from change sets.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            git_binary: default_git_binary(),
            max_output_bytes: default_max_output_bytes(),
            command_timeout_secs: None,
            exclude: Vec::new(),
        }
    }
}

fn default_git_binary() -> String {
    "git".to_string()
}

fn default_max_output_bytes() -> usize {
    DEFAULT_MAX_OUTPUT_BYTES
}
