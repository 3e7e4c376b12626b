//! Config loading, validation, and derived settings.

use super::model::{Config, CONFIG_FILE_NAME};
use crate::error::{ChangewiseError, Result};
use crate::shell::ExecOptions;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(ChangewiseError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ChangewiseError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load `.changewise.yaml` from a repository root, falling back to
    /// defaults when the file does not exist.
    pub fn load_from_root<P: AsRef<Path>>(root: P) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // an empty document deserializes to unit, not a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml).map_err(|e| {
            ChangewiseError::UserError(format!("failed to parse config YAML: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ChangewiseError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `git_binary` must be non-empty
    /// - `max_output_bytes` must be positive
    /// - `command_timeout_secs`, when set, must be positive
    /// - `exclude` entries must be valid globs
    pub fn validate(&self) -> Result<()> {
        if self.git_binary.trim().is_empty() {
            return Err(ChangewiseError::UserError(
                "config validation failed: git_binary must not be empty".to_string(),
            ));
        }

        if self.max_output_bytes == 0 {
            return Err(ChangewiseError::UserError(
                "config validation failed: max_output_bytes must be greater than 0".to_string(),
            ));
        }

        if self.command_timeout_secs == Some(0) {
            return Err(ChangewiseError::UserError(
                "config validation failed: command_timeout_secs must be greater than 0".to_string(),
            ));
        }

        self.path_filter()?;

        Ok(())
    }

    /// Limits for every command run on behalf of this config.
    pub fn exec_options(&self) -> ExecOptions {
        ExecOptions {
            max_output_bytes: self.max_output_bytes,
            timeout: self.command_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Compile the `exclude` globs.
    pub fn path_filter(&self) -> Result<PathFilter> {
        PathFilter::new(&self.exclude)
    }
}

/// Compiled exclusion globs.
#[derive(Debug, Clone)]
pub struct PathFilter {
    globset: GlobSet,
}

impl PathFilter {
    /// Build a filter from glob patterns.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| {
                ChangewiseError::UserError(format!(
                    "invalid glob pattern in exclude: '{}' - {}",
                    pattern, e
                ))
            })?;
            builder.add(glob);
        }

        let globset = builder.build().map_err(|e| {
            ChangewiseError::UserError(format!("failed to compile exclude globs: {}", e))
        })?;

        Ok(Self { globset })
    }

    /// A filter that excludes nothing.
    pub fn empty() -> Self {
        Self {
            globset: GlobSet::empty(),
        }
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.globset.is_match(path)
    }
}
