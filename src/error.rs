//! Error types for changewise.
//!
//! Uses thiserror for derive macros. Callers dispatch on the variant rather
//! than on message text; each variant maps to one exit code.

use crate::exit_codes;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Main error type for changewise operations.
#[derive(Error, Debug)]
pub enum ChangewiseError {
    /// No `.git` entry was found walking up from the starting directory.
    #[error(
        "not a git repository (searched upwards from '{}') - this operation can only be performed in a git repository",
        start.display()
    )]
    NotARepository { start: PathBuf },

    /// An external command exited unsuccessfully.
    #[error(
        "'{command}' failed with exit code {}, in path '{}'\nstdout: {stdout}\nstderr: {stderr}",
        code.map(|c| c.to_string()).unwrap_or_else(|| "none".to_string()),
        cwd.display()
    )]
    CommandFailed {
        command: String,
        cwd: PathBuf,
        code: Option<i32>,
        signal: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Unified diff text contained a line that could not be classified.
    #[error(transparent)]
    ParseFailed(#[from] DiffParseError),

    /// A command template's placeholder count did not match the arguments supplied.
    #[error("expected {expected} args, got {got}")]
    ArgumentCountMismatch { expected: usize, got: usize },

    /// Captured stdout exceeded the configured ceiling.
    #[error("output of '{command}' exceeded {limit} bytes")]
    OutputTooLarge { command: String, limit: usize },

    /// The command did not finish before its deadline and was killed.
    #[error("'{command}' did not finish within {after:?}")]
    Timeout { command: String, after: Duration },

    /// The process could not be started at all.
    #[error("failed to execute '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A rename or copy code carried no parseable similarity score.
    #[error("missing similarity score in '{0}'")]
    Similarity(String),

    /// Invalid arguments, config, or hook input.
    #[error("{0}")]
    UserError(String),
}

impl ChangewiseError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ChangewiseError::NotARepository { .. } => exit_codes::NOT_A_REPOSITORY,
            ChangewiseError::ParseFailed(_) => exit_codes::PARSE_FAILURE,
            ChangewiseError::CommandFailed { .. }
            | ChangewiseError::OutputTooLarge { .. }
            | ChangewiseError::Timeout { .. }
            | ChangewiseError::Spawn { .. } => exit_codes::GIT_FAILURE,
            ChangewiseError::ArgumentCountMismatch { .. }
            | ChangewiseError::Similarity(_)
            | ChangewiseError::UserError(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Context for a unified diff line that could not be interpreted.
///
/// Carries the failing line, its 0-based index, every line before it and
/// every line from it onwards, so the malformed input can be located by eye.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffParseError {
    pub reason: String,
    pub line: String,
    pub index: usize,
    pub parsed: Vec<String>,
    pub unparsed: Vec<String>,
}

impl fmt::Display for DiffParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parsing failed at line {}: {}\n\nline: {}\n\nparsed:\n{}\n\nunparsed:\n{}",
            self.index,
            self.reason,
            self.line,
            self.parsed.join("\n"),
            self.unparsed.join("\n")
        )
    }
}

impl std::error::Error for DiffParseError {}

/// Result type alias for changewise operations.
pub type Result<T> = std::result::Result<T, ChangewiseError>;
