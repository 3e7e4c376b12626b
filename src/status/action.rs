//! The shared action vocabulary and the change record built on it.

use crate::error::{ChangewiseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What happened to a path. A superset of git's status letters; `Tracked`
/// is synthetic and only used when listing every file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Add,
    Copy,
    Delete,
    Modified,
    Rename,
    Type,
    Unmerged,
    Unknown,
    Untracked,
    Tracked,
}

impl Action {
    /// Normalize a raw status code from porcelain, name-status or raw
    /// diff-tree output.
    ///
    /// Only the first character decides: `R097` is a rename and `C50` a
    /// copy, the digits being a similarity score. Unrecognized codes map to
    /// `Unknown` instead of failing.
    pub fn normalize(raw: &str) -> Action {
        match raw.chars().next() {
            Some('A') => Action::Add,
            Some('C') => Action::Copy,
            Some('D') => Action::Delete,
            Some('M') => Action::Modified,
            Some('R') => Action::Rename,
            Some('T') => Action::Type,
            Some('U') => Action::Unmerged,
            Some('?') => Action::Untracked,
            _ => Action::Unknown,
        }
    }

    /// Renames and copies are the only actions that carry a similarity score.
    pub fn is_scored(self) -> bool {
        matches!(self, Action::Rename | Action::Copy)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Copy => "copy",
            Action::Delete => "delete",
            Action::Modified => "modified",
            Action::Rename => "rename",
            Action::Type => "type",
            Action::Unmerged => "unmerged",
            Action::Unknown => "unknown",
            Action::Untracked => "untracked",
            Action::Tracked => "tracked",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rename or copy together with its similarity percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoredAction {
    pub action: Action,
    /// 0-100; 100 means the content is unchanged.
    pub similarity: u8,
}

impl ScoredAction {
    /// Parse a code such as `R097` or `C5`.
    ///
    /// # Returns
    ///
    /// * `Ok(ScoredAction)` - The code is a rename/copy with a score in 0-100
    /// * `Err(ChangewiseError::Similarity)` - Not a rename/copy, or no usable score
    pub fn parse(raw: &str) -> Result<Self> {
        let action = Action::normalize(raw);
        if !action.is_scored() {
            return Err(ChangewiseError::Similarity(raw.to_string()));
        }

        let similarity = raw[1..]
            .parse::<u8>()
            .ok()
            .filter(|score| *score <= 100)
            .ok_or_else(|| ChangewiseError::Similarity(raw.to_string()))?;

        Ok(Self { action, similarity })
    }
}

/// One changed path.
///
/// For renames and copies `path` is the destination, never the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<u8>,
}

impl ChangeRecord {
    pub fn new(path: impl Into<String>, action: Action) -> Self {
        Self {
            path: path.into(),
            action,
            similarity: None,
        }
    }

    /// Build a record from a raw status code, keeping the similarity score
    /// of renames and copies when the code has one.
    pub fn from_code(raw_code: &str, path: impl Into<String>) -> Self {
        let action = Action::normalize(raw_code);
        let similarity = if action.is_scored() {
            ScoredAction::parse(raw_code).ok().map(|s| s.similarity)
        } else {
            None
        };

        Self {
            path: path.into(),
            action,
            similarity,
        }
    }

    /// Whether the path may contain changed lines worth analysing.
    ///
    /// True for additions, modifications and untracked files. Renames and
    /// copies qualify when their similarity is below 100.
    ///
    /// A rename or copy without a score also qualifies. Porcelain status
    /// never prints scores (`R  old -> new`), so a staged rename there may
    /// still carry edits; treating it as unchanged would hide them.
    pub fn has_potential_modifications(&self) -> bool {
        match self.action {
            Action::Add | Action::Modified | Action::Untracked => true,
            Action::Rename | Action::Copy => self.similarity.is_none_or(|score| score < 100),
            Action::Delete
            | Action::Type
            | Action::Unmerged
            | Action::Unknown
            | Action::Tracked => false,
        }
    }
}
