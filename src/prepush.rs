//! Git pre-push hook input.
//!
//! git runs the hook as `pre-push <remote> <url>` and writes one line per
//! ref being pushed to stdin:
//!
//! ```text
//! <local ref> <local sha> <remote ref> <remote sha>
//! ```
//!
//! Examples:
//!
//! ```text
//! refs/heads/topic b043e68623118e827eaf2ef0fbb29bc79f6f9ee8 refs/heads/topic 0000000000000000000000000000000000000000
//! HEAD b043e68623118e827eaf2ef0fbb29bc79f6f9ee8 refs/heads/main 300bf412782759fad91e9af4ce0c3859b8c1a543
//! (delete) 0000000000000000000000000000000000000000 refs/heads/old b043e68623118e827eaf2ef0fbb29bc79f6f9ee8
//! ```

use crate::error::{ChangewiseError, Result};
use serde::Serialize;

/// Remote sha git sends when the remote ref does not exist yet.
pub const EMPTY_SHA: &str = "0000000000000000000000000000000000000000";

const DELETE_PREFIX: &str = "(delete) ";

/// What a pushed ref does to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushKind {
    CreateBranch,
    UpdateBranch,
    DeleteBranch,
    /// Any push to `refs/tags/`, whether it creates, moves or deletes the tag.
    TagAction,
}

/// Result of committing staged fixes during a push.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixupOutcome {
    /// Nothing was staged, so nothing was committed or pushed.
    NothingAdded,
    /// The fixup commit was pushed to the update's remote ref.
    Pushed,
}

/// One line of hook input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushUpdate {
    pub local_ref: String,
    pub local_sha: String,
    pub remote_ref: String,
    pub remote_sha: String,
    pub kind: PushKind,
    /// Branch name of the local ref, once symbolic refs are resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_branch: Option<String>,
}

/// Everything the hook was told about one push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushInfo {
    pub remote: String,
    pub url: String,
    pub updates: Vec<PushUpdate>,
}

impl PushInfo {
    /// Build from the hook's two arguments and its stdin.
    ///
    /// # Returns
    ///
    /// * `Ok(PushInfo)` - All lines parsed (empty input means nothing is pushed)
    /// * `Err(ChangewiseError::UserError)` - Missing arguments or a malformed line
    pub fn from_hook(remote: &str, url: &str, input: &str) -> Result<Self> {
        if remote.is_empty() || url.is_empty() {
            return Err(ChangewiseError::UserError(
                "missing remote and url - ensure hook arguments are being passed ($1 and $2)"
                    .to_string(),
            ));
        }

        Ok(Self {
            remote: remote.to_string(),
            url: url.to_string(),
            updates: parse_updates(input)?,
        })
    }
}

/// Parse hook stdin into updates, one per non-empty line.
pub fn parse_updates(input: &str) -> Result<Vec<PushUpdate>> {
    input
        .trim()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_update_line)
        .collect()
}

fn parse_update_line(line: &str) -> Result<PushUpdate> {
    let chunks: Vec<&str> = line.split(' ').collect();
    let [local_ref, local_sha, remote_ref, remote_sha] = chunks[..] else {
        return Err(ChangewiseError::UserError(format!(
            "invalid pre-push line format (expected 4 fields, got {}): '{}'",
            chunks.len(),
            line
        )));
    };

    let kind = if remote_ref.starts_with("refs/tags/") {
        PushKind::TagAction
    } else if line.starts_with(DELETE_PREFIX) {
        PushKind::DeleteBranch
    } else if remote_sha == EMPTY_SHA {
        PushKind::CreateBranch
    } else {
        PushKind::UpdateBranch
    };

    Ok(PushUpdate {
        local_ref: local_ref.to_string(),
        local_sha: local_sha.to_string(),
        remote_ref: remote_ref.to_string(),
        remote_sha: remote_sha.to_string(),
        kind,
        local_branch: None,
        remote_branch: None,
    })
}

/// Last path segment of a ref: `refs/heads/main` is `main`.
pub fn ref_to_branch_name(reference: &str) -> &str {
    reference.rsplit('/').next().unwrap_or(reference)
}
