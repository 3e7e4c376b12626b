//! `git show-ref` line classification.
//!
//! Three kinds of ref are of interest:
//! - `refs/heads/<branch>`
//! - `refs/remotes/<remote>/<branch>`
//! - `refs/tags/<name>`
//!
//! Anything else (notes, stash, ...) is ignored.

use serde::Serialize;

/// A branch, remote branch, or tag with the sha it points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RefRecord {
    LocalBranch {
        name: String,
        sha: String,
        full: String,
    },
    RemoteBranch {
        remote: String,
        name: String,
        sha: String,
        full: String,
    },
    Tag {
        name: String,
        sha: String,
        full: String,
    },
}

impl RefRecord {
    pub fn name(&self) -> &str {
        match self {
            RefRecord::LocalBranch { name, .. }
            | RefRecord::RemoteBranch { name, .. }
            | RefRecord::Tag { name, .. } => name,
        }
    }

    pub fn sha(&self) -> &str {
        match self {
            RefRecord::LocalBranch { sha, .. }
            | RefRecord::RemoteBranch { sha, .. }
            | RefRecord::Tag { sha, .. } => sha,
        }
    }

    /// `refs/remotes/<remote>/HEAD`, the symbolic pointer to a remote's
    /// default branch. Not something a user would pick to compare against.
    pub fn is_remote_head(&self) -> bool {
        matches!(self, RefRecord::RemoteBranch { name, .. } if name == "HEAD")
    }
}

/// Parse one `<sha> <ref>` line.
///
/// Branch and tag names keep every segment after the kind, so
/// `refs/remotes/origin/feature/x` is remote `origin`, branch `feature/x`.
/// Returns `None` for malformed lines and unrecognized kinds.
pub fn parse_show_ref_line(line: &str) -> Option<RefRecord> {
    let (sha, full) = line.trim().split_once(' ')?;
    let rest = full.strip_prefix("refs/")?;
    let (kind, rest) = rest.split_once('/')?;
    if sha.is_empty() || rest.is_empty() {
        return None;
    }

    let sha = sha.to_string();
    let full = full.to_string();

    match kind {
        "heads" => Some(RefRecord::LocalBranch {
            name: rest.to_string(),
            sha,
            full,
        }),
        "remotes" => {
            let (remote, name) = rest.split_once('/')?;
            Some(RefRecord::RemoteBranch {
                remote: remote.to_string(),
                name: name.to_string(),
                sha,
                full,
            })
        }
        "tags" => Some(RefRecord::Tag {
            name: rest.to_string(),
            sha,
            full,
        }),
        _ => None,
    }
}

/// Parse full `show-ref` output. Remote `HEAD` pointers are kept.
pub fn parse_show_ref(output: &str) -> Vec<RefRecord> {
    output.lines().filter_map(parse_show_ref_line).collect()
}

/// Refs a user can choose to compare against: everything except remote `HEAD`s.
pub fn comparison_targets(refs: Vec<RefRecord>) -> Vec<RefRecord> {
    refs.into_iter().filter(|r| !r.is_remote_head()).collect()
}
