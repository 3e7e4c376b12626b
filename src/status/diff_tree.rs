//! Raw `git diff-tree -r` records.
//!
//! Format: `:<mode> <mode> <sha> <sha> <code>\t<path>[\t<destination>]`,
//! see git-diff-tree(1), "Raw output format".

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use super::action::{Action, ChangeRecord, ScoredAction};
use super::path::unquote_path;

static DIFF_TREE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^:\d+ \d+ ([a-f0-9]+) ([a-f0-9]+) (\w)(\d*)").expect("Invalid diff-tree regex")
});

/// States dropped from diff-tree output entirely.
const IGNORED_ACTIONS: [Action; 3] = [Action::Unmerged, Action::Unknown, Action::Type];

/// One parsed raw diff-tree record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffTreeRecord {
    pub hash_before: String,
    pub hash_after: String,
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<u8>,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    /// Where the file lives now: the destination for renames and copies.
    pub path: String,
}

impl DiffTreeRecord {
    pub fn to_change_record(&self) -> ChangeRecord {
        ChangeRecord {
            path: self.path.clone(),
            action: self.action,
            similarity: self.similarity,
        }
    }
}

/// Parse one raw diff-tree line, ignored states included.
///
/// Returns `None` for lines that do not match the raw format or have no path.
pub fn parse_diff_tree_line(line: &str) -> Option<DiffTreeRecord> {
    let mut fields = line.split('\t');
    let info = fields.next()?;
    let captures = DIFF_TREE_REGEX.captures(info)?;

    let code = format!("{}{}", &captures[3], &captures[4]);
    let action = Action::normalize(&code);
    let similarity = if action.is_scored() {
        ScoredAction::parse(&code).ok().map(|scored| scored.similarity)
    } else {
        None
    };

    let source = fields.next().filter(|s| !s.is_empty())?;
    let source = unquote_path(source).into_owned();
    let destination = if action.is_scored() {
        fields
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| unquote_path(s).into_owned())
    } else {
        None
    };
    let path = destination.clone().unwrap_or_else(|| source.clone());

    Some(DiffTreeRecord {
        hash_before: captures[1].to_string(),
        hash_after: captures[2].to_string(),
        action,
        similarity,
        source,
        destination,
        path,
    })
}

/// Parse diff-tree output, dropping blank lines and unmerged, unknown and
/// type-change records.
pub fn parse_diff_tree(output: &str) -> Vec<DiffTreeRecord> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let record = parse_diff_tree_line(line);
            if record.is_none() {
                tracing::trace!(line, "skipping unrecognized diff-tree line");
            }
            record
        })
        .filter(|record| !IGNORED_ACTIONS.contains(&record.action))
        .collect()
}
