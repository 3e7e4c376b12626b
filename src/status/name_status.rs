//! `git diff --name-status` lines.

use regex::Regex;
use std::sync::LazyLock;

use super::action::ChangeRecord;
use super::path::unquote_path;

/// `CODE<TAB>path[<TAB>destination]`.
static NAME_STATUS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w\d]+)\t([^\t]+)(?:\t(.+))?").expect("Invalid name-status regex")
});

/// Parse one name-status line.
///
/// Renames and copies list source then destination; the destination becomes
/// the record's path. Returns `None` for empty or non-matching lines.
pub fn parse_name_status_line(line: &str) -> Option<ChangeRecord> {
    let captures = NAME_STATUS_REGEX.captures(line)?;
    let code = &captures[1];
    let path = captures
        .get(3)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())?;

    Some(ChangeRecord::from_code(code, unquote_path(path)))
}

/// Parse every line of name-status output, skipping noise.
pub fn parse_name_status(output: &str) -> Vec<ChangeRecord> {
    output
        .lines()
        .filter_map(|line| {
            let record = parse_name_status_line(line);
            if record.is_none() && !line.is_empty() {
                tracing::trace!(line, "skipping unrecognized name-status line");
            }
            record
        })
        .collect()
}
