//! `git status --porcelain` short-format lines.

use regex::Regex;
use std::sync::LazyLock;

use super::action::{Action, ChangeRecord};
use super::path::unquote_path;

/// `XY path`: index status, work-tree status, a space, then the path.
static STATUS_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.)(.) (.+)").expect("Invalid status line regex"));

/// Parse one porcelain status line.
///
/// The index column wins unless it is blank, in which case the work-tree
/// column is used (`AM f` is an add, ` M f` a modification). Renames and
/// copies are reported as `old -> new`; the record keeps the destination.
/// Quoted paths (`"my file.js"`) are decoded.
///
/// Returns `None` for empty or non-matching lines.
pub fn parse_status_line(line: &str) -> Option<ChangeRecord> {
    let captures = STATUS_LINE_REGEX.captures(line)?;
    let x = &captures[1];
    let y = &captures[2];
    let path = &captures[3];

    let code = if x == " " { y } else { x };
    let action = Action::normalize(code);

    let path = match path.split_once(" -> ") {
        Some((_, destination)) if action.is_scored() => destination,
        _ => path,
    };

    Some(ChangeRecord::new(unquote_path(path), action))
}

/// Parse every line of porcelain status output, skipping noise.
pub fn parse_status(output: &str) -> Vec<ChangeRecord> {
    output
        .lines()
        .filter_map(|line| {
            let record = parse_status_line(line);
            if record.is_none() && !line.is_empty() {
                tracing::trace!(line, "skipping unrecognized status line");
            }
            record
        })
        .collect()
}
