//! Change-listing parsers for changewise.
//!
//! Three upstream formats are normalized into one `Action` vocabulary:
//! - `git status --porcelain` (`porcelain`)
//! - `git diff --name-status` (`name_status`)
//! - `git diff-tree -r` raw output (`diff_tree`)
//!
//! Paths that git printed C-quoted are decoded, so every listing reports
//! the same path for the same file.
//!
//! All parsers are lenient: lines that don't match the expected shape are
//! treated as noise and dropped, never raised.

mod action;
mod diff_tree;
mod name_status;
mod path;
mod porcelain;


pub use action::{Action, ChangeRecord, ScoredAction};
pub use diff_tree::{parse_diff_tree, parse_diff_tree_line, DiffTreeRecord};
pub use name_status::{parse_name_status, parse_name_status_line};
pub use path::unquote_path;
pub use porcelain::{parse_status, parse_status_line};
