//! Changewise: line-level change detection for git repositories.
//!
//! The parsing core (`diff`, `status`, `refs`, `prepush`) turns raw git
//! output into typed records without touching the filesystem. `git` runs
//! the commands through `shell`, and `changeset` combines the results.

pub mod changeset;
pub mod config;
pub mod diff;
pub mod error;
pub mod exit_codes;
pub mod git;
pub mod prepush;
pub mod refs;
pub mod shell;
pub mod status;

#[cfg(test)]
mod test_support;
