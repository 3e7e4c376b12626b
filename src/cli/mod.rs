//! CLI argument parsing for changewise.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Changewise: line-level change detection for git repositories.
///
/// Reports which files, and which lines within them, changed between two
/// commits or between a commit and the working copy. Every command prints
/// JSON on stdout.
#[derive(Parser, Debug)]
#[command(name = "changewise")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Run as if started in this directory.
    #[arg(short = 'C', long = "directory", global = true, value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Config file to use instead of `.changewise.yaml` at the repository root.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for changewise.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List files that may contain changed lines.
    ///
    /// Without `--after`, committed changes since `--before` are combined
    /// with staged, unstaged and untracked changes.
    ChangedFiles(ChangedFilesArgs),

    /// List every tracked and untracked file.
    AllFiles,

    /// Show the changed line numbers of one file.
    Lines(LinesArgs),

    /// List branches and tags that can be compared against.
    Targets,

    /// Classify the refs a push would update.
    ///
    /// Intended to be called from a git `pre-push` hook; reads the hook's
    /// stdin.
    PrePush(PrePushArgs),

    /// Interpret a unified diff read from stdin.
    ParseDiff,
}

/// Arguments for the `changed-files` command.
#[derive(Parser, Debug)]
pub struct ChangedFilesArgs {
    /// Older side of the comparison.
    #[arg(long, default_value = "HEAD")]
    pub before: String,

    /// Newer side of the comparison. Defaults to the working copy.
    #[arg(long)]
    pub after: Option<String>,
}

/// Arguments for the `lines` command.
#[derive(Parser, Debug)]
pub struct LinesArgs {
    /// Path relative to the repository root.
    pub path: String,

    /// Revision to diff the working copy against.
    #[arg(long, default_value = "HEAD")]
    pub base: String,
}

/// Arguments for the `pre-push` command.
#[derive(Parser, Debug)]
pub struct PrePushArgs {
    /// Name of the remote being pushed to.
    pub remote: String,

    /// URL of the remote.
    pub url: String,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_changed_files_defaults() {
        let cli = Cli::try_parse_from(["changewise", "changed-files"]).unwrap();
        if let Command::ChangedFiles(args) = cli.command {
            assert_eq!(args.before, "HEAD");
            assert_eq!(args.after, None);
        } else {
            panic!("Expected ChangedFiles command");
        }
    }

    #[test]
    fn parse_changed_files_range() {
        let cli = Cli::try_parse_from([
            "changewise",
            "changed-files",
            "--before",
            "main",
            "--after",
            "feature",
        ])
        .unwrap();
        if let Command::ChangedFiles(args) = cli.command {
            assert_eq!(args.before, "main");
            assert_eq!(args.after.as_deref(), Some("feature"));
        } else {
            panic!("Expected ChangedFiles command");
        }
    }

    #[test]
    fn parse_lines() {
        let cli = Cli::try_parse_from(["changewise", "lines", "src/app.js"]).unwrap();
        if let Command::Lines(args) = cli.command {
            assert_eq!(args.path, "src/app.js");
            assert_eq!(args.base, "HEAD");
        } else {
            panic!("Expected Lines command");
        }
    }

    #[test]
    fn parse_pre_push_requires_remote_and_url() {
        assert!(Cli::try_parse_from(["changewise", "pre-push", "origin"]).is_err());

        let cli =
            Cli::try_parse_from(["changewise", "pre-push", "origin", "git@host:r.git"]).unwrap();
        if let Command::PrePush(args) = cli.command {
            assert_eq!(args.remote, "origin");
            assert_eq!(args.url, "git@host:r.git");
        } else {
            panic!("Expected PrePush command");
        }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "changewise",
            "targets",
            "-C",
            "/tmp/repo",
            "--config",
            "ci.yaml",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Targets));
        assert_eq!(cli.directory, Some(PathBuf::from("/tmp/repo")));
        assert_eq!(cli.config, Some(PathBuf::from("ci.yaml")));
    }

    #[test]
    fn parse_simple_commands() {
        let cli = Cli::try_parse_from(["changewise", "all-files"]).unwrap();
        assert!(matches!(cli.command, Command::AllFiles));

        let cli = Cli::try_parse_from(["changewise", "parse-diff"]).unwrap();
        assert!(matches!(cli.command, Command::ParseDiff));
    }

    #[test]
    fn unknown_command_fails() {
        assert!(Cli::try_parse_from(["changewise", "frobnicate"]).is_err());
    }
}
