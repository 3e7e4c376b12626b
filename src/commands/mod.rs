//! Command implementations for changewise.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Handlers read from and write to injected streams so
//! they can be driven from tests.

use crate::cli::{ChangedFilesArgs, Cli, Command, LinesArgs, PrePushArgs};
use changewise::changeset::{self, Comparison};
use changewise::config::Config;
use changewise::diff::interpret;
use changewise::error::{ChangewiseError, Result};
use changewise::git::Repository;
use changewise::prepush::PushInfo;
use serde::Serialize;
use serde_json::json;
use std::io::{Read, Write};
use std::path::PathBuf;

/// Where a command runs and which config it uses.
struct Context {
    start: PathBuf,
    config: Option<PathBuf>,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self> {
        let start = match &cli.directory {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().map_err(|e| {
                ChangewiseError::UserError(format!("failed to read current directory: {}", e))
            })?,
        };

        Ok(Self {
            start,
            config: cli.config.clone(),
        })
    }

    fn repository(&self) -> Result<Repository> {
        match &self.config {
            Some(path) => {
                let config = Config::load(path)?;
                Repository::discover(&self.start, Some(&config))
            }
            None => Repository::discover(&self.start, None),
        }
    }
}

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli, input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        Command::ChangedFiles(args) => cmd_changed_files(&ctx, args, out),
        Command::AllFiles => cmd_all_files(&ctx, out),
        Command::Lines(args) => cmd_lines(&ctx, args, out),
        Command::Targets => cmd_targets(&ctx, out),
        Command::PrePush(args) => cmd_pre_push(&ctx, args, input, out),
        Command::ParseDiff => cmd_parse_diff(input, out),
    }
}

fn cmd_changed_files(ctx: &Context, args: ChangedFilesArgs, out: &mut dyn Write) -> Result<()> {
    let repo = ctx.repository()?;
    let comparison = match args.after {
        Some(after) => Comparison::between(args.before, after),
        None => Comparison::with_working_copy(args.before),
    };

    let files = changeset::files_with_modifications(&repo, &comparison)?;
    write_json(out, &files)
}

fn cmd_all_files(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let repo = ctx.repository()?;
    write_json(out, &changeset::all_files(&repo)?)
}

fn cmd_lines(ctx: &Context, args: LinesArgs, out: &mut dyn Write) -> Result<()> {
    let repo = ctx.repository()?;
    let lines = repo.file_modifications(&args.path, &args.base)?;

    write_json(
        out,
        &json!({
            "path": args.path,
            "base": args.base,
            "lines": lines,
        }),
    )
}

fn cmd_targets(ctx: &Context, out: &mut dyn Write) -> Result<()> {
    let repo = ctx.repository()?;
    write_json(out, &repo.comparison_targets()?)
}

fn cmd_pre_push(
    ctx: &Context,
    args: PrePushArgs,
    input: &mut dyn Read,
    out: &mut dyn Write,
) -> Result<()> {
    let stdin = read_input(input)?;
    let info = PushInfo::from_hook(&args.remote, &args.url, &stdin)?;

    let repo = ctx.repository()?;
    let info = repo.resolve_push(info)?;
    write_json(out, &info)
}

fn cmd_parse_diff(input: &mut dyn Read, out: &mut dyn Write) -> Result<()> {
    let diff = read_input(input)?;
    write_json(out, &interpret(&diff)?)
}

fn read_input(input: &mut dyn Read) -> Result<String> {
    let mut text = String::new();
    input
        .read_to_string(&mut text)
        .map_err(|e| ChangewiseError::UserError(format!("failed to read stdin: {}", e)))?;
    Ok(text)
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> Result<()> {
    let write_error = |e: std::io::Error| {
        ChangewiseError::UserError(format!("failed to write output: {}", e))
    };

    serde_json::to_writer_pretty(&mut *out, value).map_err(|e| {
        ChangewiseError::UserError(format!("failed to serialize output: {}", e))
    })?;
    writeln!(out).map_err(write_error)?;
    out.flush().map_err(write_error)
}
