//! Git access for changewise.
//!
//! A [`Repository`] runs git through the [`shell`](crate::shell) runner and
//! hands the captured text to the pure parsers in `diff`, `status` and
//! `refs`. Every value interpolated into a command is shell-quoted here.

use crate::config::{Config, PathFilter};
use crate::diff::{interpret, LineModifications};
use crate::error::{ChangewiseError, Result};
use crate::prepush::{ref_to_branch_name, FixupOutcome, PushInfo, PushKind, PushUpdate};
use crate::refs::{comparison_targets, parse_show_ref, RefRecord};
use crate::shell::{self, quote, CommandOutput, ExecOptions};
use crate::status::{
    parse_diff_tree, parse_name_status, parse_status, unquote_path, Action, ChangeRecord,
    DiffTreeRecord,
};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static SHA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-f0-9]{40}$").expect("Invalid sha regex"));

/// Find the repository root by walking up from `start` until a directory
/// containing `.git` (a directory, or a file for linked worktrees) is found.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Canonical path of the repository root
/// * `Err(ChangewiseError::NotARepository)` - No `.git` above `start`
/// * `Err(ChangewiseError::UserError)` - `start` does not exist
pub fn find_repo_root<P: AsRef<Path>>(start: P) -> Result<PathBuf> {
    let start = start.as_ref();
    let canonical = start.canonicalize().map_err(|e| {
        ChangewiseError::UserError(format!(
            "failed to resolve path '{}': {}",
            start.display(),
            e
        ))
    })?;

    canonical
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
        .ok_or(ChangewiseError::NotARepository { start: canonical })
}

/// A git working tree plus the settings used to query it.
#[derive(Debug, Clone)]
pub struct Repository {
    root: PathBuf,
    git_binary: String,
    exec: ExecOptions,
    filter: PathFilter,
}

impl Repository {
    /// Open the repository at `root` with the given config.
    pub fn open<P: AsRef<Path>>(root: P, config: &Config) -> Result<Self> {
        Ok(Self {
            root: root.as_ref().to_path_buf(),
            git_binary: config.git_binary.clone(),
            exec: config.exec_options(),
            filter: config.path_filter()?,
        })
    }

    /// Locate the repository containing `start`.
    ///
    /// Uses `config` when given, otherwise `.changewise.yaml` at the root
    /// (or defaults when there is none).
    pub fn discover<P: AsRef<Path>>(start: P, config: Option<&Config>) -> Result<Self> {
        let root = find_repo_root(start)?;
        match config {
            Some(config) => Self::open(root, config),
            None => {
                let config = Config::load_from_root(&root)?;
                Self::open(root, &config)
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Run `git <template>` with every value shell-quoted.
    fn git(&self, template: &str, values: &[&str]) -> Result<CommandOutput> {
        let quoted: Vec<String> = values.iter().map(|v| quote(v).into_owned()).collect();
        let args: Vec<&str> = quoted.iter().map(String::as_str).collect();
        // the binary path is not a template; escape its percent signs
        let binary = quote(&self.git_binary).replace('%', "%%");
        // keep non-ASCII paths literal; other special characters are still
        // C-quoted and decoded by the parsers
        let template = format!("{} -c core.quotePath=false {}", binary, template);

        shell::execute(&self.root, &template, &args, &self.exec)
    }

    /// `git rev-parse`-style queries whose only output is one trimmed line.
    fn git_line(&self, template: &str, values: &[&str]) -> Result<String> {
        Ok(self.git(template, values)?.stdout.trim().to_string())
    }

    // ========================================================================
    // Change listings
    // ========================================================================

    /// Changes between two commits, with rename and copy detection.
    pub fn committed_changes(&self, before: &str, after: &str) -> Result<Vec<ChangeRecord>> {
        let output = self.git(
            "diff --find-copies --find-renames --name-status %s %s",
            &[before, after],
        )?;
        Ok(parse_name_status(&output.stdout))
    }

    /// Staged and unstaged changes to tracked files.
    ///
    /// Untracked files come from [`untracked_paths`](Self::untracked_paths)
    /// instead: status reports an untracked directory, not the files in it.
    pub fn working_copy_changes(&self) -> Result<Vec<ChangeRecord>> {
        let output = self.git("status --untracked-files=no --porcelain", &[])?;
        Ok(parse_status(&output.stdout))
    }

    /// Every untracked, non-ignored file.
    pub fn untracked_paths(&self) -> Result<Vec<ChangeRecord>> {
        let output = self.git("ls-files --others --exclude-standard", &[])?;
        Ok(records_from_paths(&output, Action::Untracked))
    }

    /// Every tracked file.
    pub fn tracked_paths(&self) -> Result<Vec<ChangeRecord>> {
        let output = self.git("ls-files --exclude-standard", &[])?;
        Ok(records_from_paths(&output, Action::Tracked))
    }

    /// Raw diff-tree records between two commits (older `previous`, newer `current`).
    pub fn diff_tree(&self, current: &str, previous: &str) -> Result<Vec<DiffTreeRecord>> {
        let output = self.git(
            "diff-tree -r --find-renames --find-copies %s %s",
            &[previous, current],
        )?;
        Ok(parse_diff_tree(&output.stdout))
    }

    // ========================================================================
    // Line modifications
    // ========================================================================

    /// 1-indexed lines of `path` that are new or modified relative to `base`.
    ///
    /// A file not present in `HEAD` is new in its entirety, so every line of
    /// the on-disk file is reported. Otherwise the working-copy diff against
    /// `base` is interpreted.
    pub fn file_modifications(&self, path: &str, base: &str) -> Result<LineModifications> {
        let listing = self.git("ls-tree HEAD -- %s", &[path])?;

        if listing.is_empty() {
            tracing::debug!(path, "not in HEAD, treating every line as new");
            let full_path = self.root.join(path);
            let content = std::fs::read_to_string(&full_path).map_err(|e| {
                ChangewiseError::UserError(format!(
                    "failed to read '{}': {}",
                    full_path.display(),
                    e
                ))
            })?;
            return Ok((1..=content.lines().count()).collect());
        }

        let diff = self.git("diff %s -- %s", &[base, path])?;
        interpret(&diff.stdout)
    }

    // ========================================================================
    // Refs and commits
    // ========================================================================

    /// Every ref parsed from `show-ref`, remote `HEAD` pointers included.
    pub fn refs(&self) -> Result<Vec<RefRecord>> {
        match self.git("show-ref", &[]) {
            Ok(output) => Ok(parse_show_ref(&output.stdout)),
            // show-ref exits 1 when the repository has no refs at all
            Err(ChangewiseError::CommandFailed {
                code: Some(1),
                ref stdout,
                ..
            }) if stdout.trim().is_empty() => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    /// Branches and tags a user can compare against.
    pub fn comparison_targets(&self) -> Result<Vec<RefRecord>> {
        Ok(comparison_targets(self.refs()?))
    }

    pub fn head_sha(&self) -> Result<String> {
        self.git_line("rev-parse HEAD", &[])
    }

    pub fn current_branch(&self) -> Result<String> {
        self.git_line("rev-parse --abbrev-ref HEAD", &[])
    }

    /// Resolve any commit-ish to a full sha.
    pub fn resolve(&self, commitish: &str) -> Result<String> {
        self.git_line("rev-parse %s", &[commitish])
    }

    /// Whether `ancestor` is reachable from `tip`. Both must be full shas.
    ///
    /// A commit git doesn't know (e.g. not yet fetched) is not an ancestor.
    pub fn contains_ancestor(&self, ancestor: &str, tip: &str) -> Result<bool> {
        for sha in [ancestor, tip] {
            if !SHA_REGEX.is_match(sha) {
                return Err(ChangewiseError::UserError(format!(
                    "should be a valid sha, got: {}",
                    sha
                )));
            }
        }

        match self.git("merge-base --is-ancestor %s %s", &[ancestor, tip]) {
            Ok(_) => Ok(true),
            Err(ChangewiseError::CommandFailed { code: Some(1), .. }) => Ok(false),
            Err(ChangewiseError::CommandFailed { ref stderr, .. })
                if stderr.contains("Not a valid commit name") =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Whether `remote` has a branch called `branch`.
    pub fn remote_branch_exists(&self, remote: &str, branch: &str) -> Result<bool> {
        let output = self.git("ls-remote --heads %s %s", &[remote, branch])?;
        Ok(!output.stdout.trim().is_empty())
    }

    /// Contents of `path` as of `rev`.
    pub fn show_path_in_commit(&self, rev: &str, path: &str) -> Result<String> {
        let object = format!("{}:{}", rev, path);
        Ok(self.git("show %s", &[&object])?.stdout)
    }

    /// `git show` output for any object.
    pub fn show(&self, rev: &str) -> Result<String> {
        Ok(self.git("show %s", &[rev])?.stdout)
    }

    // ========================================================================
    // Working copy state
    // ========================================================================

    /// No staged, unstaged or untracked changes.
    pub fn working_copy_is_clean(&self) -> Result<bool> {
        Ok(self.git("status --porcelain", &[])?.is_empty())
    }

    /// Something is staged for the next commit.
    pub fn has_staged_changes(&self) -> Result<bool> {
        Ok(!self.git("diff --cached --name-status", &[])?.is_empty())
    }

    pub fn stage_file(&self, path: &str) -> Result<()> {
        self.git("add %s", &[path])?;
        Ok(())
    }

    pub fn fetch(&self, remote: &str, branch: &str) -> Result<()> {
        self.git("fetch %s %s", &[remote, branch])?;
        Ok(())
    }

    // ========================================================================
    // Pre-push
    // ========================================================================

    /// Resolve symbolic local refs (e.g. `HEAD`) to full ref names and fill
    /// in branch names for every update.
    ///
    /// Refs git cannot name symbolically (a bare sha) keep their original
    /// text. Deletions have no local ref to resolve.
    pub fn resolve_push(&self, mut info: PushInfo) -> Result<PushInfo> {
        for update in &mut info.updates {
            update.remote_branch = Some(ref_to_branch_name(&update.remote_ref).to_string());

            if update.kind == PushKind::DeleteBranch {
                continue;
            }

            let full = self.git_line("rev-parse --symbolic-full-name %s", &[&update.local_ref])?;
            let full = if full.is_empty() {
                update.local_ref.clone()
            } else {
                full
            };
            update.local_branch = Some(ref_to_branch_name(&full).to_string());
        }

        Ok(info)
    }

    /// Commit whatever is staged and push it to `update`'s remote ref,
    /// bypassing hooks so the running pre-push hook isn't re-entered.
    ///
    /// # Returns
    ///
    /// * `Ok(FixupOutcome::NothingAdded)` - Nothing staged; no commit, no push
    /// * `Ok(FixupOutcome::Pushed)` - Committed and pushed
    /// * `Err(ChangewiseError::CommandFailed)` - The commit or push failed
    pub fn commit_and_push(
        &self,
        info: &PushInfo,
        update: &PushUpdate,
        message: &str,
    ) -> Result<FixupOutcome> {
        if !self.has_staged_changes()? {
            tracing::debug!(remote_ref = %update.remote_ref, "nothing staged, skipping fixup push");
            return Ok(FixupOutcome::NothingAdded);
        }

        self.git("commit -m %s", &[message])?;

        let refspec = format!("{}:{}", update.local_ref, update.remote_ref);
        self.git("push --no-verify %s %s", &[&info.remote, &refspec])?;
        tracing::info!(remote = %info.remote, refspec = %refspec, "pushed fixup commit");

        Ok(FixupOutcome::Pushed)
    }
}

fn records_from_paths(output: &CommandOutput, action: Action) -> Vec<ChangeRecord> {
    output
        .lines()
        .into_iter()
        .filter(|line| !line.is_empty())
        .map(|path| ChangeRecord::new(unquote_path(path), action))
        .collect()
}
