//! Change-set aggregation.
//!
//! Answers "which files might contain changed lines" for a comparison,
//! combining committed, working-copy and untracked listings. Independent git
//! queries run on scoped threads and are joined before combining.

use crate::config::PathFilter;
use crate::error::Result;
use crate::git::Repository;
use crate::status::ChangeRecord;
use std::collections::HashSet;
use std::thread::{self, ScopedJoinHandle};

/// The newer side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum After {
    /// The on-disk state: committed, staged, unstaged and untracked changes.
    #[default]
    WorkingCopy,
    /// A committed ref or sha.
    Commit(String),
}

/// A pair of targets to compare.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub before: String,
    pub after: After,
}

impl Default for Comparison {
    fn default() -> Self {
        Self {
            before: "HEAD".to_string(),
            after: After::WorkingCopy,
        }
    }
}

impl Comparison {
    /// Compare `before` against the working copy.
    pub fn with_working_copy(before: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: After::WorkingCopy,
        }
    }

    /// Compare two committed targets.
    pub fn between(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: After::Commit(after.into()),
        }
    }
}

/// Files that may hold modified lines for `comparison`.
///
/// For the working copy, the committed range `before..HEAD`, the tracked
/// working-copy status and the untracked listing are queried concurrently
/// and combined in that order. For a committed `after` only the range diff
/// is used.
///
/// # Returns
///
/// * `Ok(Vec<ChangeRecord>)` - Records passing the potential-modification
///   check and not excluded by config, one per path
/// * `Err(ChangewiseError)` - The first git query that failed
pub fn files_with_modifications(
    repo: &Repository,
    comparison: &Comparison,
) -> Result<Vec<ChangeRecord>> {
    let before = comparison.before.as_str();

    let groups = match &comparison.after {
        After::Commit(after) => vec![repo.committed_changes(before, after)?],
        After::WorkingCopy => {
            let (committed, working, untracked) = thread::scope(|s| {
                let committed = s.spawn(|| repo.committed_changes(before, "HEAD"));
                let working = s.spawn(|| repo.working_copy_changes());
                let untracked = s.spawn(|| repo.untracked_paths());
                (join(committed), join(working), join(untracked))
            });
            vec![committed?, working?, untracked?]
        }
    };

    let combined = combine_changes(groups, repo.filter());
    tracing::debug!(
        before,
        after = ?comparison.after,
        count = combined.len(),
        "aggregated changed files"
    );
    Ok(combined)
}

/// Every untracked and tracked file, without modification filtering.
pub fn all_files(repo: &Repository) -> Result<Vec<ChangeRecord>> {
    let (untracked, tracked) = thread::scope(|s| {
        let untracked = s.spawn(|| repo.untracked_paths());
        let tracked = s.spawn(|| repo.tracked_paths());
        (join(untracked), join(tracked))
    });

    Ok(combine_all(vec![untracked?, tracked?], repo.filter()))
}

/// Flatten listings in order, keep records that may hold changed lines and
/// aren't excluded, then keep the first record per path.
///
/// Filtering runs before deduplication so that a deleted-then-recreated
/// path is still reported by its later, untracked record.
pub fn combine_changes<I>(groups: I, filter: &PathFilter) -> Vec<ChangeRecord>
where
    I: IntoIterator<Item = Vec<ChangeRecord>>,
{
    let candidates = groups
        .into_iter()
        .flatten()
        .filter(ChangeRecord::has_potential_modifications)
        .filter(|record| !filter.is_excluded(&record.path));

    dedupe_by_path(candidates)
}

/// Like [`combine_changes`] but without the potential-modification check.
pub fn combine_all<I>(groups: I, filter: &PathFilter) -> Vec<ChangeRecord>
where
    I: IntoIterator<Item = Vec<ChangeRecord>>,
{
    let candidates = groups
        .into_iter()
        .flatten()
        .filter(|record| !filter.is_excluded(&record.path));

    dedupe_by_path(candidates)
}

fn dedupe_by_path(records: impl Iterator<Item = ChangeRecord>) -> Vec<ChangeRecord> {
    let mut seen = HashSet::new();
    records
        .filter(|record| seen.insert(record.path.clone()))
        .collect()
}

fn join<T>(handle: ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::status::Action;
    use crate::test_support::{commit_all, create_test_repo, git, head_sha, write_file};

    fn record(path: &str, action: Action) -> ChangeRecord {
        ChangeRecord::new(path, action)
    }

    fn scored(path: &str, action: Action, similarity: u8) -> ChangeRecord {
        ChangeRecord {
            similarity: Some(similarity),
            ..ChangeRecord::new(path, action)
        }
    }

    #[test]
    fn test_comparison_defaults() {
        let comparison = Comparison::default();
        assert_eq!(comparison.before, "HEAD");
        assert_eq!(comparison.after, After::WorkingCopy);

        let between = Comparison::between("main", "feature");
        assert_eq!(between.after, After::Commit("feature".to_string()));
    }

    #[test]
    fn test_combine_keeps_first_record_per_path() {
        let committed = vec![record("a.js", Action::Modified)];
        let working = vec![record("a.js", Action::Add), record("b.js", Action::Modified)];

        let combined = combine_changes(vec![committed, working], &PathFilter::empty());
        assert_eq!(
            combined,
            vec![record("a.js", Action::Modified), record("b.js", Action::Modified)]
        );
    }

    #[test]
    fn test_combine_drops_records_without_modifications() {
        let records = vec![
            record("gone.js", Action::Delete),
            scored("moved.js", Action::Rename, 100),
            scored("edited.js", Action::Rename, 97),
            record("conflict.js", Action::Unmerged),
            record("new.js", Action::Untracked),
        ];

        let combined = combine_changes(vec![records], &PathFilter::empty());
        let paths: Vec<_> = combined.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["edited.js", "new.js"]);
    }

    #[test]
    fn test_combine_recreated_path_survives_delete() {
        let committed = vec![record("again.js", Action::Delete)];
        let untracked = vec![record("again.js", Action::Untracked)];

        let combined = combine_changes(vec![committed, untracked], &PathFilter::empty());
        assert_eq!(combined, vec![record("again.js", Action::Untracked)]);
    }

    #[test]
    fn test_combine_applies_exclusions() {
        let filter = PathFilter::new(&["*.min.js".to_string()]).unwrap();
        let records = vec![record("app.min.js", Action::Add), record("app.js", Action::Add)];

        assert_eq!(
            combine_changes(vec![records], &filter),
            vec![record("app.js", Action::Add)]
        );
    }

    #[test]
    fn test_combine_all_keeps_every_action() {
        let untracked = vec![record("new.js", Action::Untracked)];
        let tracked = vec![record("old.js", Action::Tracked), record("new.js", Action::Tracked)];

        let combined = combine_all(vec![untracked, tracked], &PathFilter::empty());
        assert_eq!(
            combined,
            vec![record("new.js", Action::Untracked), record("old.js", Action::Tracked)]
        );
    }

    #[test]
    fn test_working_copy_aggregation() {
        let temp_dir = create_test_repo();
        let path = temp_dir.path();

        write_file(path, "modified.txt", "one\n");
        write_file(path, "deleted.txt", "bye\n");
        commit_all(path, "Base");
        let base = head_sha(path);

        write_file(path, "modified.txt", "one\ntwo\n");
        std::fs::remove_file(path.join("deleted.txt")).unwrap();
        commit_all(path, "Modify and delete");

        write_file(path, "staged.js", "staged\n");
        git(path, &["add", "staged.js"]);
        write_file(path, "untracked.js", "loose\n");

        let repo = Repository::discover(path, None).unwrap();
        let files = files_with_modifications(&repo, &Comparison::with_working_copy(base)).unwrap();

        assert_eq!(
            files,
            vec![
                record("modified.txt", Action::Modified),
                record("staged.js", Action::Add),
                record("untracked.js", Action::Untracked),
            ]
        );
        assert!(files.iter().all(|f| f.action != Action::Delete));
    }

    #[test]
    fn test_spaced_path_committed_and_edited_is_listed_once() {
        let temp_dir = create_test_repo();
        let path = temp_dir.path();
        let base = head_sha(path);

        write_file(path, "my file.js", "a\n");
        commit_all(path, "Add spaced file");
        write_file(path, "my file.js", "a\nb\n");

        let repo = Repository::discover(path, None).unwrap();
        let files = files_with_modifications(&repo, &Comparison::with_working_copy(base)).unwrap();

        assert_eq!(files, vec![record("my file.js", Action::Add)]);
        assert_eq!(repo.file_modifications(&files[0].path, "HEAD").unwrap().to_vec(), vec![2]);
    }

    #[test]
    fn test_committed_range_ignores_working_copy() {
        let temp_dir = create_test_repo();
        let path = temp_dir.path();
        let base = head_sha(path);

        write_file(path, "feature.rs", "fn feature() {}\n");
        commit_all(path, "Feature");
        write_file(path, "scratch.rs", "// not committed\n");

        let repo = Repository::discover(path, None).unwrap();
        let files = files_with_modifications(&repo, &Comparison::between(base, "HEAD")).unwrap();

        assert_eq!(files, vec![record("feature.rs", Action::Add)]);
    }

    #[test]
    fn test_aggregation_honours_config_exclusions() {
        let temp_dir = create_test_repo();
        let path = temp_dir.path();
        write_file(path, "dist/bundle.js", "x\n");
        write_file(path, "src/app.js", "y\n");

        let config = Config {
            exclude: vec!["dist/**".to_string()],
            ..Config::default()
        };
        let repo = Repository::discover(path, Some(&config)).unwrap();
        let files = files_with_modifications(&repo, &Comparison::default()).unwrap();

        assert_eq!(files, vec![record("src/app.js", Action::Untracked)]);
    }

    #[test]
    fn test_all_files() {
        let temp_dir = create_test_repo();
        write_file(temp_dir.path(), "new.txt", "n\n");

        let repo = Repository::discover(temp_dir.path(), None).unwrap();
        let files = all_files(&repo).unwrap();

        assert_eq!(
            files,
            vec![record("new.txt", Action::Untracked), record("README.md", Action::Tracked)]
        );
    }
}
