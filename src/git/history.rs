//! Git history backend using libgit2
//!
//! Walks every ref once on open, diffs each commit against its first parent,
//! and answers the [`HistoryGateway`] queries from that index plus direct
//! tree/blob lookups for point-in-time state.

use super::{count_lines, HistoryError, HistoryGateway, HistoryResult, PathFilter};
use crate::classifier::{classify_commit, KeywordFilter};
use crate::models::{ChangeKind, Commit, FileChange, StateRef};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use git2::{Delta, DiffOptions, Oid, Patch, Repository, Sort};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;
use tracing::{debug, warn};

/// A commit plus the data needed to answer range queries without re-diffing.
struct IndexedCommit {
    commit: Commit,
    /// Changes against the first parent; empty for merges
    changes: Vec<FileChange>,
}

/// Git history analyzer using libgit2.
pub struct GitHistory {
    repo: Repository,
    /// Commits reachable from any ref, newest first
    commits: Vec<IndexedCommit>,
    by_hash: HashMap<String, usize>,
    /// Commits reachable from HEAD in walk order, tip first
    lineage: Vec<(NaiveDate, Oid)>,
    first_added: HashMap<String, NaiveDate>,
    last_removed: HashMap<String, NaiveDate>,
}

impl GitHistory {
    /// Open a git repository and index its history.
    ///
    /// # Arguments
    /// * `path` - Path to the repository (or any subdirectory)
    pub fn open(path: &Path) -> HistoryResult<Self> {
        let repo = Repository::discover(path).map_err(|e| HistoryError::Unavailable {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        debug!("Opened git repository at {:?}", repo.path());

        let mut history = Self {
            repo,
            commits: Vec::new(),
            by_hash: HashMap::new(),
            lineage: Vec::new(),
            first_added: HashMap::new(),
            last_removed: HashMap::new(),
        };
        history.build_index()?;
        Ok(history)
    }

    /// Check if a path is inside a git repository.
    pub fn is_git_repo(path: &Path) -> bool {
        Repository::discover(path).is_ok()
    }

    /// Repository directory name, used as the report's repository label.
    pub fn repo_name(&self) -> String {
        let root = self.repo.workdir().unwrap_or_else(|| self.repo.path());
        root.components()
            .next_back()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_else(|| "repository".to_string())
    }

    fn build_index(&mut self) -> HistoryResult<()> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push_glob("*")?;
        if revwalk.push_head().is_err() {
            debug!("HEAD is unborn or detached without commits");
        }

        for oid_result in revwalk {
            let oid = oid_result?;
            let commit = self.repo.find_commit(oid)?;
            let indexed = self.index_commit(&commit)?;

            let day = indexed.commit.day();
            for change in &indexed.changes {
                match change.kind {
                    ChangeKind::Added => {
                        let entry = self.first_added.entry(change.path.clone()).or_insert(day);
                        if day < *entry {
                            *entry = day;
                        }
                    }
                    ChangeKind::Deleted => {
                        let entry = self.last_removed.entry(change.path.clone()).or_insert(day);
                        if day > *entry {
                            *entry = day;
                        }
                    }
                    ChangeKind::Modified | ChangeKind::Renamed => {}
                }
            }

            self.by_hash
                .insert(indexed.commit.hash.clone(), self.commits.len());
            self.commits.push(indexed);
        }

        if let Ok(head) = self.repo.head().and_then(|h| h.peel_to_commit()) {
            let mut walk = self.repo.revwalk()?;
            walk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
            walk.push(head.id())?;
            for oid_result in walk {
                let oid = oid_result?;
                let commit = self.repo.find_commit(oid)?;
                let day = to_datetime(&commit.author().when()).date_naive();
                self.lineage.push((day, oid));
            }
        }

        debug!(
            "Indexed {} commits ({} on HEAD lineage)",
            self.commits.len(),
            self.lineage.len()
        );
        Ok(())
    }

    /// Extract commit information and first-parent changes.
    fn index_commit(&self, commit: &git2::Commit) -> HistoryResult<IndexedCommit> {
        let author = commit.author();
        let date = to_datetime(&author.when());
        let body = commit.message().unwrap_or("").to_string();
        let message = body.lines().next().unwrap_or("").to_string();

        // Merges report no per-file changes, matching plain `git log`
        let changes = if commit.parent_count() > 1 {
            Vec::new()
        } else {
            self.diff_against_parent(commit)?
        };

        Ok(IndexedCommit {
            commit: Commit {
                hash: commit.id().to_string(),
                date,
                author: author.name().unwrap_or("Unknown").to_string(),
                commit_type: classify_commit(&message),
                message,
                body,
                files: None,
            },
            changes,
        })
    }

    fn diff_against_parent(&self, commit: &git2::Commit) -> HistoryResult<Vec<FileChange>> {
        let parent = commit.parent(0).ok();
        let tree = commit.tree()?;
        let parent_tree = parent.as_ref().map(|p| p.tree()).transpose()?;

        let mut diff_opts = DiffOptions::new();
        let diff = self.repo.diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&tree),
            Some(&mut diff_opts),
        )?;

        let mut changes = Vec::with_capacity(diff.deltas().len());
        for (idx, delta) in diff.deltas().enumerate() {
            let kind = match delta.status() {
                Delta::Added | Delta::Copied => ChangeKind::Added,
                Delta::Deleted => ChangeKind::Deleted,
                Delta::Renamed => ChangeKind::Renamed,
                _ => ChangeKind::Modified,
            };
            let file = match kind {
                ChangeKind::Deleted => delta.old_file(),
                _ => delta.new_file(),
            };
            let Some(path) = file.path() else {
                continue;
            };

            let (insertions, deletions) = match Patch::from_diff(&diff, idx) {
                Ok(Some(patch)) => match patch.line_stats() {
                    Ok((_, ins, del)) => (ins, del),
                    Err(e) => {
                        warn!(data_quality = true, "Unreadable line stats for {:?}: {}", path, e);
                        (0, 0)
                    }
                },
                // Binary files carry no line stats
                Ok(None) => (0, 0),
                Err(e) => {
                    warn!(data_quality = true, "Unreadable patch for {:?}: {}", path, e);
                    (0, 0)
                }
            };

            changes.push(FileChange {
                path: path.to_string_lossy().to_string(),
                kind,
                insertions,
                deletions,
            });
        }

        Ok(changes)
    }

    fn tree_for(&self, state: &StateRef) -> HistoryResult<Option<git2::Tree<'_>>> {
        let Ok(oid) = Oid::from_str(state.as_str()) else {
            return Ok(None);
        };
        match self.repo.find_commit(oid) {
            Ok(commit) => Ok(Some(commit.tree()?)),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn head_tree(&self) -> Option<git2::Tree<'_>> {
        self.repo.head().ok().and_then(|h| h.peel_to_tree().ok())
    }
}

impl HistoryGateway for GitHistory {
    fn dates_with_activity(&self) -> HistoryResult<BTreeSet<NaiveDate>> {
        Ok(self.commits.iter().map(|c| c.commit.day()).collect())
    }

    fn resolve_state_at(&self, date: NaiveDate) -> HistoryResult<Option<StateRef>> {
        // First in walk order, like `git log -1 --until=<date>`
        let resolved = self
            .lineage
            .iter()
            .find(|(day, _)| *day <= date)
            .map(|(_, oid)| StateRef::new(oid.to_string()));
        Ok(resolved)
    }

    fn paths_at(&self, state: &StateRef) -> HistoryResult<BTreeSet<String>> {
        match self.tree_for(state)? {
            Some(tree) => walk_blobs(&tree),
            None => Ok(BTreeSet::new()),
        }
    }

    fn read_size(&self, state: &StateRef, path: &str) -> HistoryResult<Option<usize>> {
        let Some(tree) = self.tree_for(state)? else {
            return Ok(None);
        };
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match entry.to_object(&self.repo) {
            Ok(object) => match object.as_blob() {
                Some(blob) => Ok(Some(count_lines(blob.content()))),
                None => {
                    warn!(data_quality = true, "{} at {} is not a file", path, state);
                    Ok(Some(0))
                }
            },
            Err(e) => {
                warn!(data_quality = true, "Cannot read {} at {}: {}", path, state, e);
                Ok(Some(0))
            }
        }
    }

    fn first_add_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>> {
        Ok(self.first_added.get(path).copied())
    }

    fn last_remove_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>> {
        Ok(self.last_removed.get(path).copied())
    }

    fn path_exists_now(&self, path: &str) -> HistoryResult<bool> {
        if let Some(workdir) = self.repo.workdir() {
            return Ok(workdir.join(path).exists());
        }
        // Bare repository: the tip tree is the live state
        Ok(self
            .head_tree()
            .is_some_and(|tree| tree.get_path(Path::new(path)).is_ok()))
    }

    fn commits_in_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        keywords: Option<&KeywordFilter>,
    ) -> HistoryResult<usize> {
        let count = self
            .commits
            .iter()
            .filter(|c| {
                let day = c.commit.day();
                day >= start && day <= end
            })
            .filter(|c| keywords.map_or(true, |k| k.matches(&c.commit.body)))
            .count();
        Ok(count)
    }

    fn all_commits(&self) -> HistoryResult<Vec<Commit>> {
        Ok(self.commits.iter().map(|c| c.commit.clone()).collect())
    }

    fn file_events_for_commit(&self, commit_id: &str) -> HistoryResult<Vec<FileChange>> {
        self.by_hash
            .get(commit_id)
            .map(|&idx| self.commits[idx].changes.clone())
            .ok_or_else(|| HistoryError::UnknownCommit(commit_id.to_string()))
    }

    fn touch_counts(&self, filter: Option<PathFilter<'_>>) -> HistoryResult<HashMap<String, usize>> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for indexed in &self.commits {
            let touched: HashSet<&str> = indexed
                .changes
                .iter()
                .map(|c| c.path.as_str())
                .filter(|p| filter.map_or(true, |f| f(p)))
                .collect();
            for path in touched {
                *counts.entry(path.to_string()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    fn paths_ever_added(&self) -> HistoryResult<BTreeSet<String>> {
        Ok(self.first_added.keys().cloned().collect())
    }

    fn current_paths(&self) -> HistoryResult<BTreeSet<String>> {
        match self.head_tree() {
            Some(tree) => walk_blobs(&tree),
            None => Ok(BTreeSet::new()),
        }
    }
}

/// Collect every blob path in a tree.
fn walk_blobs(tree: &git2::Tree<'_>) -> HistoryResult<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    tree.walk(git2::TreeWalkMode::PreOrder, |dir, entry| {
        if entry.kind() == Some(git2::ObjectType::Blob) {
            let path = if dir.is_empty() {
                entry.name().unwrap_or("").to_string()
            } else {
                format!("{}{}", dir, entry.name().unwrap_or(""))
            };
            files.insert(path);
        }
        git2::TreeWalkResult::Ok
    })?;
    Ok(files)
}

/// Convert a git timestamp to a datetime in its recorded offset.
fn to_datetime(time: &git2::Time) -> DateTime<FixedOffset> {
    let fallback = || {
        Utc.timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_default()
            .fixed_offset()
    };
    match FixedOffset::east_opt(time.offset_minutes() * 60) {
        Some(offset) => offset
            .timestamp_opt(time.seconds(), 0)
            .single()
            .unwrap_or_else(fallback),
        None => fallback(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use git2::{Signature, Time};
    use tempfile::tempdir;

    /// Commit the given files (None = delete) at a fixed epoch time.
    fn commit_files(
        repo: &Repository,
        dir: &Path,
        files: &[(&str, Option<&str>)],
        message: &str,
        epoch: i64,
    ) -> Result<Oid> {
        let mut index = repo.index()?;
        for (name, content) in files {
            let full = dir.join(name);
            match content {
                Some(body) => {
                    if let Some(parent) = full.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&full, body)?;
                    index.add_path(Path::new(name))?;
                }
                None => {
                    std::fs::remove_file(&full)?;
                    index.remove_path(Path::new(name))?;
                }
            }
        }
        index.write()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let sig = Signature::new("Test User", "test@example.com", &Time::new(epoch, 0))?;
        let parents = match repo.head().ok().and_then(|h| h.peel_to_commit().ok()) {
            Some(parent) => vec![parent],
            None => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        Ok(repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)?)
    }

    const JAN_1: i64 = 1_577_880_000; // 2020-01-01T12:00:00Z
    const DAY: i64 = 86_400;

    fn create_test_repo() -> Result<(tempfile::TempDir, Repository)> {
        let dir = tempdir()?;
        let repo = Repository::init(dir.path())?;
        commit_files(
            &repo,
            dir.path(),
            &[("js/app.js", Some("a\nb\nc\n")), ("README.md", Some("hi\n"))],
            "feat: initial app",
            JAN_1,
        )?;
        commit_files(
            &repo,
            dir.path(),
            &[("js/app.js", Some("a\nb\nc\nd\ne\n")), ("css/main.css", Some("x\n"))],
            "Tech debt: grow app",
            JAN_1 + 2 * DAY,
        )?;
        commit_files(
            &repo,
            dir.path(),
            &[("css/main.css", None)],
            "refactor css cleanup",
            JAN_1 + 5 * DAY,
        )?;
        Ok((dir, repo))
    }

    fn day(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    #[test]
    fn test_open_repo() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;
        assert_eq!(history.all_commits()?.len(), 3);
        Ok(())
    }

    #[test]
    fn test_open_non_repo_is_unavailable() -> Result<()> {
        let dir = tempdir()?;
        let result = GitHistory::open(dir.path());
        assert!(matches!(result, Err(HistoryError::Unavailable { .. })));
        assert!(!GitHistory::is_git_repo(dir.path()));
        Ok(())
    }

    #[test]
    fn test_dates_with_activity() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;
        let dates: Vec<_> = history.dates_with_activity()?.into_iter().collect();
        assert_eq!(dates, vec![day("2020-01-01"), day("2020-01-03"), day("2020-01-06")]);
        Ok(())
    }

    #[test]
    fn test_resolve_state_and_sizes() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;

        assert!(history.resolve_state_at(day("2019-12-31"))?.is_none());

        let state = history
            .resolve_state_at(day("2020-01-04"))?
            .expect("state exists");
        let paths = history.paths_at(&state)?;
        assert!(paths.contains("js/app.js"));
        assert!(paths.contains("css/main.css"));
        assert_eq!(history.read_size(&state, "js/app.js")?, Some(5));
        assert_eq!(history.read_size(&state, "missing.js")?, None);
        Ok(())
    }

    #[test]
    fn test_lifecycle_dates() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;

        assert_eq!(history.first_add_date("css/main.css")?, Some(day("2020-01-03")));
        assert_eq!(history.last_remove_date("css/main.css")?, Some(day("2020-01-06")));
        assert_eq!(history.last_remove_date("js/app.js")?, None);
        assert!(history.path_exists_now("js/app.js")?);
        assert!(!history.path_exists_now("css/main.css")?);
        Ok(())
    }

    #[test]
    fn test_commits_and_file_events() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;

        let commits = history.all_commits()?;
        assert_eq!(commits[0].message, "refactor css cleanup");
        assert_eq!(commits[2].message, "feat: initial app");

        let events = history.file_events_for_commit(&commits[1].hash)?;
        let app = events.iter().find(|e| e.path == "js/app.js").expect("app.js");
        assert_eq!(app.kind, ChangeKind::Modified);
        assert_eq!(app.insertions, 2);

        let removed = history.file_events_for_commit(&commits[0].hash)?;
        assert_eq!(removed[0].kind, ChangeKind::Deleted);
        assert_eq!(removed[0].path, "css/main.css");
        Ok(())
    }

    #[test]
    fn test_window_and_keyword_counts() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;
        let debt = KeywordFilter::new(&["tech debt".to_string()]);

        assert_eq!(history.commits_in_window(day("2020-01-01"), day("2020-01-06"), None)?, 3);
        assert_eq!(history.commits_in_window(day("2020-01-02"), day("2020-01-05"), None)?, 1);
        assert_eq!(
            history.commits_in_window(day("2020-01-01"), day("2020-01-06"), Some(&debt))?,
            1
        );
        Ok(())
    }

    #[test]
    fn test_touch_counts_and_paths() -> Result<()> {
        let (dir, _repo) = create_test_repo()?;
        let history = GitHistory::open(dir.path())?;

        let counts = history.touch_counts(None)?;
        assert_eq!(counts.get("js/app.js"), Some(&2));
        assert_eq!(counts.get("css/main.css"), Some(&2));

        let only_js = |p: &str| p.ends_with(".js");
        let filtered = history.touch_counts(Some(&only_js))?;
        assert_eq!(filtered.len(), 1);

        let ever = history.paths_ever_added()?;
        assert!(ever.contains("css/main.css"));
        let now = history.current_paths()?;
        assert!(!now.contains("css/main.css"));
        assert!(now.contains("README.md"));
        Ok(())
    }
}
