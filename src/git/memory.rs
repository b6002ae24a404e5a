//! Scripted in-memory history
//!
//! Replays a hand-written sequence of commits through the same
//! [`HistoryGateway`] contract as the git backend. Each commit lists the
//! paths it touches with their new line counts (`None` removes the path).

use super::{HistoryError, HistoryGateway, HistoryResult, PathFilter};
use crate::classifier::{classify_commit, KeywordFilter};
use crate::models::{ChangeKind, Commit, FileChange, StateRef};
use chrono::{Duration, NaiveDate, NaiveTime};
use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet, HashMap};

struct MemoryCommit {
    commit: Commit,
    tree: BTreeMap<String, usize>,
    changes: Vec<FileChange>,
    on_lineage: bool,
}

/// In-memory history backend.
pub struct MemoryHistory {
    /// Oldest first
    commits: Vec<MemoryCommit>,
    working_tree: BTreeSet<String>,
    size_reads: Cell<usize>,
}

/// Builder for [`MemoryHistory`].
#[derive(Default)]
pub struct MemoryHistoryBuilder {
    commits: Vec<MemoryCommit>,
    mainline: BTreeMap<String, usize>,
    working_tree: Option<BTreeSet<String>>,
}

impl MemoryHistory {
    pub fn builder() -> MemoryHistoryBuilder {
        MemoryHistoryBuilder::default()
    }

    /// Number of `read_size` calls served so far.
    pub fn size_reads(&self) -> usize {
        self.size_reads.get()
    }

    fn find(&self, hash: &str) -> Option<&MemoryCommit> {
        self.commits.iter().find(|c| c.commit.hash == hash)
    }
}

impl MemoryHistoryBuilder {
    /// Append a mainline commit. The first line of `message` is its subject.
    pub fn commit(self, date: NaiveDate, message: &str, files: &[(&str, Option<usize>)]) -> Self {
        self.push(date, message, files, true)
    }

    /// Append a commit that is in history but not reachable from the tip.
    ///
    /// It sees the mainline tree as of its position but does not change it.
    pub fn branch_commit(
        self,
        date: NaiveDate,
        message: &str,
        files: &[(&str, Option<usize>)],
    ) -> Self {
        self.push(date, message, files, false)
    }

    /// Override the live working tree (defaults to the final mainline tree).
    pub fn working_tree(mut self, paths: &[&str]) -> Self {
        self.working_tree = Some(paths.iter().map(|p| p.to_string()).collect());
        self
    }

    pub fn build(self) -> MemoryHistory {
        let working_tree = self
            .working_tree
            .unwrap_or_else(|| self.mainline.keys().cloned().collect());
        MemoryHistory {
            commits: self.commits,
            working_tree,
            size_reads: Cell::new(0),
        }
    }

    fn push(
        mut self,
        date: NaiveDate,
        message: &str,
        files: &[(&str, Option<usize>)],
        on_lineage: bool,
    ) -> Self {
        let seq = self.commits.len();
        let mut tree = self.mainline.clone();
        let mut changes = Vec::with_capacity(files.len());

        for (path, size) in files {
            let before = tree.get(*path).copied();
            let (kind, insertions, deletions) = match (before, size) {
                (None, Some(after)) => (ChangeKind::Added, *after, 0),
                (Some(prev), Some(after)) => (
                    ChangeKind::Modified,
                    after.saturating_sub(prev),
                    prev.saturating_sub(*after),
                ),
                (Some(prev), None) => (ChangeKind::Deleted, 0, prev),
                (None, None) => continue,
            };
            match size {
                Some(after) => tree.insert(path.to_string(), *after),
                None => tree.remove(*path),
            };
            changes.push(FileChange {
                path: path.to_string(),
                kind,
                insertions,
                deletions,
            });
        }

        let subject = message.lines().next().unwrap_or_default();
        let stamp = date.and_time(NaiveTime::MIN) + Duration::seconds(seq as i64);
        let commit = Commit {
            hash: format!("{:040x}", seq + 1),
            date: stamp.and_utc().fixed_offset(),
            author: "Test User".to_string(),
            message: subject.to_string(),
            body: message.to_string(),
            commit_type: classify_commit(subject),
            files: None,
        };

        if on_lineage {
            self.mainline = tree.clone();
        }
        self.commits.push(MemoryCommit {
            commit,
            tree,
            changes,
            on_lineage,
        });
        self
    }
}

impl HistoryGateway for MemoryHistory {
    fn dates_with_activity(&self) -> HistoryResult<BTreeSet<NaiveDate>> {
        Ok(self.commits.iter().map(|c| c.commit.day()).collect())
    }

    fn resolve_state_at(&self, date: NaiveDate) -> HistoryResult<Option<StateRef>> {
        Ok(self
            .commits
            .iter()
            .filter(|c| c.on_lineage && c.commit.day() <= date)
            .last()
            .map(|c| StateRef::new(c.commit.hash.clone())))
    }

    fn paths_at(&self, state: &StateRef) -> HistoryResult<BTreeSet<String>> {
        Ok(self
            .find(state.as_str())
            .map(|c| c.tree.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn read_size(&self, state: &StateRef, path: &str) -> HistoryResult<Option<usize>> {
        self.size_reads.set(self.size_reads.get() + 1);
        Ok(self
            .find(state.as_str())
            .and_then(|c| c.tree.get(path).copied()))
    }

    fn first_add_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>> {
        Ok(self
            .commits
            .iter()
            .filter(|c| {
                c.changes
                    .iter()
                    .any(|ch| ch.path == path && ch.kind == ChangeKind::Added)
            })
            .map(|c| c.commit.day())
            .min())
    }

    fn last_remove_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>> {
        Ok(self
            .commits
            .iter()
            .filter(|c| {
                c.changes
                    .iter()
                    .any(|ch| ch.path == path && ch.kind == ChangeKind::Deleted)
            })
            .map(|c| c.commit.day())
            .max())
    }

    fn path_exists_now(&self, path: &str) -> HistoryResult<bool> {
        Ok(self.working_tree.contains(path))
    }

    fn commits_in_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        keywords: Option<&KeywordFilter>,
    ) -> HistoryResult<usize> {
        Ok(self
            .commits
            .iter()
            .filter(|c| c.commit.day() >= start && c.commit.day() <= end)
            .filter(|c| keywords.map_or(true, |k| k.matches(&c.commit.body)))
            .count())
    }

    fn all_commits(&self) -> HistoryResult<Vec<Commit>> {
        Ok(self.commits.iter().rev().map(|c| c.commit.clone()).collect())
    }

    fn file_events_for_commit(&self, commit_id: &str) -> HistoryResult<Vec<FileChange>> {
        self.find(commit_id)
            .map(|c| c.changes.clone())
            .ok_or_else(|| HistoryError::UnknownCommit(commit_id.to_string()))
    }

    fn touch_counts(&self, filter: Option<PathFilter<'_>>) -> HistoryResult<HashMap<String, usize>> {
        let mut counts = HashMap::new();
        for c in &self.commits {
            for change in &c.changes {
                if filter.map_or(true, |f| f(&change.path)) {
                    *counts.entry(change.path.clone()).or_insert(0) += 1;
                }
            }
        }
        Ok(counts)
    }

    fn paths_ever_added(&self) -> HistoryResult<BTreeSet<String>> {
        Ok(self
            .commits
            .iter()
            .flat_map(|c| c.changes.iter())
            .filter(|ch| ch.kind == ChangeKind::Added)
            .map(|ch| ch.path.clone())
            .collect())
    }

    fn current_paths(&self) -> HistoryResult<BTreeSet<String>> {
        Ok(self
            .commits
            .iter()
            .rev()
            .find(|c| c.on_lineage)
            .map(|c| c.tree.keys().cloned().collect())
            .unwrap_or_default())
    }
}
