//! History gateway
//!
//! The reconstruction core never talks to a version-control backend
//! directly. It goes through [`HistoryGateway`], a narrow set of
//! point-in-time and range queries:
//!
//! - dates with activity, and the state resolved at a date
//! - paths and file sizes at a resolved state
//! - first-add / last-remove dates and live existence of a path
//! - commit counts over a window, the full commit log, per-commit changes
//! - per-path touch counts
//!
//! Two backends ship with the crate:
//!
//! - [`GitHistory`] - libgit2 via the `git2` crate
//! - [`MemoryHistory`] - a scripted in-memory history for tests and replays
//!
//! # Example
//!
//! ```no_run
//! use storyline::git::{GitHistory, HistoryGateway};
//! use std::path::Path;
//!
//! let history = GitHistory::open(Path::new("/path/to/repo")).unwrap();
//! let dates = history.dates_with_activity().unwrap();
//! println!("{} active days", dates.len());
//! ```

pub mod history;
pub mod memory;

pub use history::GitHistory;
pub use memory::{MemoryHistory, MemoryHistoryBuilder};

use crate::classifier::KeywordFilter;
use crate::models::{Commit, FileChange, StateRef};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors surfaced by a history backend.
///
/// Empty results are not errors: a query with nothing to report returns
/// `Ok(None)` or an empty collection.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History backend unavailable at {path}: {reason}")]
    Unavailable { path: String, reason: String },

    #[error("Git error: {0}")]
    Backend(#[from] git2::Error),

    #[error("Unknown commit: {0}")]
    UnknownCommit(String),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Path predicate used to narrow touch counts.
pub type PathFilter<'a> = &'a dyn Fn(&str) -> bool;

/// Point-in-time and range queries against a version-control history.
pub trait HistoryGateway {
    /// Distinct calendar dates on which any commit exists, ascending.
    fn dates_with_activity(&self) -> HistoryResult<BTreeSet<NaiveDate>>;

    /// Latest state at or before the end of `date`, if any commit existed yet.
    fn resolve_state_at(&self, date: NaiveDate) -> HistoryResult<Option<StateRef>>;

    /// Every path present in the tree of `state`.
    fn paths_at(&self, state: &StateRef) -> HistoryResult<BTreeSet<String>>;

    /// Line count of `path` at `state`; `None` when the path is absent.
    fn read_size(&self, state: &StateRef, path: &str) -> HistoryResult<Option<usize>>;

    /// Date of the earliest commit that added `path`.
    fn first_add_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>>;

    /// Date of the latest commit that removed `path`.
    fn last_remove_date(&self, path: &str) -> HistoryResult<Option<NaiveDate>>;

    /// Whether `path` exists in the live working state.
    fn path_exists_now(&self, path: &str) -> HistoryResult<bool>;

    /// Commits dated within `[start, end]`, optionally narrowed by message keywords.
    fn commits_in_window(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        keywords: Option<&KeywordFilter>,
    ) -> HistoryResult<usize>;

    /// Every commit, newest first, without per-file changes.
    fn all_commits(&self) -> HistoryResult<Vec<Commit>>;

    /// Per-file changes of one commit against its first parent.
    fn file_events_for_commit(&self, commit_id: &str) -> HistoryResult<Vec<FileChange>>;

    /// Number of commits touching each path, optionally filtered.
    fn touch_counts(&self, filter: Option<PathFilter<'_>>) -> HistoryResult<HashMap<String, usize>>;

    /// Every path that was ever added anywhere in history.
    fn paths_ever_added(&self) -> HistoryResult<BTreeSet<String>>;

    /// Paths in the current tip state.
    fn current_paths(&self) -> HistoryResult<BTreeSet<String>>;
}

/// Count lines the way `wc -l` does: newline bytes.
pub(crate) fn count_lines(content: &[u8]) -> usize {
    content.iter().filter(|&&b| b == b'\n').count()
}
