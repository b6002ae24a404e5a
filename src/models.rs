//! Core data models for Storyline
//!
//! These models flow through the whole reconstruction: commits read from
//! history, per-file lifecycle records, point-in-time snapshots, display
//! frames, and the latched milestone events derived from them.

use crate::timeline::DirNode;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Commit classification derived from message keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CommitType {
    Feature,
    Fix,
    Refactor,
    Docs,
    Test,
    Merge,
    Style,
    #[default]
    Other,
}

impl std::fmt::Display for CommitType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommitType::Feature => write!(f, "feature"),
            CommitType::Fix => write!(f, "fix"),
            CommitType::Refactor => write!(f, "refactor"),
            CommitType::Docs => write!(f, "docs"),
            CommitType::Test => write!(f, "test"),
            CommitType::Merge => write!(f, "merge"),
            CommitType::Style => write!(f, "style"),
            CommitType::Other => write!(f, "other"),
        }
    }
}

/// How a commit changed a path relative to its first parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// One path touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChange {
    #[serde(rename = "file")]
    pub path: String,
    pub kind: ChangeKind,
    pub insertions: usize,
    pub deletions: usize,
}

/// A commit as read from history. Immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    /// Full commit hash
    pub hash: String,
    /// Author timestamp, in the author's own offset
    pub date: DateTime<FixedOffset>,
    pub author: String,
    /// First line of the commit message
    pub message: String,
    /// Full commit message, searched by keyword filters
    #[serde(skip)]
    pub body: String,
    #[serde(rename = "type")]
    pub commit_type: CommitType,
    /// Per-file changes, when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileChange>>,
}

impl Commit {
    /// Calendar date of the commit in the author's offset.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// A commit with its per-file changes and line totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitStats {
    #[serde(flatten)]
    pub commit: Commit,
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl CommitStats {
    pub fn new(mut commit: Commit, changes: Vec<FileChange>) -> Self {
        let insertions = changes.iter().map(|c| c.insertions).sum();
        let deletions = changes.iter().map(|c| c.deletions).sum();
        let files_changed = changes.len();
        commit.files = Some(changes);
        Self {
            commit,
            files_changed,
            insertions,
            deletions,
        }
    }

    pub fn changes(&self) -> &[FileChange] {
        self.commit.files.as_deref().unwrap_or_default()
    }
}

/// Lifecycle record for one tracked path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(rename = "file")]
    pub path: String,
    pub category: String,
    pub color: String,
    /// Date of the first historical add
    pub created: Option<NaiveDate>,
    /// Date of the last historical removal; absent while the file exists
    pub deleted: Option<NaiveDate>,
    pub exists: bool,
}

/// Display status of a file at one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Active,
    Deleted,
    NotCreated,
}

impl FileStatus {
    /// Resolve the status of a file at `date`.
    ///
    /// Precedence: `not_created` before the creation date, then `deleted` on
    /// or after the deletion date or when the size just dropped to zero,
    /// otherwise `active`.
    pub fn resolve(date: NaiveDate, record: &FileRecord, size: usize, previous: usize) -> Self {
        if record.created.is_some_and(|created| date < created) {
            return FileStatus::NotCreated;
        }
        let past_deletion = record.deleted.is_some_and(|deleted| date >= deleted);
        if past_deletion || (size == 0 && previous > 0) {
            return FileStatus::Deleted;
        }
        FileStatus::Active
    }
}

impl std::fmt::Display for FileStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileStatus::Active => write!(f, "active"),
            FileStatus::Deleted => write!(f, "deleted"),
            FileStatus::NotCreated => write!(f, "not_created"),
        }
    }
}

/// Opaque reference to one resolved historical state (a commit id for git).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateRef(pub String);

impl StateRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StateRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolved size of every tracked path at one reference date.
///
/// Sizes are zero for paths absent at the resolved state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub date: NaiveDate,
    pub state: StateRef,
    pub sizes: BTreeMap<String, usize>,
}

impl Snapshot {
    pub fn size_of(&self, path: &str) -> usize {
        self.sizes.get(path).copied().unwrap_or(0)
    }
}

/// One ranked display row in a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameEntry {
    #[serde(rename = "file")]
    pub path: String,
    pub name: String,
    pub lines: usize,
    pub category: String,
    pub color: String,
    pub status: FileStatus,
}

/// Rolling commit activity over the trailing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMetrics {
    pub commits_in_window: usize,
    /// Mean commits per day over the window, one decimal
    pub daily_rate: f64,
    pub debt_commits: usize,
}

/// One sampled point of the race timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub date: NaiveDate,
    pub files: Vec<FrameEntry>,
    pub total_files: usize,
    pub total_lines: usize,
    pub activity: ActivityMetrics,
}

/// A latched architectural event: at most one per `kind` per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub description: String,
    pub date: NaiveDate,
    /// Commit that satisfied the trigger (commit-stream detection only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Historical touch count for a currently existing path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnEntry {
    #[serde(rename = "file")]
    pub path: String,
    pub commits: usize,
}

/// Aggregated activity for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// `YYYY-MM`
    pub month: String,
    pub commits: usize,
    pub insertions: usize,
    pub deletions: usize,
    pub files_changed: usize,
}

/// Line count of a key file at one revision that touched it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFileRevision {
    pub hash: String,
    pub date: DateTime<FixedOffset>,
    pub message: String,
    pub lines: usize,
}

/// A file "added" event in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCreationEvent {
    #[serde(rename = "file")]
    pub path: String,
    pub date: DateTime<FixedOffset>,
    pub hash: String,
}

/// Graveyard row: a tracked file that no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraveyardEntry {
    #[serde(rename = "file")]
    pub path: String,
    pub category: String,
    pub created: Option<NaiveDate>,
    pub deleted: NaiveDate,
}

/// Inclusive first/last bounds of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

/// Display color of one category in the race legend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLegend {
    pub color: String,
}

/// Race settings echoed into the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSettings {
    pub top_n: usize,
    pub total_frames: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceSummary {
    pub date_range: DateRange<NaiveDate>,
    pub total_files_tracked: usize,
    pub deleted_files: usize,
}

/// Everything the racing bar chart needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceReport {
    pub generated_at: DateTime<Utc>,
    pub config: RaceSettings,
    pub summary: RaceSummary,
    pub categories: BTreeMap<String, CategoryLegend>,
    pub frames: Vec<Frame>,
    pub milestones: Vec<Milestone>,
    pub graveyard: Vec<GraveyardEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryInfo {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineSummary {
    pub total_commits: usize,
    pub date_range: DateRange<DateTime<FixedOffset>>,
    pub total_lines_added: usize,
    pub total_lines_deleted: usize,
    pub total_files_created: usize,
}

/// Everything the commit timeline needs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineReport {
    pub generated_at: DateTime<Utc>,
    pub repository: RepositoryInfo,
    pub summary: TimelineSummary,
    pub commits: Vec<CommitStats>,
    pub file_evolution: BTreeMap<String, Vec<KeyFileRevision>>,
    pub directory_milestones: Vec<Milestone>,
    pub monthly_stats: Vec<MonthlyStats>,
    pub architecture_phases: Vec<Milestone>,
    pub top_churn_files: Vec<ChurnEntry>,
    pub file_tree: DirNode,
    pub file_creation_timeline: Vec<FileCreationEvent>,
}
