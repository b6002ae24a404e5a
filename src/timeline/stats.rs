//! Commit-log aggregations for the timeline report

use crate::git::{HistoryGateway, HistoryResult};
use crate::models::{ChangeKind, CommitStats, FileCreationEvent, KeyFileRevision, MonthlyStats, StateRef};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Every commit (newest first) joined with its file changes.
pub fn commits_with_stats<G: HistoryGateway + ?Sized>(gateway: &G) -> HistoryResult<Vec<CommitStats>> {
    let commits = gateway.all_commits()?;
    let mut out = Vec::with_capacity(commits.len());
    for commit in commits {
        let changes = gateway.file_events_for_commit(&commit.hash)?;
        out.push(CommitStats::new(commit, changes));
    }
    Ok(out)
}

/// Per-month commit, line and distinct-file totals, ascending by month.
pub fn monthly_stats(commits: &[CommitStats]) -> Vec<MonthlyStats> {
    #[derive(Default)]
    struct Bucket<'c> {
        commits: usize,
        insertions: usize,
        deletions: usize,
        files: BTreeSet<&'c str>,
    }

    let mut months: BTreeMap<String, Bucket<'_>> = BTreeMap::new();
    for stats in commits {
        let bucket = months
            .entry(stats.commit.date.format("%Y-%m").to_string())
            .or_default();
        bucket.commits += 1;
        bucket.insertions += stats.insertions;
        bucket.deletions += stats.deletions;
        bucket.files.extend(stats.changes().iter().map(|c| c.path.as_str()));
    }

    months
        .into_iter()
        .map(|(month, b)| MonthlyStats {
            month,
            commits: b.commits,
            insertions: b.insertions,
            deletions: b.deletions,
            files_changed: b.files.len(),
        })
        .collect()
}

/// Line count of each key file at every commit that touched it, newest first.
///
/// Key files never touched in history are left out.
pub fn key_file_evolution<G: HistoryGateway + ?Sized>(
    gateway: &G,
    commits: &[CommitStats],
    key_files: &[String],
) -> HistoryResult<BTreeMap<String, Vec<KeyFileRevision>>> {
    let mut evolution = BTreeMap::new();
    for path in key_files {
        let mut revisions = Vec::new();
        for stats in commits {
            if !stats.changes().iter().any(|c| &c.path == path) {
                continue;
            }
            let state = StateRef::new(stats.commit.hash.clone());
            let lines = gateway.read_size(&state, path)?.unwrap_or(0);
            revisions.push(KeyFileRevision {
                hash: stats.commit.hash.clone(),
                date: stats.commit.date,
                message: stats.commit.message.clone(),
                lines,
            });
        }
        debug!("Key file {} has {} revisions", path, revisions.len());
        if !revisions.is_empty() {
            evolution.insert(path.clone(), revisions);
        }
    }
    Ok(evolution)
}

/// Every "added" event, in commit-log order.
pub fn file_creation_timeline(commits: &[CommitStats]) -> Vec<FileCreationEvent> {
    commits
        .iter()
        .flat_map(|stats| {
            stats
                .changes()
                .iter()
                .filter(|c| c.kind == ChangeKind::Added)
                .map(|c| FileCreationEvent {
                    path: c.path.clone(),
                    date: stats.commit.date,
                    hash: stats.commit.hash.clone(),
                })
        })
        .collect()
}
