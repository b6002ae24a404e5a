//! Display frames
//!
//! A frame ranks the active files of one snapshot, keeps the top N, and
//! appends every deleted file pinned at zero lines so deletions fade out
//! instead of vanishing. Totals cover all active files, on screen or not.

use super::{window_start, FileUniverse};
use crate::classifier::KeywordFilter;
use crate::git::{HistoryGateway, HistoryResult};
use crate::models::{ActivityMetrics, FileStatus, Frame, FrameEntry, Snapshot};
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub struct FrameBuilder<'a, G: HistoryGateway + ?Sized> {
    gateway: &'a G,
    universe: &'a FileUniverse,
    top_n: usize,
    window_days: u32,
    debt_filter: &'a KeywordFilter,
    previous: BTreeMap<String, usize>,
}

impl<'a, G: HistoryGateway + ?Sized> FrameBuilder<'a, G> {
    pub fn new(
        gateway: &'a G,
        universe: &'a FileUniverse,
        top_n: usize,
        window_days: u32,
        debt_filter: &'a KeywordFilter,
    ) -> Self {
        Self {
            gateway,
            universe,
            top_n,
            window_days: window_days.max(1),
            debt_filter,
            previous: BTreeMap::new(),
        }
    }

    /// Build the next frame. Snapshots must arrive in date order.
    pub fn build(&mut self, snapshot: &Snapshot) -> HistoryResult<Frame> {
        let mut active = Vec::new();
        let mut deleted = Vec::new();

        for record in self.universe.records() {
            let lines = snapshot.size_of(&record.path);
            let before = self.previous.get(&record.path).copied().unwrap_or(0);
            let status = FileStatus::resolve(snapshot.date, record, lines, before);

            let entry = |lines| FrameEntry {
                path: record.path.clone(),
                name: short_name(&record.path).to_string(),
                lines,
                category: record.category.clone(),
                color: record.color.clone(),
                status,
            };
            match status {
                FileStatus::NotCreated => {}
                FileStatus::Active if lines > 0 => active.push(entry(lines)),
                FileStatus::Active => {}
                FileStatus::Deleted => deleted.push(entry(0)),
            }
        }

        let total_files = active.len();
        let total_lines = active.iter().map(|e| e.lines).sum();

        active.sort_by(|a, b| b.lines.cmp(&a.lines).then_with(|| a.path.cmp(&b.path)));
        active.truncate(self.top_n);
        active.extend(deleted);

        let activity = self.activity(snapshot.date)?;
        self.previous = snapshot.sizes.clone();

        Ok(Frame {
            date: snapshot.date,
            files: active,
            total_files,
            total_lines,
            activity,
        })
    }

    fn activity(&self, date: NaiveDate) -> HistoryResult<ActivityMetrics> {
        let start = window_start(date, self.window_days);
        let commits = self.gateway.commits_in_window(start, date, None)?;
        let debt = self
            .gateway
            .commits_in_window(start, date, Some(self.debt_filter))?;
        let rate = commits as f64 / f64::from(self.window_days);
        Ok(ActivityMetrics {
            commits_in_window: commits,
            daily_rate: (rate * 10.0).round() / 10.0,
            debt_commits: debt,
        })
    }
}

fn short_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
