//! Point-in-time reconstruction of a file universe
//!
//! The stages run leaves first:
//!
//! 1. [`universe::discover`] - every path ever added, narrowed by extension
//! 2. [`lifecycle::track_lifecycles`] - creation / deletion / existence per path
//! 3. [`sampler::sample_dates`] - bounded, evenly strided reference dates
//! 4. [`snapshot::SnapshotReconstructor`] - sizes per resolved state, memoized
//! 5. [`frames::FrameBuilder`] - ranked display frames with fade-out
//!
//! [`churn`], [`tree`] and [`stats`] are independent branches that only
//! consume the history gateway.

pub mod churn;
pub mod frames;
pub mod lifecycle;
pub mod sampler;
pub mod snapshot;
pub mod stats;
pub mod tree;
pub mod universe;

pub use churn::top_churn;
pub use frames::FrameBuilder;
pub use lifecycle::track_lifecycles;
pub use sampler::sample_dates;
pub use snapshot::SnapshotReconstructor;
pub use tree::DirNode;
pub use universe::discover;

use crate::models::{FileRecord, GraveyardEntry};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;

/// First day of a trailing window of `window_days` days ending on `date`.
///
/// Saturates at the earliest representable date.
pub fn window_start(date: NaiveDate, window_days: u32) -> NaiveDate {
    Duration::try_days(i64::from(window_days.max(1)) - 1)
        .and_then(|span| date.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

/// The fixed set of tracked paths with their lifecycle records.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FileUniverse {
    records: BTreeMap<String, FileRecord>,
}

impl FileUniverse {
    pub fn from_records(records: Vec<FileRecord>) -> Self {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.path.clone(), record))
                .collect(),
        }
    }

    /// Records in path order.
    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    pub fn get(&self, path: &str) -> Option<&FileRecord> {
        self.records.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn deleted_count(&self) -> usize {
        self.records().filter(|r| r.deleted.is_some()).count()
    }

    /// Files with a deletion date, oldest deletion first.
    pub fn graveyard(&self) -> Vec<GraveyardEntry> {
        let mut graves: Vec<GraveyardEntry> = self
            .records()
            .filter_map(|r| {
                r.deleted.map(|deleted| GraveyardEntry {
                    path: r.path.clone(),
                    category: r.category.clone(),
                    created: r.created,
                    deleted,
                })
            })
            .collect();
        graves.sort_by(|a, b| a.deleted.cmp(&b.deleted).then_with(|| a.path.cmp(&b.path)));
        graves
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, deleted: Option<&str>) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            category: "other".to_string(),
            color: "#94a3b8".to_string(),
            created: NaiveDate::from_ymd_opt(2020, 1, 1),
            deleted: deleted.map(|d| d.parse().expect("date")),
            exists: deleted.is_none(),
        }
    }

    #[test]
    fn test_graveyard_sorted_by_deletion() {
        let universe = FileUniverse::from_records(vec![
            record("late.js", Some("2021-05-01")),
            record("alive.js", None),
            record("early.js", Some("2020-06-01")),
        ]);
        let graves = universe.graveyard();
        let paths: Vec<&str> = graves.iter().map(|g| g.path.as_str()).collect();
        assert_eq!(paths, vec!["early.js", "late.js"]);
        assert_eq!(universe.deleted_count(), 2);
        assert_eq!(universe.len(), 3);
    }

    #[test]
    fn test_window_start() {
        let date: NaiveDate = "2021-02-01".parse().expect("date");
        assert_eq!(window_start(date, 30), "2021-01-03".parse::<NaiveDate>().expect("date"));
        assert_eq!(window_start(date, 1), date);
        assert_eq!(window_start(date, 0), date);
        assert_eq!(window_start(date, u32::MAX), NaiveDate::MIN);
    }
}
