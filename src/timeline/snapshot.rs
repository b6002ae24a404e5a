//! Snapshot reconstruction with a run-scoped memo
//!
//! Sizes depend only on the resolved state, so two reference dates that
//! resolve to the same commit share one set of content reads.

use super::FileUniverse;
use crate::git::{HistoryGateway, HistoryResult};
use crate::models::{Snapshot, StateRef};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Memo hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

pub struct SnapshotReconstructor<'a, G: HistoryGateway + ?Sized> {
    gateway: &'a G,
    universe: &'a FileUniverse,
    memo: HashMap<StateRef, BTreeMap<String, usize>>,
    stats: CacheStats,
}

impl<'a, G: HistoryGateway + ?Sized> SnapshotReconstructor<'a, G> {
    pub fn new(gateway: &'a G, universe: &'a FileUniverse) -> Self {
        Self {
            gateway,
            universe,
            memo: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// Reconstruct the tracked universe at `date`.
    ///
    /// Returns `Ok(None)` when no commit exists at or before that date.
    pub fn snapshot_at(&mut self, date: NaiveDate) -> HistoryResult<Option<Snapshot>> {
        let Some(state) = self.gateway.resolve_state_at(date)? else {
            debug!("No state resolved at {}, skipping", date);
            return Ok(None);
        };

        let sizes = match self.memo.get(&state) {
            Some(sizes) => {
                self.stats.hits += 1;
                sizes.clone()
            }
            None => {
                self.stats.misses += 1;
                let sizes = self.measure(&state)?;
                self.memo.insert(state.clone(), sizes.clone());
                sizes
            }
        };

        Ok(Some(Snapshot { date, state, sizes }))
    }

    /// Tree listing decides presence; lifecycle dates are not consulted.
    fn measure(&self, state: &StateRef) -> HistoryResult<BTreeMap<String, usize>> {
        let present = self.gateway.paths_at(state)?;
        let mut sizes = BTreeMap::new();
        for path in self.universe.paths() {
            let size = if present.contains(path) {
                self.gateway.read_size(state, path)?.unwrap_or(0)
            } else {
                0
            };
            sizes.insert(path.to_string(), size);
        }
        debug!("Measured {} tracked paths at {}", sizes.len(), state);
        Ok(sizes)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::CategoryClassifier;
    use crate::git::MemoryHistory;
    use crate::timeline::track_lifecycles;
    use std::collections::BTreeSet;

    fn day(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    fn universe_for(history: &MemoryHistory, paths: &[&str]) -> FileUniverse {
        let set: BTreeSet<String> = paths.iter().map(|p| p.to_string()).collect();
        track_lifecycles(history, &set, &CategoryClassifier::default()).expect("track")
    }

    #[test]
    fn test_no_state_before_first_commit() {
        let history = MemoryHistory::builder()
            .commit(day("2020-01-05"), "init", &[("a.js", Some(3))])
            .build();
        let universe = universe_for(&history, &["a.js"]);
        let mut reconstructor = SnapshotReconstructor::new(&history, &universe);
        assert!(reconstructor.snapshot_at(day("2020-01-01")).expect("snap").is_none());
    }

    #[test]
    fn test_memoized_by_resolved_state() {
        let history = MemoryHistory::builder()
            .commit(day("2020-01-01"), "init", &[("a.js", Some(3)), ("b.js", Some(4))])
            .commit(day("2020-01-10"), "grow", &[("a.js", Some(30))])
            .build();
        let universe = universe_for(&history, &["a.js", "b.js"]);
        let mut reconstructor = SnapshotReconstructor::new(&history, &universe);

        for d in ["2020-01-01", "2020-01-03", "2020-01-07", "2020-01-09"] {
            let snap = reconstructor.snapshot_at(day(d)).expect("snap").expect("state");
            assert_eq!(snap.size_of("a.js"), 3);
        }
        assert_eq!(history.size_reads(), 2);

        let later = reconstructor
            .snapshot_at(day("2020-01-10"))
            .expect("snap")
            .expect("state");
        assert_eq!(later.size_of("a.js"), 30);
        assert_eq!(history.size_reads(), 4);
        assert_eq!(reconstructor.cache_stats(), CacheStats { hits: 3, misses: 2 });
    }

    #[test]
    fn test_tree_listing_overrides_lifecycle_dates() {
        // side.js was first added on a branch that never reached the lineage
        let history = MemoryHistory::builder()
            .commit(day("2020-01-01"), "init", &[("a.js", Some(3))])
            .branch_commit(day("2020-01-02"), "side work", &[("side.js", Some(9))])
            .commit(day("2020-01-03"), "more", &[("a.js", Some(4))])
            .build();
        let universe = universe_for(&history, &["a.js", "side.js"]);
        assert_eq!(
            universe.get("side.js").and_then(|r| r.created),
            Some(day("2020-01-02"))
        );

        let mut reconstructor = SnapshotReconstructor::new(&history, &universe);
        let snap = reconstructor
            .snapshot_at(day("2020-01-03"))
            .expect("snap")
            .expect("state");
        assert_eq!(snap.size_of("side.js"), 0);
        assert_eq!(snap.size_of("a.js"), 4);
    }
}
