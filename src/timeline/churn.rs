//! Hot files: historical touch counts of files that still exist

use crate::git::{HistoryGateway, HistoryResult, PathFilter};
use crate::models::ChurnEntry;

/// Churn ranking options.
#[derive(Debug, Clone, Copy)]
pub struct ChurnOptions {
    pub limit: usize,
    /// Skip paths with any dot-prefixed segment (`.github/`, `.eslintrc`)
    pub ignore_dotfiles: bool,
}

impl Default for ChurnOptions {
    fn default() -> Self {
        Self {
            limit: 30,
            ignore_dotfiles: true,
        }
    }
}

/// Rank currently existing paths by how many commits touched them.
///
/// Ties break on path so the ranking is stable across runs.
pub fn top_churn<G: HistoryGateway + ?Sized>(
    gateway: &G,
    options: ChurnOptions,
) -> HistoryResult<Vec<ChurnEntry>> {
    let filter: PathFilter<'_> = &|path: &str| !is_dotfile(path);
    let counts = if options.ignore_dotfiles {
        gateway.touch_counts(Some(filter))?
    } else {
        gateway.touch_counts(None)?
    };

    let mut ranked: Vec<ChurnEntry> = counts
        .into_iter()
        .map(|(path, commits)| ChurnEntry { path, commits })
        .collect();
    ranked.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.path.cmp(&b.path)));

    let mut hot = Vec::with_capacity(options.limit.min(ranked.len()));
    for entry in ranked {
        if hot.len() >= options.limit {
            break;
        }
        if gateway.path_exists_now(&entry.path)? {
            hot.push(entry);
        }
    }
    Ok(hot)
}

fn is_dotfile(path: &str) -> bool {
    path.split('/').any(|segment| segment.starts_with('.'))
}
