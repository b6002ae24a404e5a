//! File universe discovery

use crate::git::{HistoryGateway, HistoryResult};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Every path ever added anywhere in history whose extension is allowed.
///
/// Extensions are compared without the leading dot, case-sensitively.
pub fn discover<G: HistoryGateway + ?Sized>(
    gateway: &G,
    extensions: &[String],
) -> HistoryResult<BTreeSet<String>> {
    let all = gateway.paths_ever_added()?;
    let total = all.len();
    let tracked: BTreeSet<String> = all
        .into_iter()
        .filter(|path| has_allowed_extension(path, extensions))
        .collect();
    debug!("Tracking {} of {} paths ever added", tracked.len(), total);
    Ok(tracked)
}

fn has_allowed_extension(path: &str, extensions: &[String]) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.trim_start_matches('.') == ext))
}
