//! Per-file lifecycle: creation, deletion, current existence
//!
//! Existence is read from the live working state rather than replayed from
//! history, so a file deleted and later restored reports as existing with no
//! deletion date. Frame status re-derives history at each reference date.

use super::FileUniverse;
use crate::classifier::CategoryClassifier;
use crate::git::{HistoryGateway, HistoryResult};
use crate::models::FileRecord;
use std::collections::BTreeSet;
use tracing::warn;

pub fn track_lifecycles<G: HistoryGateway + ?Sized>(
    gateway: &G,
    paths: &BTreeSet<String>,
    classifier: &CategoryClassifier,
) -> HistoryResult<FileUniverse> {
    let mut records = Vec::with_capacity(paths.len());
    for path in paths {
        records.push(track_one(gateway, path, classifier)?);
    }
    Ok(FileUniverse::from_records(records))
}

fn track_one<G: HistoryGateway + ?Sized>(
    gateway: &G,
    path: &str,
    classifier: &CategoryClassifier,
) -> HistoryResult<FileRecord> {
    let created = gateway.first_add_date(path)?;
    let exists = gateway.path_exists_now(path)?;

    let mut deleted = if exists {
        None
    } else {
        gateway.last_remove_date(path)?
    };
    if let (Some(c), Some(d)) = (created, deleted) {
        if d <= c {
            warn!(
                data_quality = true,
                "Discarding deletion date {} for {}: not after creation {}", d, path, c
            );
            deleted = None;
        }
    }

    let category = classifier.classify(path);
    Ok(FileRecord {
        path: path.to_string(),
        category: category.name.to_string(),
        color: category.color.to_string(),
        created,
        deleted,
        exists,
    })
}
