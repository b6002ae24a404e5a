//! Commit message → commit type

use super::{first_match, MatchRule};
use crate::models::CommitType;

/// One row of the commit-type table, matched against the lowercased message.
#[derive(Debug, Clone, Copy)]
pub struct CommitTypeRule {
    pub kind: CommitType,
    pub prefixes: &'static [&'static str],
    pub keywords: &'static [&'static str],
}

impl MatchRule for CommitTypeRule {
    fn accepts(&self, lowered: &str) -> bool {
        self.prefixes.iter().any(|p| lowered.starts_with(p))
            || self.keywords.iter().any(|k| lowered.contains(k))
    }
}

pub const COMMIT_TYPE_RULES: &[CommitTypeRule] = &[
    CommitTypeRule {
        kind: CommitType::Feature,
        prefixes: &["feat"],
        keywords: &["feature"],
    },
    CommitTypeRule {
        kind: CommitType::Fix,
        prefixes: &["fix"],
        keywords: &["bug"],
    },
    CommitTypeRule {
        kind: CommitType::Refactor,
        prefixes: &[],
        keywords: &["refactor", "cleanup", "clean up"],
    },
    CommitTypeRule {
        kind: CommitType::Docs,
        prefixes: &["docs"],
        keywords: &["readme", "documentation"],
    },
    CommitTypeRule {
        kind: CommitType::Test,
        prefixes: &[],
        keywords: &["test"],
    },
    CommitTypeRule {
        kind: CommitType::Merge,
        prefixes: &[],
        keywords: &["merge"],
    },
    CommitTypeRule {
        kind: CommitType::Style,
        prefixes: &[],
        keywords: &["style", "css"],
    },
];

/// Classify a commit message; unmatched messages are [`CommitType::Other`].
pub fn classify_commit(message: &str) -> CommitType {
    let lowered = message.to_lowercase();
    first_match(COMMIT_TYPE_RULES, &lowered)
        .map(|rule| rule.kind)
        .unwrap_or_default()
}
