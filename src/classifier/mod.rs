//! Rule-table classifiers
//!
//! Both classifiers are ordered tables evaluated by the same first-match
//! walk: the first rule that accepts the input wins, and table order is the
//! only priority.
//!
//! - [`CategoryClassifier`] maps a file path to a category tag and color
//! - [`classify_commit`] maps a commit message to a [`CommitType`]
//!
//! [`CommitType`]: crate::models::CommitType

pub mod category;
pub mod commit_type;

pub use category::{default_category_rules, Category, CategoryClassifier, CategoryRule};
pub use commit_type::{classify_commit, CommitTypeRule, COMMIT_TYPE_RULES};

use regex::{Regex, RegexBuilder};
use tracing::warn;

/// A rule in a first-match table.
pub trait MatchRule {
    fn accepts(&self, input: &str) -> bool;
}

/// Return the first rule in `rules` that accepts `input`.
pub fn first_match<'a, R: MatchRule>(rules: &'a [R], input: &str) -> Option<&'a R> {
    rules.iter().find(|rule| rule.accepts(input))
}

/// Case-insensitive "contains any of" filter over commit messages.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    pattern: Option<Regex>,
}

impl KeywordFilter {
    /// Build a filter; an empty keyword list matches nothing.
    pub fn new(keywords: &[String]) -> Self {
        let alternatives: Vec<String> = keywords
            .iter()
            .filter(|k| !k.trim().is_empty())
            .map(|k| regex::escape(k.trim()))
            .collect();
        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let pattern = match RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
        {
            Ok(re) => Some(re),
            Err(e) => {
                warn!("Invalid keyword filter {:?}: {}", keywords, e);
                None
            }
        };
        Self { pattern }
    }

    pub fn matches(&self, message: &str) -> bool {
        self.pattern.as_ref().is_some_and(|re| re.is_match(message))
    }
}
