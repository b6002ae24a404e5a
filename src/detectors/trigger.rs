//! Trigger grammar shared by milestone and phase rules
//!
//! A trigger is a pure predicate over one [`Evidence`] point. Evidence that
//! cannot answer a question (a frame has no commit message, an anchor file
//! was never seen) makes the trigger unsatisfied, never an error.

use crate::models::Commit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Path matcher: every present condition must hold; an empty pattern matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathPattern {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
}

impl PathPattern {
    pub fn exact(path: &str) -> Self {
        Self {
            exact: Some(path.to_string()),
            ..Self::default()
        }
    }

    pub fn prefix(prefix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            ..Self::default()
        }
    }

    pub fn suffix(suffix: &str) -> Self {
        Self {
            suffix: Some(suffix.to_string()),
            ..Self::default()
        }
    }

    pub fn prefix_suffix(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: Some(prefix.to_string()),
            suffix: Some(suffix.to_string()),
            exact: None,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        if self.exact.is_none() && self.prefix.is_none() && self.suffix.is_none() {
            return false;
        }
        self.exact.as_deref().map_or(true, |e| path == e)
            && self.prefix.as_deref().map_or(true, |p| path.starts_with(p))
            && self.suffix.as_deref().map_or(true, |s| path.ends_with(s))
    }
}

/// Size of an anchor file now and at its running peak.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorReading {
    pub current: usize,
    pub peak: usize,
}

/// Predicate families.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "when", rename_all = "snake_case")]
pub enum Trigger {
    /// The very first evidence point
    FirstObservation,
    /// Commit message contains any keyword (case-insensitive)
    MessageMatches { keywords: Vec<String> },
    /// At least one entry of the category
    CategoryPresent { category: String },
    /// At least `min` entries of the category
    CategoryCount { category: String, min: usize },
    /// Anchor fell more than `drop` lines below a peak of at least
    /// `min_peak`, with more than `active_files_floor` active files
    DropFromPeak {
        path: String,
        #[serde(default)]
        min_peak: usize,
        drop: usize,
        #[serde(default)]
        active_files_floor: usize,
    },
    /// Some path matching any pattern was created on or before this point
    PathExists { any: Vec<PathPattern> },
    /// Trailing-window technical-debt commit count exceeds `threshold`
    DebtWindow { threshold: usize },
}

/// Questions a trigger may ask of one point in the sequence.
pub trait Evidence {
    fn date(&self) -> NaiveDate;

    /// Commit behind this point, for commit-stream evidence.
    fn commit(&self) -> Option<&Commit> {
        None
    }

    fn is_first(&self) -> bool;

    fn category_count(&self, category: &str) -> usize;

    fn anchor(&self, path: &str) -> Option<AnchorReading>;

    fn active_files(&self) -> usize;

    fn path_created(&self, patterns: &[PathPattern]) -> bool;

    fn debt_commits(&self) -> Option<usize>;
}

impl Trigger {
    /// Anchor path watched by a drop-from-peak trigger.
    pub fn anchor_path(&self) -> Option<&str> {
        match self {
            Trigger::DropFromPeak { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Evaluate everything except message keywords, which need a compiled filter.
    pub(crate) fn holds_structural(&self, evidence: &dyn Evidence) -> bool {
        match self {
            Trigger::FirstObservation => evidence.is_first(),
            Trigger::MessageMatches { .. } => false,
            Trigger::CategoryPresent { category } => evidence.category_count(category) > 0,
            Trigger::CategoryCount { category, min } => {
                evidence.category_count(category) >= *min
            }
            Trigger::DropFromPeak {
                path,
                min_peak,
                drop,
                active_files_floor,
            } => match evidence.anchor(path) {
                Some(reading) => {
                    reading.peak >= *min_peak
                        && reading.peak.saturating_sub(reading.current) > *drop
                        && evidence.active_files() > *active_files_floor
                }
                None => false,
            },
            Trigger::PathExists { any } => evidence.path_created(any),
            Trigger::DebtWindow { threshold } => {
                evidence.debt_commits().is_some_and(|count| count > *threshold)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed {
        first: bool,
        components: usize,
        anchor: Option<AnchorReading>,
        active: usize,
        debt: Option<usize>,
        created: Vec<&'static str>,
    }

    impl Evidence for Fixed {
        fn date(&self) -> NaiveDate {
            NaiveDate::from_ymd_opt(2021, 6, 1).unwrap_or_default()
        }
        fn is_first(&self) -> bool {
            self.first
        }
        fn category_count(&self, category: &str) -> usize {
            if category == "component" {
                self.components
            } else {
                0
            }
        }
        fn anchor(&self, _path: &str) -> Option<AnchorReading> {
            self.anchor
        }
        fn active_files(&self) -> usize {
            self.active
        }
        fn path_created(&self, patterns: &[PathPattern]) -> bool {
            self.created
                .iter()
                .any(|p| patterns.iter().any(|pat| pat.matches(p)))
        }
        fn debt_commits(&self) -> Option<usize> {
            self.debt
        }
    }

    fn evidence() -> Fixed {
        Fixed {
            first: false,
            components: 0,
            anchor: None,
            active: 0,
            debt: None,
            created: Vec::new(),
        }
    }

    #[test]
    fn test_path_pattern_conditions() {
        assert!(PathPattern::exact("eslint.config.mjs").matches("eslint.config.mjs"));
        assert!(!PathPattern::exact("eslint.config.mjs").matches("a/eslint.config.mjs"));
        assert!(PathPattern::prefix("js/services/").matches("js/services/api.js"));
        assert!(PathPattern::suffix(".test.js").matches("src/a.test.js"));
        let contracts = PathPattern::prefix_suffix("docs/", "contract.md");
        assert!(contracts.matches("docs/agent-contract.md"));
        assert!(!contracts.matches("docs/readme.md"));
        assert!(!PathPattern::default().matches("anything"));
    }

    #[test]
    fn test_category_triggers() {
        let mut ev = evidence();
        ev.components = 4;
        let present = Trigger::CategoryPresent {
            category: "component".to_string(),
        };
        let five = Trigger::CategoryCount {
            category: "component".to_string(),
            min: 5,
        };
        assert!(present.holds_structural(&ev));
        assert!(!five.holds_structural(&ev));
        ev.components = 5;
        assert!(five.holds_structural(&ev));
    }

    #[test]
    fn test_drop_from_peak() {
        let trigger = Trigger::DropFromPeak {
            path: "index.html".to_string(),
            min_peak: 2000,
            drop: 1000,
            active_files_floor: 10,
        };
        let mut ev = evidence();
        assert!(!trigger.holds_structural(&ev), "missing anchor is unsatisfied");

        ev.active = 20;
        ev.anchor = Some(AnchorReading { current: 1000, peak: 2500 });
        assert!(trigger.holds_structural(&ev));

        ev.anchor = Some(AnchorReading { current: 1500, peak: 2500 });
        assert!(!trigger.holds_structural(&ev), "drop must exceed threshold");

        ev.anchor = Some(AnchorReading { current: 100, peak: 1500 });
        assert!(!trigger.holds_structural(&ev), "peak below floor");

        ev.anchor = Some(AnchorReading { current: 0, peak: 3000 });
        ev.active = 10;
        assert!(!trigger.holds_structural(&ev), "active files must pass floor");
    }

    #[test]
    fn test_debt_window_and_first() {
        let trigger = Trigger::DebtWindow { threshold: 4 };
        let mut ev = evidence();
        assert!(!trigger.holds_structural(&ev));
        ev.debt = Some(4);
        assert!(!trigger.holds_structural(&ev));
        ev.debt = Some(5);
        assert!(trigger.holds_structural(&ev));

        assert!(!Trigger::FirstObservation.holds_structural(&ev));
        ev.first = true;
        assert!(Trigger::FirstObservation.holds_structural(&ev));
    }

    #[test]
    fn test_path_exists() {
        let trigger = Trigger::PathExists {
            any: vec![PathPattern::exact("css/settings/variables.css")],
        };
        let mut ev = evidence();
        assert!(!trigger.holds_structural(&ev));
        ev.created = vec!["css/settings/variables.css"];
        assert!(trigger.holds_structural(&ev));
    }

    #[test]
    fn test_trigger_toml_shape() {
        #[derive(Deserialize)]
        struct Wrapper {
            trigger: Trigger,
        }
        let parsed: Wrapper = toml::from_str(
            r#"trigger = { when = "category_count", category = "component", min = 5 }"#,
        )
        .expect("parse trigger");
        assert_eq!(
            parsed.trigger,
            Trigger::CategoryCount {
                category: "component".to_string(),
                min: 5
            }
        );
    }
}
