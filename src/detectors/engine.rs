//! Latch rule engine
//!
//! Evaluates a table of rules against an ordered evidence sequence. Each
//! rule fires at most once, at the first point where its trigger holds, and
//! is never evaluated again afterwards.

use super::trigger::{Evidence, Trigger};
use crate::classifier::KeywordFilter;
use crate::models::Milestone;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Declarative rule: event metadata plus its trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Unique event type
    pub kind: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    pub description: String,
    pub trigger: Trigger,
}

impl RuleSpec {
    pub fn new(kind: &str, title: &str, description: &str, trigger: Trigger) -> Self {
        Self {
            kind: kind.to_string(),
            title: title.to_string(),
            subtitle: None,
            description: description.to_string(),
            trigger,
        }
    }

    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }
}

/// A rule ready for evaluation.
struct Rule {
    spec: RuleSpec,
    keywords: Option<KeywordFilter>,
    fired: bool,
}

impl Rule {
    fn compile(spec: RuleSpec) -> Self {
        let keywords = match &spec.trigger {
            Trigger::MessageMatches { keywords } => Some(KeywordFilter::new(keywords)),
            _ => None,
        };
        Self {
            spec,
            keywords,
            fired: false,
        }
    }

    fn holds(&self, evidence: &dyn Evidence) -> bool {
        match (&self.keywords, evidence.commit()) {
            (Some(filter), Some(commit)) => filter.matches(&commit.body),
            (Some(_), None) => false,
            (None, _) => self.spec.trigger.holds_structural(evidence),
        }
    }
}

/// One-shot latch evaluator over a rule table.
pub struct LatchEngine {
    rules: Vec<Rule>,
    events: Vec<Milestone>,
}

impl LatchEngine {
    /// Compile a rule table. Duplicate kinds keep their first definition.
    pub fn new(specs: &[RuleSpec]) -> Self {
        let mut seen = HashSet::new();
        let rules = specs
            .iter()
            .filter(|spec| {
                let fresh = seen.insert(spec.kind.clone());
                if !fresh {
                    warn!("Duplicate rule kind '{}' ignored", spec.kind);
                }
                fresh
            })
            .cloned()
            .map(Rule::compile)
            .collect();
        Self {
            rules,
            events: Vec::new(),
        }
    }

    /// Anchor paths any drop-from-peak rule watches.
    pub fn anchor_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .rules
            .iter()
            .filter_map(|r| r.spec.trigger.anchor_path())
            .map(str::to_string)
            .collect();
        paths.sort();
        paths.dedup();
        paths
    }

    /// Evaluate every pending rule against one evidence point.
    ///
    /// Returns how many rules fired here.
    pub fn observe(&mut self, evidence: &dyn Evidence) -> usize {
        let mut fired = 0;
        for rule in self.rules.iter_mut().filter(|r| !r.fired) {
            if !rule.holds(evidence) {
                continue;
            }
            rule.fired = true;
            fired += 1;
            debug!("Rule '{}' latched on {}", rule.spec.kind, evidence.date());

            let commit = evidence.commit();
            self.events.push(Milestone {
                kind: rule.spec.kind.clone(),
                title: rule.spec.title.clone(),
                subtitle: rule.spec.subtitle.clone(),
                description: rule.spec.description.clone(),
                date: evidence.date(),
                hash: commit.map(|c| c.hash.clone()),
                message: commit.map(|c| c.message.clone()),
            });
        }
        fired
    }

    /// Rules that have not fired yet.
    pub fn pending(&self) -> usize {
        self.rules.iter().filter(|r| !r.fired).count()
    }

    /// Latched events ordered by trigger date, table order within a date.
    pub fn finish(self) -> Vec<Milestone> {
        let mut events = self.events;
        events.sort_by_key(|e| e.date);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::trigger::{AnchorReading, PathPattern};
    use chrono::NaiveDate;

    struct Point {
        date: NaiveDate,
        services: usize,
        first: bool,
    }

    impl Evidence for Point {
        fn date(&self) -> NaiveDate {
            self.date
        }
        fn is_first(&self) -> bool {
            self.first
        }
        fn category_count(&self, category: &str) -> usize {
            if category == "service" {
                self.services
            } else {
                0
            }
        }
        fn anchor(&self, _path: &str) -> Option<AnchorReading> {
            None
        }
        fn active_files(&self) -> usize {
            self.services
        }
        fn path_created(&self, _patterns: &[PathPattern]) -> bool {
            false
        }
        fn debt_commits(&self) -> Option<usize> {
            None
        }
    }

    fn point(day: u32, services: usize) -> Point {
        Point {
            date: NaiveDate::from_ymd_opt(2022, 3, day).unwrap_or_default(),
            services,
            first: day == 1,
        }
    }

    fn rules() -> Vec<RuleSpec> {
        vec![
            RuleSpec::new("genesis", "Genesis", "First commit", Trigger::FirstObservation),
            RuleSpec::new(
                "service_layer",
                "Service Layer",
                "Services appear",
                Trigger::CategoryPresent {
                    category: "service".to_string(),
                },
            ),
            RuleSpec::new(
                "message",
                "Planning",
                "Never fires on frames",
                Trigger::MessageMatches {
                    keywords: vec!["plan".to_string()],
                },
            ),
        ]
    }

    #[test]
    fn test_rules_latch_once() {
        let mut engine = LatchEngine::new(&rules());
        assert_eq!(engine.observe(&point(1, 0)), 1);
        assert_eq!(engine.observe(&point(2, 1)), 1);
        assert_eq!(engine.observe(&point(3, 0)), 0);
        assert_eq!(engine.observe(&point(4, 2)), 0, "service_layer already latched");
        assert_eq!(engine.pending(), 1);

        let events = engine.finish();
        let kinds: Vec<&str> = events.iter().map(|e| e.kind.as_str()).collect();
        assert_eq!(kinds, vec!["genesis", "service_layer"]);
        assert_eq!(events[1].date, NaiveDate::from_ymd_opt(2022, 3, 2).unwrap_or_default());
        assert!(events[1].hash.is_none());
    }

    #[test]
    fn test_duplicate_kinds_keep_first() {
        let mut specs = rules();
        specs.push(RuleSpec::new("genesis", "Again", "dup", Trigger::FirstObservation));
        let mut engine = LatchEngine::new(&specs);
        assert_eq!(engine.pending(), 3);
        engine.observe(&point(1, 0));
        let events = engine.finish();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Genesis");
    }

    #[test]
    fn test_message_trigger_without_commit_is_unsatisfied() {
        let mut engine = LatchEngine::new(&rules()[2..]);
        assert_eq!(engine.observe(&point(5, 3)), 0);
        assert!(engine.finish().is_empty());
    }

    #[test]
    fn test_anchor_paths_collected() {
        let specs = vec![RuleSpec::new(
            "monolith",
            "Monolith Busting",
            "Big file shrinks",
            Trigger::DropFromPeak {
                path: "index.html".to_string(),
                min_peak: 2000,
                drop: 1000,
                active_files_floor: 0,
            },
        )];
        assert_eq!(LatchEngine::new(&specs).anchor_paths(), vec!["index.html"]);
    }
}
