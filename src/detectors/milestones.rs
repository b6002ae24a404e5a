//! Frame-based milestone detection
//!
//! Runs the latch engine once per sampled frame. Category triggers look at
//! the frame's displayed active entries; anchor sizes come from the
//! full snapshot so an off-screen monolith is still watched.

use super::engine::{LatchEngine, RuleSpec};
use super::trigger::{AnchorReading, Evidence, PathPattern, Trigger};
use crate::models::{FileStatus, Frame, Milestone, Snapshot};
use crate::timeline::FileUniverse;
use chrono::NaiveDate;
use std::collections::HashMap;

/// Built-in frame milestone table.
pub fn default_milestone_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(
            "service_layer",
            "Service Layer Emerges",
            "Architecture shift: business logic moves to dedicated services",
            Trigger::CategoryPresent {
                category: "service".to_string(),
            },
        ),
        RuleSpec::new(
            "components",
            "Component Architecture",
            "Modular views take shape with reusable components",
            Trigger::CategoryCount {
                category: "component".to_string(),
                min: 5,
            },
        ),
        RuleSpec::new(
            "ai",
            "AI Integration",
            "Intelligent features enter the codebase",
            Trigger::CategoryPresent {
                category: "ai".to_string(),
            },
        ),
        RuleSpec::new(
            "monolith_busting",
            "Monolith Busting",
            "The massive index.html is broken apart into separate modules",
            Trigger::DropFromPeak {
                path: "index.html".to_string(),
                min_peak: 2000,
                drop: 1000,
                active_files_floor: 10,
            },
        ),
        RuleSpec::new(
            "workspace_layout",
            "Workspace Layout",
            "Navigation moves to a persistent sidebar with swappable views",
            Trigger::PathExists {
                any: vec![PathPattern::exact("js/components/WorkspaceComponent.js")],
            },
        ),
        RuleSpec::new(
            "ui_theme",
            "UI Theme Styling",
            "Semantic CSS variables and dark mode support arrive",
            Trigger::PathExists {
                any: vec![PathPattern::exact("css/settings/variables.css")],
            },
        ),
        RuleSpec::new(
            "tech_debt",
            "Tech Debt Paydown",
            "A concentrated burst of technical-debt and compliance work",
            Trigger::DebtWindow { threshold: 4 },
        ),
    ]
}

struct FrameEvidence<'a> {
    frame: &'a Frame,
    universe: &'a FileUniverse,
    anchors: &'a HashMap<String, AnchorReading>,
    first: bool,
}

impl Evidence for FrameEvidence<'_> {
    fn date(&self) -> NaiveDate {
        self.frame.date
    }

    fn is_first(&self) -> bool {
        self.first
    }

    fn category_count(&self, category: &str) -> usize {
        self.frame
            .files
            .iter()
            .filter(|e| e.status == FileStatus::Active && e.category == category)
            .count()
    }

    fn anchor(&self, path: &str) -> Option<AnchorReading> {
        self.anchors.get(path).copied()
    }

    fn active_files(&self) -> usize {
        self.frame.total_files
    }

    fn path_created(&self, patterns: &[PathPattern]) -> bool {
        let date = self.frame.date;
        self.universe.records().any(|record| {
            record.created.is_some_and(|created| created <= date)
                && patterns.iter().any(|p| p.matches(&record.path))
        })
    }

    fn debt_commits(&self) -> Option<usize> {
        Some(self.frame.activity.debt_commits)
    }
}

/// Latches milestone rules across an ordered frame sequence.
pub struct MilestoneDetector<'a> {
    engine: LatchEngine,
    universe: &'a FileUniverse,
    anchor_paths: Vec<String>,
    anchors: HashMap<String, AnchorReading>,
    observed: usize,
}

impl<'a> MilestoneDetector<'a> {
    pub fn new(rules: &[RuleSpec], universe: &'a FileUniverse) -> Self {
        let engine = LatchEngine::new(rules);
        let anchor_paths = engine.anchor_paths();
        Self {
            engine,
            universe,
            anchor_paths,
            anchors: HashMap::new(),
            observed: 0,
        }
    }

    /// Feed the next frame with the snapshot it was built from.
    pub fn observe(&mut self, frame: &Frame, snapshot: &Snapshot) {
        for path in &self.anchor_paths {
            // Anchors outside the tracked universe are never readable
            let Some(&current) = snapshot.sizes.get(path) else {
                continue;
            };
            let reading = self
                .anchors
                .entry(path.clone())
                .or_insert(AnchorReading { current, peak: 0 });
            reading.current = current;
            reading.peak = reading.peak.max(current);
        }

        let evidence = FrameEvidence {
            frame,
            universe: self.universe,
            anchors: &self.anchors,
            first: self.observed == 0,
        };
        self.engine.observe(&evidence);
        self.observed += 1;
    }

    pub fn finish(self) -> Vec<Milestone> {
        self.engine.finish()
    }
}
