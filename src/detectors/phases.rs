//! Commit-stream phase detection
//!
//! Same rule grammar as the frame milestones, evaluated at commit
//! resolution. The detector replays the commit stream oldest-first and keeps
//! the running state the triggers query: live paths per category, every path
//! ever created, anchor sizes and the trailing debt window.

use super::engine::{LatchEngine, RuleSpec};
use super::trigger::{AnchorReading, Evidence, PathPattern, Trigger};
use crate::classifier::{CategoryClassifier, KeywordFilter};
use crate::git::{HistoryGateway, HistoryResult};
use crate::models::{ChangeKind, Commit, FileChange, Milestone, StateRef};
use crate::timeline::window_start;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap, VecDeque};

/// Built-in architecture phase table.
pub fn default_phase_rules() -> Vec<RuleSpec> {
    vec![
        RuleSpec::new(
            "genesis",
            "Genesis",
            "It started with a single commit: the digital equivalent of breaking ground.",
            Trigger::FirstObservation,
        )
        .with_subtitle("The First Lines of Code"),
        RuleSpec::new(
            "planning_era",
            "The Planning Era",
            "Planning features begin to emerge. The codebase starts to find its purpose.",
            Trigger::MessageMatches {
                keywords: vec!["plan".to_string()],
            },
        )
        .with_subtitle("From Chaos to Structure"),
        RuleSpec::new(
            "monolith_busting",
            "Monolith Busting",
            "The massive index.html is broken apart into separate modules.",
            Trigger::DropFromPeak {
                path: "index.html".to_string(),
                min_peak: 2000,
                drop: 1000,
                active_files_floor: 0,
            },
        )
        .with_subtitle("Breaking the Big File"),
        RuleSpec::new(
            "component_revolution",
            "The Component Revolution",
            "The components directory is born. Views become encapsulated and reusable.",
            Trigger::PathExists {
                any: vec![PathPattern::prefix("js/components/")],
            },
        )
        .with_subtitle("Modular Thinking Takes Hold"),
        RuleSpec::new(
            "workspace_layout",
            "Workspace Layout",
            "Navigation moves to a persistent sidebar with swappable views.",
            Trigger::PathExists {
                any: vec![PathPattern::exact("js/components/WorkspaceComponent.js")],
            },
        )
        .with_subtitle("The Sidebar Era"),
        RuleSpec::new(
            "service_layer",
            "Service Layer Architecture",
            "Business logic leaves the views and settles into dedicated services.",
            Trigger::PathExists {
                any: vec![PathPattern::prefix("js/services/")],
            },
        )
        .with_subtitle("Separation of Concerns"),
        RuleSpec::new(
            "ui_theme",
            "UI Theme Styling",
            "Semantic CSS variables and comprehensive dark mode support.",
            Trigger::PathExists {
                any: vec![PathPattern::exact("css/settings/variables.css")],
            },
        )
        .with_subtitle("Dark Mode & Theming"),
        RuleSpec::new(
            "ai_awakens",
            "AI Awakens",
            "Context-aware chat, smart suggestions and automated workflows emerge.",
            Trigger::PathExists {
                any: vec![PathPattern::prefix("js/ai/"), PathPattern::prefix("ai/")],
            },
        )
        .with_subtitle("Intelligence Enters the Codebase"),
        RuleSpec::new(
            "agent_contracts",
            "Agent Contracts",
            "Formal contracts are written to guide AI agents on code quality.",
            Trigger::PathExists {
                any: vec![PathPattern::prefix_suffix("docs/", "contract.md")],
            },
        )
        .with_subtitle("Rules for Robots"),
        RuleSpec::new(
            "tech_debt",
            "Tech Debt Paydown",
            "A dedicated stretch of cleaning up debt and standardizing patterns.",
            Trigger::DebtWindow { threshold: 4 },
        )
        .with_subtitle("Focus on Compliance"),
        RuleSpec::new(
            "modern_era",
            "Modern Era",
            "Unit tests arrive. The codebase becomes a professional-grade project.",
            Trigger::PathExists {
                any: vec![PathPattern::prefix("tests/"), PathPattern::suffix(".test.js")],
            },
        )
        .with_subtitle("Testing and CI/CD Maturity"),
        RuleSpec::new(
            "quality_gates",
            "Code Quality Gates",
            "Lint and test configurations enforce quality gates on every change.",
            Trigger::PathExists {
                any: vec![
                    PathPattern::exact("eslint.config.mjs"),
                    PathPattern::exact("vitest.config.mjs"),
                ],
            },
        )
        .with_subtitle("Automated Standards"),
    ]
}

/// Built-in directory milestone table.
pub fn default_directory_rules() -> Vec<RuleSpec> {
    [
        ("js/services", "Service Layer Architecture"),
        ("js/components", "Component Architecture"),
        ("js/ai", "AI Integration"),
        ("ai", "AI Module"),
        ("css/views", "View-Specific Styling"),
        ("tests", "Test Infrastructure"),
        ("docs", "Documentation"),
    ]
    .into_iter()
    .map(|(dir, description)| {
        RuleSpec::new(
            &format!("directory:{dir}"),
            dir,
            description,
            Trigger::PathExists {
                any: vec![PathPattern::prefix(&format!("{dir}/"))],
            },
        )
    })
    .collect()
}

struct CommitEvidence<'a> {
    commit: &'a Commit,
    first: bool,
    state: &'a StreamState,
}

impl Evidence for CommitEvidence<'_> {
    fn date(&self) -> NaiveDate {
        self.commit.day()
    }

    fn commit(&self) -> Option<&Commit> {
        Some(self.commit)
    }

    fn is_first(&self) -> bool {
        self.first
    }

    fn category_count(&self, category: &str) -> usize {
        self.state.categories.get(category).copied().unwrap_or(0)
    }

    fn anchor(&self, path: &str) -> Option<AnchorReading> {
        self.state.anchors.get(path).copied()
    }

    fn active_files(&self) -> usize {
        self.state.live.len()
    }

    fn path_created(&self, patterns: &[PathPattern]) -> bool {
        self.state
            .created
            .iter()
            .any(|path| patterns.iter().any(|p| p.matches(path)))
    }

    fn debt_commits(&self) -> Option<usize> {
        Some(self.state.debt_window.len())
    }
}

#[derive(Default)]
struct StreamState {
    live: BTreeSet<String>,
    created: BTreeSet<String>,
    categories: HashMap<String, usize>,
    anchors: HashMap<String, AnchorReading>,
    debt_window: VecDeque<NaiveDate>,
}

/// Latches phase rules across the chronological commit stream.
pub struct PhaseDetector<'a> {
    engine: LatchEngine,
    classifier: &'a CategoryClassifier,
    debt_filter: &'a KeywordFilter,
    window_days: u32,
    anchor_paths: Vec<String>,
    state: StreamState,
    observed: usize,
}

impl<'a> PhaseDetector<'a> {
    pub fn new(
        rules: &[RuleSpec],
        classifier: &'a CategoryClassifier,
        debt_filter: &'a KeywordFilter,
        window_days: u32,
    ) -> Self {
        let engine = LatchEngine::new(rules);
        let anchor_paths = engine.anchor_paths();
        Self {
            engine,
            classifier,
            debt_filter,
            window_days: window_days.max(1),
            anchor_paths,
            state: StreamState::default(),
            observed: 0,
        }
    }

    /// Feed the next commit (oldest first) with its file changes.
    ///
    /// Anchor files touched by the commit are measured through the gateway.
    pub fn observe<G: HistoryGateway + ?Sized>(
        &mut self,
        gateway: &G,
        commit: &Commit,
        changes: &[FileChange],
    ) -> HistoryResult<()> {
        for change in changes {
            self.apply_change(change);
            if self.anchor_paths.contains(&change.path) {
                let current = match change.kind {
                    ChangeKind::Deleted => 0,
                    _ => gateway
                        .read_size(&StateRef::new(commit.hash.clone()), &change.path)?
                        .unwrap_or(0),
                };
                let reading = self
                    .state
                    .anchors
                    .entry(change.path.clone())
                    .or_insert(AnchorReading { current, peak: 0 });
                reading.current = current;
                reading.peak = reading.peak.max(current);
            }
        }

        let day = commit.day();
        if self.debt_filter.matches(&commit.body) {
            self.state.debt_window.push_back(day);
        }
        let start = window_start(day, self.window_days);
        while self
            .state
            .debt_window
            .front()
            .is_some_and(|d| *d < start)
        {
            self.state.debt_window.pop_front();
        }

        let evidence = CommitEvidence {
            commit,
            first: self.observed == 0,
            state: &self.state,
        };
        self.engine.observe(&evidence);
        self.observed += 1;
        Ok(())
    }

    fn apply_change(&mut self, change: &FileChange) {
        let category = self.classifier.classify(&change.path).name.to_string();
        match change.kind {
            ChangeKind::Deleted => {
                if self.state.live.remove(&change.path) {
                    if let Some(count) = self.state.categories.get_mut(&category) {
                        *count = count.saturating_sub(1);
                    }
                }
            }
            ChangeKind::Added | ChangeKind::Modified | ChangeKind::Renamed => {
                self.state.created.insert(change.path.clone());
                if self.state.live.insert(change.path.clone()) {
                    *self.state.categories.entry(category).or_insert(0) += 1;
                }
            }
        }
    }

    pub fn finish(self) -> Vec<Milestone> {
        self.engine.finish()
    }
}
