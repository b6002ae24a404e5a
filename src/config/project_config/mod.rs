//! Project-level configuration support
//!
//! Loads per-project configuration from `storyline.toml` in the repository
//! root. Every field has a default, so a missing or partial file is valid.
//!
//! # Configuration Format
//!
//! ```toml
//! # storyline.toml
//!
//! [race]
//! top_n = 30
//! max_frames = 100
//! extensions = ["js", "css", "html"]
//!
//! [activity]
//! window_days = 30
//! debt_keywords = ["tech debt", "technical debt", "compliance"]
//!
//! [churn]
//! limit = 30
//! ignore_dotfiles = true
//!
//! [timeline]
//! key_files = ["index.html", "js/main.js", "js/app.js"]
//!
//! [[categories]]
//! name = "service"
//! color = "#22c55e"
//! patterns = ["js/services/"]
//!
//! [[milestones]]
//! kind = "service_layer"
//! title = "Service Layer Emerges"
//! description = "Business logic moves to dedicated services"
//! trigger = { when = "category_present", category = "service" }
//! ```
//!
//! Rule tables (`categories`, `milestones`, `phases`, `directories`) replace
//! the built-in tables when present and fall back to them when absent.

use crate::classifier::{default_category_rules, CategoryClassifier, CategoryRule, KeywordFilter};
use crate::detectors::{
    default_directory_rules, default_milestone_rules, default_phase_rules, RuleSpec,
};
use crate::timeline::churn::ChurnOptions;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

/// Longest trailing activity window accepted, in days.
pub const MAX_WINDOW_DAYS: u32 = 36_500;

/// File name looked up in the repository root.
pub const CONFIG_FILE_NAME: &str = "storyline.toml";

/// Project-level configuration loaded from storyline.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorylineConfig {
    #[serde(default)]
    pub race: RaceConfig,

    #[serde(default)]
    pub activity: ActivityConfig,

    #[serde(default)]
    pub churn: ChurnConfig,

    #[serde(default)]
    pub timeline: TimelineConfig,

    /// Ordered category table; empty means the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategoryRule>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub milestones: Vec<RuleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub phases: Vec<RuleSpec>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directories: Vec<RuleSpec>,
}

/// Race chart settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceConfig {
    /// Active files shown per frame (default: 30)
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Target frame count before the forced final date (default: 100)
    #[serde(default = "default_max_frames")]
    pub max_frames: usize,

    /// Tracked file extensions, without the dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_top_n() -> usize {
    30
}
fn default_max_frames() -> usize {
    100
}
fn default_extensions() -> Vec<String> {
    ["js", "css", "html"].iter().map(|e| e.to_string()).collect()
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_frames: default_max_frames(),
            extensions: default_extensions(),
        }
    }
}

/// Rolling activity window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Trailing window length in days, inclusive of the reference date
    #[serde(default = "default_window_days")]
    pub window_days: u32,

    /// Case-insensitive keywords marking technical-debt commits
    #[serde(default = "default_debt_keywords")]
    pub debt_keywords: Vec<String>,
}

fn default_window_days() -> u32 {
    30
}
fn default_debt_keywords() -> Vec<String> {
    ["tech debt", "technical debt", "compliance"]
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            debt_keywords: default_debt_keywords(),
        }
    }
}

/// Hot-files settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChurnConfig {
    #[serde(default = "default_churn_limit")]
    pub limit: usize,

    #[serde(default = "default_true")]
    pub ignore_dotfiles: bool,
}

fn default_churn_limit() -> usize {
    30
}
fn default_true() -> bool {
    true
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            limit: default_churn_limit(),
            ignore_dotfiles: true,
        }
    }
}

/// Timeline report settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    /// Files whose size is followed revision by revision
    #[serde(default = "default_key_files")]
    pub key_files: Vec<String>,
}

fn default_key_files() -> Vec<String> {
    ["index.html", "js/main.js", "js/app.js"]
        .iter()
        .map(|f| f.to_string())
        .collect()
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            key_files: default_key_files(),
        }
    }
}

impl StorylineConfig {
    /// Clamp values that would make the pipeline degenerate.
    pub fn normalize(&mut self) {
        if self.race.top_n == 0 {
            warn!("race.top_n must be at least 1, using 1");
            self.race.top_n = 1;
        }
        if self.race.max_frames == 0 {
            warn!("race.max_frames must be at least 1, using 1");
            self.race.max_frames = 1;
        }
        if self.activity.window_days == 0 {
            warn!("activity.window_days must be at least 1, using 1");
            self.activity.window_days = 1;
        }
        if self.activity.window_days > MAX_WINDOW_DAYS {
            warn!(
                "activity.window_days {} is too large, using {}",
                self.activity.window_days, MAX_WINDOW_DAYS
            );
            self.activity.window_days = MAX_WINDOW_DAYS;
        }
        for ext in &mut self.race.extensions {
            *ext = ext.trim().trim_start_matches('.').to_string();
        }
        self.race.extensions.retain(|e| !e.is_empty());
    }

    pub fn category_classifier(&self) -> CategoryClassifier {
        if self.categories.is_empty() {
            CategoryClassifier::new(default_category_rules())
        } else {
            CategoryClassifier::new(self.categories.clone())
        }
    }

    pub fn debt_filter(&self) -> KeywordFilter {
        KeywordFilter::new(&self.activity.debt_keywords)
    }

    pub fn churn_options(&self) -> ChurnOptions {
        ChurnOptions {
            limit: self.churn.limit,
            ignore_dotfiles: self.churn.ignore_dotfiles,
        }
    }

    pub fn milestone_rules(&self) -> Vec<RuleSpec> {
        or_builtin(&self.milestones, default_milestone_rules)
    }

    pub fn phase_rules(&self) -> Vec<RuleSpec> {
        or_builtin(&self.phases, default_phase_rules)
    }

    pub fn directory_rules(&self) -> Vec<RuleSpec> {
        or_builtin(&self.directories, default_directory_rules)
    }
}

fn or_builtin(configured: &[RuleSpec], builtin: fn() -> Vec<RuleSpec>) -> Vec<RuleSpec> {
    if configured.is_empty() {
        builtin()
    } else {
        configured.to_vec()
    }
}

/// Load project configuration from the repository root.
///
/// A missing file yields defaults. An unreadable or invalid file is logged
/// and also yields defaults.
pub fn load_project_config(repo_path: &Path) -> StorylineConfig {
    let toml_path = repo_path.join(CONFIG_FILE_NAME);
    if toml_path.exists() {
        match load_config_file(&toml_path) {
            Ok(config) => {
                debug!("Loaded project config from {}", toml_path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", toml_path.display(), e);
            }
        }
    }

    debug!("No project config found, using defaults");
    let mut config = StorylineConfig::default();
    config.normalize();
    config
}

/// Load configuration from an explicit TOML file. Errors are returned.
pub fn load_config_file(path: &Path) -> anyhow::Result<StorylineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut config: StorylineConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    config.normalize();
    Ok(config)
}

/// Commented starter file written by `storyline init`.
pub const EXAMPLE_CONFIG: &str = r##"# storyline.toml
#
# Every setting is optional; the values below are the defaults.

[race]
# Active files shown per frame
top_n = 30
# Target number of frames (the final date is always added)
max_frames = 100
# Tracked file extensions
extensions = ["js", "css", "html"]

[activity]
# Trailing window, in days, for commit velocity
window_days = 30
# Commits whose message contains one of these count as technical debt work
debt_keywords = ["tech debt", "technical debt", "compliance"]

[churn]
limit = 30
ignore_dotfiles = true

[timeline]
key_files = ["index.html", "js/main.js", "js/app.js"]

# Category table, first match wins. Uncomment to replace the built-in table.
# [[categories]]
# name = "service"
# color = "#22c55e"
# patterns = ["js/services/"]

# Milestone rules for the race chart. Uncomment to replace the built-ins.
# Triggers: first_observation, message_matches, category_present,
# category_count, drop_from_peak, path_exists, debt_window
# [[milestones]]
# kind = "components"
# title = "Component Architecture"
# description = "Modular views take shape with reusable components"
# trigger = { when = "category_count", category = "component", min = 5 }
"##;
