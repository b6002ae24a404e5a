//! Configuration module for Storyline
//!
//! This module handles:
//! - Project-level configuration (storyline.toml)
//! - Rule table overrides (categories, milestones, phases, directories)
//! - Defaults that CLI flags may override

mod project_config;

pub use project_config::{
    ActivityConfig,
    ChurnConfig,
    RaceConfig,
    StorylineConfig,
    TimelineConfig,
    CONFIG_FILE_NAME,
    EXAMPLE_CONFIG,
    load_config_file,
    load_project_config,
};
