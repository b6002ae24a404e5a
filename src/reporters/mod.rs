//! Output reporters for Storyline results
//!
//! Supports two output formats:
//! - `text` - Terminal summaries with colors
//! - `json` - The full report records, camelCase, for the visualizations

pub mod json;
pub mod text;

use anyhow::{anyhow, Context, Result};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(anyhow!("Unknown format '{}'. Valid formats: text, json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Write rendered output to `path`, or to stdout when no path is given.
///
/// Parent directories are created as needed.
pub fn write_output(content: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::{
        ActivityMetrics, CategoryLegend, DateRange, FileStatus, Frame, FrameEntry, GraveyardEntry,
        Milestone, RaceReport, RaceSettings, RaceSummary,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn day(s: &str) -> NaiveDate {
        s.parse().expect("date")
    }

    /// Create a minimal RaceReport for testing
    pub(crate) fn test_report() -> RaceReport {
        let frame = Frame {
            date: day("2021-03-01"),
            files: vec![FrameEntry {
                path: "js/services/api.js".into(),
                name: "api.js".into(),
                lines: 120,
                category: "service".into(),
                color: "#22c55e".into(),
                status: FileStatus::Active,
            }],
            total_files: 1,
            total_lines: 120,
            activity: ActivityMetrics {
                commits_in_window: 6,
                daily_rate: 0.2,
                debt_commits: 1,
            },
        };
        let mut categories = BTreeMap::new();
        categories.insert(
            "service".to_string(),
            CategoryLegend {
                color: "#22c55e".into(),
            },
        );

        RaceReport {
            generated_at: Utc.with_ymd_and_hms(2021, 3, 2, 12, 0, 0).single().unwrap_or_default(),
            config: RaceSettings {
                top_n: 30,
                total_frames: 1,
            },
            summary: RaceSummary {
                date_range: DateRange {
                    start: Some(day("2021-03-01")),
                    end: Some(day("2021-03-01")),
                },
                total_files_tracked: 2,
                deleted_files: 1,
            },
            categories,
            frames: vec![frame],
            milestones: vec![Milestone {
                kind: "service_layer".into(),
                title: "Service Layer Emerges".into(),
                subtitle: None,
                description: "Business logic moves to services".into(),
                date: day("2021-03-01"),
                hash: None,
                message: None,
            }],
            graveyard: vec![GraveyardEntry {
                path: "js/old.js".into(),
                category: "other".into(),
                created: Some(day("2021-01-01")),
                deleted: day("2021-02-01"),
            }],
        }
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!(OutputFormat::from_str("text").expect("text"), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("JSON").expect("json"), OutputFormat::Json);
        assert!(OutputFormat::from_str("sarif").is_err());
        assert_eq!(OutputFormat::Json.to_string(), "json");
    }

    #[test]
    fn test_write_output_creates_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out").join("race.json");
        write_output("{}", Some(&path)).expect("write");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "{}");
    }
}
