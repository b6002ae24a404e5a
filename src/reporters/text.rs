//! Text (terminal) reporter with colors and formatting

use crate::models::{ChurnEntry, Milestone, RaceReport, TimelineReport};
use console::style;
use std::fmt::Write;

const RULE: &str = "──────────────────────────────────────";

fn header(out: &mut String, title: &str) {
    let _ = writeln!(out, "\n{}", style(title).bold());
    let _ = writeln!(out, "{}", style(RULE).dim());
}

fn or_dash<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Summary of a race report: range, universe size, milestones.
pub fn render_race(report: &RaceReport) -> String {
    let mut out = String::new();
    header(&mut out, "Storyline Race");

    let range = &report.summary.date_range;
    let _ = writeln!(
        out,
        "Frames: {}  Range: {} → {}",
        style(report.config.total_frames).bold(),
        or_dash(range.start),
        or_dash(range.end)
    );
    let _ = writeln!(
        out,
        "Files tracked: {}  Deleted: {}  Top N: {}",
        report.summary.total_files_tracked,
        style(report.summary.deleted_files).red(),
        report.config.top_n
    );

    if let Some(last) = report.frames.last() {
        let _ = writeln!(
            out,
            "Latest frame: {} files, {} lines, {:.1} commits/day",
            last.total_files, last.total_lines, last.activity.daily_rate
        );
    }
    out.push('\n');
    out.push_str(&render_milestones("MILESTONES", &report.milestones));
    out
}

/// Summary of a timeline report.
pub fn render_timeline(report: &TimelineReport) -> String {
    let mut out = String::new();
    header(&mut out, &format!("Storyline Timeline: {}", report.repository.name));

    let summary = &report.summary;
    let _ = writeln!(out, "Total commits: {}", style(summary.total_commits).bold());
    let _ = writeln!(
        out,
        "Date range: {} → {}",
        or_dash(summary.date_range.start.map(|d| d.date_naive())),
        or_dash(summary.date_range.end.map(|d| d.date_naive()))
    );
    let _ = writeln!(
        out,
        "Lines added: {}  Lines deleted: {}",
        style(format!("+{}", summary.total_lines_added)).green(),
        style(format!("-{}", summary.total_lines_deleted)).red()
    );
    let _ = writeln!(out, "Files created: {}", summary.total_files_created);
    let _ = writeln!(
        out,
        "Phases: {}  Directory milestones: {}  Months: {}",
        report.architecture_phases.len(),
        report.directory_milestones.len(),
        report.monthly_stats.len()
    );
    out
}

/// Hot-files table.
pub fn render_churn(entries: &[ChurnEntry]) -> String {
    let mut out = String::new();
    header(&mut out, "HOT FILES");

    if entries.is_empty() {
        let _ = writeln!(out, "{}", style("No churn recorded").dim());
        return out;
    }

    let width = entries.iter().map(|e| e.path.len()).max().unwrap_or(0).max(4);
    let _ = writeln!(
        out,
        "{}",
        style(format!("  {:>3}  {:<width$}  COMMITS", "#", "FILE")).dim()
    );
    for (i, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>3}  {:<width$}  {}",
            i + 1,
            entry.path,
            style(entry.commits).yellow()
        );
    }
    out
}

/// Dated event list under a section title.
pub fn render_milestones(title: &str, milestones: &[Milestone]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", style(title).bold(), milestones.len());
    for m in milestones {
        let _ = write!(out, "  {}  {}", style(m.date).cyan(), style(&m.title).bold());
        if let Some(subtitle) = &m.subtitle {
            let _ = write!(out, " {}", style(format!("({subtitle})")).dim());
        }
        out.push('\n');
        if let Some(hash) = &m.hash {
            let short: String = hash.chars().take(8).collect();
            let message = m.message.as_deref().unwrap_or_default();
            let _ = writeln!(out, "              {} {}", style(short).dim(), message);
        }
    }
    out
}
