//! `storyline timeline` command - commit timeline report

use anyhow::Result;
use console::style;
use std::path::Path;

use super::{progress_bar, track, Session};
use crate::pipeline::{Pipeline, Progress};
use crate::reporters::{json, text, write_output};

/// Run the `storyline timeline` command.
pub(super) fn run(session: &Session, output: Option<&Path>) -> Result<()> {
    let bar = progress_bar(session.quiet);
    let on_progress = |event: Progress| track(&bar, event);
    let report = Pipeline::new(&session.history, &session.config)
        .with_progress(&on_progress)
        .timeline(&session.history.repo_name())?;
    bar.finish_and_clear();

    write_output(&json::render(&report)?, output)?;

    if let Some(path) = output {
        if !session.quiet {
            print!("{}", text::render_timeline(&report));
            println!(
                "\n{}Wrote {}",
                style("✓ ").green(),
                style(path.display()).cyan()
            );
        }
    }
    Ok(())
}
