//! `storyline race` command - racing bar chart report

use anyhow::Result;
use console::style;
use std::path::Path;

use super::{progress_bar, track, Session};
use crate::config::StorylineConfig;
use crate::pipeline::{Pipeline, Progress};
use crate::reporters::{json, text, write_output};

/// Apply `--top` / `--max-frames` on top of the loaded config.
pub(super) fn apply_overrides(config: &mut StorylineConfig, top: Option<usize>, max_frames: Option<usize>) {
    if let Some(top) = top {
        config.race.top_n = top;
    }
    if let Some(max_frames) = max_frames {
        config.race.max_frames = max_frames;
    }
    config.normalize();
}

/// Run the `storyline race` command.
pub(super) fn run(session: &Session, output: Option<&Path>) -> Result<()> {
    let bar = progress_bar(session.quiet);
    let on_progress = |event: Progress| track(&bar, event);
    let report = Pipeline::new(&session.history, &session.config)
        .with_progress(&on_progress)
        .race()?;
    bar.finish_and_clear();

    let rendered = json::render(&report)?;
    write_output(&rendered, output)?;

    if let Some(path) = output {
        if !session.quiet {
            print!("{}", text::render_race(&report));
            println!(
                "\n{}Wrote {}",
                style("✓ ").green(),
                style(path.display()).cyan()
            );
        }
    }
    Ok(())
}
