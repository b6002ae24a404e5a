//! `storyline milestones` command - frame milestones, phases, directories

use anyhow::Result;
use serde::Serialize;

use super::{progress_bar, track, Session};
use crate::models::Milestone;
use crate::pipeline::{Pipeline, Progress};
use crate::reporters::{json, text, write_output, OutputFormat};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MilestoneListing {
    milestones: Vec<Milestone>,
    architecture_phases: Vec<Milestone>,
    directory_milestones: Vec<Milestone>,
}

/// Run the `storyline milestones` command.
pub(super) fn run(session: &Session, format: OutputFormat) -> Result<()> {
    let bar = progress_bar(session.quiet);
    let on_progress = |event: Progress| track(&bar, event);
    let pipeline = Pipeline::new(&session.history, &session.config).with_progress(&on_progress);

    let race = pipeline.race()?;
    let commits = pipeline.commits()?;
    let (phases, directories) = pipeline.phases(&commits)?;
    bar.finish_and_clear();

    let listing = MilestoneListing {
        milestones: race.milestones,
        architecture_phases: phases,
        directory_milestones: directories,
    };

    let rendered = match format {
        OutputFormat::Json => json::render(&listing)?,
        OutputFormat::Text => [
            text::render_milestones("MILESTONES", &listing.milestones),
            text::render_milestones("PHASES", &listing.architecture_phases),
            text::render_milestones("DIRECTORIES", &listing.directory_milestones),
        ]
        .join("\n"),
    };
    write_output(&rendered, None)
}
