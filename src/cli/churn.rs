//! `storyline churn` command - hottest files that still exist

use anyhow::Result;

use super::Session;
use crate::pipeline::Pipeline;
use crate::reporters::{json, text, write_output, OutputFormat};

/// Run the `storyline churn` command.
pub(super) fn run(session: &Session, format: OutputFormat) -> Result<()> {
    let entries = Pipeline::new(&session.history, &session.config).churn()?;
    let rendered = match format {
        OutputFormat::Text => text::render_churn(&entries),
        OutputFormat::Json => json::render(&entries)?,
    };
    write_output(&rendered, None)
}
