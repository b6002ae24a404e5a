//! CLI command definitions and handlers

mod churn;
mod init;
mod milestones;
mod race;
mod timeline;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{load_config_file, load_project_config, StorylineConfig};
use crate::git::GitHistory;
use crate::pipeline::Progress;

/// Storyline - reconstruct how a codebase grew from its git history
#[derive(Parser, Debug)]
#[command(name = "storyline")]
#[command(
    version,
    about = "Reconstruct a codebase's evolution from git history: racing file sizes, velocity and architecture milestones",
    long_about = "Storyline replays a repository's history to rebuild per-file line counts over \
time (including files later deleted), rolling commit velocity, and the first appearance \
of architectural milestones such as a service layer or a test suite.\n\n\
Run without a subcommand to build the race report for the current directory:\n  \
storyline .",
    after_help = "\
Examples:
  storyline .                              Race report JSON on stdout
  storyline race -o race.json              Write the race report, print a summary
  storyline timeline -o timeline.json      Commit timeline, phases and churn
  storyline churn --limit 10               Hottest files that still exist
  storyline milestones                     Detected milestones and phases
  storyline init                           Write an example storyline.toml"
)]
pub struct Cli {
    /// Path to repository (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Configuration file (default: storyline.toml in the repository)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hide progress bars and summaries
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a storyline.toml config file with example settings
    Init,

    /// Build the racing bar chart report (frames, milestones, graveyard)
    Race {
        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Active files shown per frame
        #[arg(long)]
        top: Option<usize>,

        /// Target number of frames
        #[arg(long)]
        max_frames: Option<usize>,
    },

    /// Build the commit timeline report (commits, phases, churn, file tree)
    Timeline {
        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Number of hot files to include
        #[arg(long)]
        churn_limit: Option<usize>,
    },

    /// Show the most frequently changed files that still exist
    Churn {
        /// Maximum files to show
        #[arg(long)]
        limit: Option<usize>,

        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Show detected milestones, phases and directory milestones
    Milestones {
        /// Output format: text, json
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

/// An opened repository with its effective configuration.
pub(crate) struct Session {
    pub history: GitHistory,
    pub config: StorylineConfig,
    pub quiet: bool,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let repo_path = cli
            .path
            .canonicalize()
            .with_context(|| format!("Path does not exist: {}", cli.path.display()))?;

        let config = match &cli.config {
            Some(path) => load_config_file(path)?,
            None => load_project_config(&repo_path),
        };
        debug!("Effective config: {:?}", config);

        let history = GitHistory::open(&repo_path)
            .with_context(|| format!("Cannot read git history at {}", repo_path.display()))?;

        Ok(Self {
            history,
            config,
            quiet: cli.quiet,
        })
    }
}

pub(crate) fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

pub(crate) fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Progress bar on stderr, or a hidden one in quiet mode.
pub(crate) fn progress_bar(quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    bar.set_style(create_spinner_style());
    bar.enable_steady_tick(std::time::Duration::from_millis(100));
    bar
}

/// Drive `bar` from pipeline progress events.
pub(crate) fn track(bar: &ProgressBar, event: Progress) {
    match event {
        Progress::Stage(stage) => bar.set_message(stage),
        Progress::FramesPlanned(total) => {
            bar.set_style(create_bar_style());
            bar.set_length(total as u64);
            bar.set_position(0);
            bar.set_message("Reconstructing frames");
        }
        Progress::FrameDone => bar.inc(1),
    }
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match &cli.command {
        Some(Commands::Init) => init::run(&cli.path, cli.quiet),

        Some(Commands::Race {
            output,
            top,
            max_frames,
        }) => {
            let mut session = Session::open(&cli)?;
            race::apply_overrides(&mut session.config, *top, *max_frames);
            race::run(&session, output.as_deref())
        }

        Some(Commands::Timeline {
            output,
            churn_limit,
        }) => {
            let mut session = Session::open(&cli)?;
            if let Some(limit) = churn_limit {
                session.config.churn.limit = *limit;
            }
            timeline::run(&session, output.as_deref())
        }

        Some(Commands::Churn { limit, format }) => {
            let mut session = Session::open(&cli)?;
            if let Some(limit) = limit {
                session.config.churn.limit = *limit;
            }
            churn::run(&session, format.parse()?)
        }

        Some(Commands::Milestones { format }) => {
            let session = Session::open(&cli)?;
            milestones::run(&session, format.parse()?)
        }

        None => {
            let session = Session::open(&cli)?;
            race::run(&session, None::<&Path>)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_race() {
        let cli = Cli::try_parse_from(["storyline"]).expect("parse");
        assert!(cli.command.is_none());
        assert_eq!(cli.path, PathBuf::from("."));
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn test_race_flags() {
        let cli = Cli::try_parse_from([
            "storyline", "race", "--top", "5", "--max-frames", "20", "-o", "race.json",
        ])
        .expect("parse");
        match cli.command {
            Some(Commands::Race {
                output,
                top,
                max_frames,
            }) => {
                assert_eq!(output, Some(PathBuf::from("race.json")));
                assert_eq!(top, Some(5));
                assert_eq!(max_frames, Some(20));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["storyline", "churn", "--quiet", "--limit", "3"])
            .expect("parse");
        assert!(cli.quiet);
        assert!(matches!(cli.command, Some(Commands::Churn { limit: Some(3), .. })));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["storyline", "milestones", "--format", "xml"]).is_err());
    }
}
