//! Reconstruction pipeline
//!
//! Orchestrates the full reconstruction against one history gateway:
//! 1. Discover the tracked universe and its lifecycles
//! 2. Sample reference dates
//! 3. Reconstruct snapshots and build frames
//! 4. Latch milestones over the frames
//!
//! The timeline report runs the independent branches: commit stats, phase
//! and directory detection over the commit stream, churn and the file tree.

use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::StorylineConfig;
use crate::detectors::{MilestoneDetector, PhaseDetector};
use crate::git::HistoryGateway;
use crate::models::{
    CategoryLegend, ChurnEntry, CommitStats, DateRange, Milestone, RaceReport, RaceSettings,
    RaceSummary, RepositoryInfo, TimelineReport, TimelineSummary,
};
use crate::timeline::stats::{
    commits_with_stats, file_creation_timeline, key_file_evolution, monthly_stats,
};
use crate::timeline::{
    discover, sample_dates, top_churn, track_lifecycles, DirNode, FileUniverse, FrameBuilder,
    SnapshotReconstructor,
};

/// Progress notifications emitted while a report is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// A named stage started
    Stage(&'static str),
    /// Frame reconstruction is about to process this many dates
    FramesPlanned(usize),
    /// One sampled date was processed
    FrameDone,
}

/// Full reconstruction pipeline over one gateway.
pub struct Pipeline<'a, G: HistoryGateway + ?Sized> {
    gateway: &'a G,
    config: &'a StorylineConfig,
    progress: Option<&'a dyn Fn(Progress)>,
}

impl<'a, G: HistoryGateway + ?Sized> Pipeline<'a, G> {
    pub fn new(gateway: &'a G, config: &'a StorylineConfig) -> Self {
        Self {
            gateway,
            config,
            progress: None,
        }
    }

    /// Report progress to a callback (used for progress bars).
    pub fn with_progress(mut self, progress: &'a dyn Fn(Progress)) -> Self {
        self.progress = Some(progress);
        self
    }

    fn report(&self, event: Progress) {
        if let Some(progress) = self.progress {
            progress(event);
        }
    }

    /// Discover the tracked universe and resolve every lifecycle.
    pub fn universe(&self) -> Result<FileUniverse> {
        self.report(Progress::Stage("Discovering files"));
        let paths = discover(self.gateway, &self.config.race.extensions)
            .context("Failed to discover tracked files")?;
        info!("Found {} tracked files", paths.len());

        self.report(Progress::Stage("Resolving lifecycles"));
        let classifier = self.config.category_classifier();
        let universe = track_lifecycles(self.gateway, &paths, &classifier)
            .context("Failed to resolve file lifecycles")?;
        info!("Found {} deleted files", universe.deleted_count());
        Ok(universe)
    }

    /// Build the racing bar chart report.
    pub fn race(&self) -> Result<RaceReport> {
        let dates = self
            .gateway
            .dates_with_activity()
            .context("Failed to list commit dates")?;
        info!("Found {} unique dates", dates.len());

        let universe = self.universe()?;
        let sampled = sample_dates(&dates, self.config.race.max_frames);
        self.report(Progress::FramesPlanned(sampled.len()));

        let debt_filter = self.config.debt_filter();
        let milestone_rules = self.config.milestone_rules();
        let mut reconstructor = SnapshotReconstructor::new(self.gateway, &universe);
        let mut builder = FrameBuilder::new(
            self.gateway,
            &universe,
            self.config.race.top_n,
            self.config.activity.window_days,
            &debt_filter,
        );
        let mut detector = MilestoneDetector::new(&milestone_rules, &universe);

        let mut frames = Vec::with_capacity(sampled.len());
        for date in sampled {
            let snapshot = reconstructor
                .snapshot_at(date)
                .with_context(|| format!("Failed to reconstruct snapshot at {date}"))?;
            if let Some(snapshot) = snapshot {
                let frame = builder
                    .build(&snapshot)
                    .with_context(|| format!("Failed to build frame at {date}"))?;
                detector.observe(&frame, &snapshot);
                frames.push(frame);
            }
            self.report(Progress::FrameDone);
        }

        let cache = reconstructor.cache_stats();
        debug!(
            "Snapshot memo: {} hits, {} misses",
            cache.hits, cache.misses
        );

        let milestones = detector.finish();
        info!("Built {} frames, {} milestones", frames.len(), milestones.len());

        let categories: BTreeMap<String, CategoryLegend> = self
            .config
            .category_classifier()
            .rules()
            .iter()
            .map(|rule| {
                (
                    rule.name.clone(),
                    CategoryLegend {
                        color: rule.color.clone(),
                    },
                )
            })
            .collect();

        Ok(RaceReport {
            generated_at: Utc::now(),
            config: RaceSettings {
                top_n: self.config.race.top_n,
                total_frames: frames.len(),
            },
            summary: RaceSummary {
                date_range: DateRange {
                    start: frames.first().map(|f| f.date),
                    end: frames.last().map(|f| f.date),
                },
                total_files_tracked: universe.len(),
                deleted_files: universe.deleted_count(),
            },
            categories,
            milestones,
            graveyard: universe.graveyard(),
            frames,
        })
    }

    /// Hot files that still exist.
    pub fn churn(&self) -> Result<Vec<ChurnEntry>> {
        self.report(Progress::Stage("Counting churn"));
        top_churn(self.gateway, self.config.churn_options()).context("Failed to count churn")
    }

    /// Commits (newest first) with their file changes.
    pub fn commits(&self) -> Result<Vec<CommitStats>> {
        self.report(Progress::Stage("Reading commits"));
        commits_with_stats(self.gateway).context("Failed to read commit history")
    }

    /// Architecture phases and directory milestones over the commit stream.
    pub fn phases(&self, commits: &[CommitStats]) -> Result<(Vec<Milestone>, Vec<Milestone>)> {
        self.report(Progress::Stage("Detecting phases"));
        let classifier = self.config.category_classifier();
        let debt_filter = self.config.debt_filter();
        let phase_rules = self.config.phase_rules();
        let directory_rules = self.config.directory_rules();
        let window = self.config.activity.window_days;

        let mut phases = PhaseDetector::new(&phase_rules, &classifier, &debt_filter, window);
        let mut directories =
            PhaseDetector::new(&directory_rules, &classifier, &debt_filter, window);

        for stats in commits.iter().rev() {
            phases
                .observe(self.gateway, &stats.commit, stats.changes())
                .with_context(|| format!("Failed to evaluate commit {}", stats.commit.hash))?;
            directories
                .observe(self.gateway, &stats.commit, stats.changes())
                .with_context(|| format!("Failed to evaluate commit {}", stats.commit.hash))?;
        }

        let phases = phases.finish();
        let directories = directories.finish();
        info!(
            "Detected {} phases, {} directory milestones",
            phases.len(),
            directories.len()
        );
        Ok((phases, directories))
    }

    /// Build the commit timeline report.
    pub fn timeline(&self, repository: &str) -> Result<TimelineReport> {
        let commits = self.commits()?;
        info!("Found {} commits", commits.len());

        self.report(Progress::Stage("Tracking key files"));
        let file_evolution =
            key_file_evolution(self.gateway, &commits, &self.config.timeline.key_files)
                .context("Failed to track key files")?;

        let (architecture_phases, directory_milestones) = self.phases(&commits)?;
        let monthly = monthly_stats(&commits);
        let top_churn_files = self.churn()?;

        self.report(Progress::Stage("Capturing file tree"));
        let current = self
            .gateway
            .current_paths()
            .context("Failed to list current files")?;
        let file_tree = DirNode::from_paths(current.iter().map(String::as_str));

        let creations = file_creation_timeline(&commits);

        let summary = TimelineSummary {
            total_commits: commits.len(),
            date_range: DateRange {
                start: commits.last().map(|c| c.commit.date),
                end: commits.first().map(|c| c.commit.date),
            },
            total_lines_added: commits.iter().map(|c| c.insertions).sum(),
            total_lines_deleted: commits.iter().map(|c| c.deletions).sum(),
            total_files_created: creations.len(),
        };

        Ok(TimelineReport {
            generated_at: Utc::now(),
            repository: RepositoryInfo {
                name: repository.to_string(),
            },
            summary,
            commits,
            file_evolution,
            directory_milestones,
            monthly_stats: monthly,
            architecture_phases,
            top_churn_files,
            file_tree,
            file_creation_timeline: creations,
        })
    }
}
