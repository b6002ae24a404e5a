//! Storyline - reconstruct how a codebase grew from its git history
//!
//! Replays a repository's commits to rebuild per-file line counts over time
//! (including files that were later deleted), rolling commit velocity, and
//! the first appearance of architectural milestones.
//!
//! The reconstruction core reads history only through
//! [`git::HistoryGateway`], so it runs the same against a real repository
//! ([`git::GitHistory`]) or a scripted one ([`git::MemoryHistory`]).

pub mod classifier;
pub mod cli;
pub mod config;
pub mod detectors;
pub mod git;
pub mod models;
pub mod pipeline;
pub mod reporters;
pub mod timeline;
