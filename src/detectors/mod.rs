//! Milestone and phase detection
//!
//! Architectural events are detected by one generic latch engine driven by
//! declarative rule tables.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       LatchEngine                           │
//! │  - Compiles a RuleSpec table (kind, title, trigger)         │
//! │  - Evaluates pending rules once per evidence point          │
//! │  - Latches each rule at its first satisfying point          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Evidence Trait                          │
//! │  - category counts, anchor sizes, created paths             │
//! │  - trailing debt-commit count, commit message               │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                 ┌────────────┴────────────┐
//!                 ▼                         ▼
//! ┌──────────────────────────┐ ┌──────────────────────────────┐
//! │ MilestoneDetector        │ │ PhaseDetector                │
//! │ (sampled frames)         │ │ (raw commit stream)          │
//! └──────────────────────────┘ └──────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```no_run
//! use storyline::detectors::{default_milestone_rules, MilestoneDetector};
//! use storyline::timeline::FileUniverse;
//!
//! let universe = FileUniverse::default();
//! let detector = MilestoneDetector::new(&default_milestone_rules(), &universe);
//! // detector.observe(&frame, &snapshot) for each frame, in order
//! let milestones = detector.finish();
//! ```

pub mod engine;
pub mod milestones;
pub mod phases;
pub mod trigger;

pub use engine::{LatchEngine, RuleSpec};
pub use milestones::{default_milestone_rules, MilestoneDetector};
pub use phases::{default_directory_rules, default_phase_rules, PhaseDetector};
pub use trigger::{AnchorReading, Evidence, PathPattern, Trigger};
