//! # exam-planner - exam study-plan optimizer
//!
//! Given per-topic mastery, a current and target score, a weekly hour budget
//! and an exam date, builds a week-by-week study plan and forecasts the
//! outcome.
//!
//! ## Pipeline
//!
//! - [`gap`] - focus areas from mastery gaps
//! - [`allocator`] - DP allocation of the hour budget under diminishing returns
//! - [`phase`] - per-week topic hours by preparation phase
//! - [`sessions`] - practice sessions and mock exams
//! - [`milestones`] - consistency, score and mastery checkpoints
//! - [`simulation`] - Monte Carlo outcome forecast and plan confidence
//! - [`planner`] - the pure end-to-end pipeline
//! - [`service`] - collaborator traits, data fetch and persistence hand-off
//!
//! ## Usage
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use chrono::NaiveDate;
//! use exam_planner::{generate_study_plan, PlanContext, PlanRequest, PlanSnapshot};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
//! let request = PlanRequest {
//!     user_id: "user-1".to_string(),
//!     exam_type: "GRE".to_string(),
//!     exam_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
//!     target_score: 165.0,
//!     available_hours_per_week: 10,
//!     preferences: None,
//! };
//! let snapshot = PlanSnapshot {
//!     current_score: 150.0,
//!     topic_mastery: BTreeMap::from([("Algebra".to_string(), 0.3)]),
//!     topics: BTreeMap::new(),
//! };
//!
//! let plan = generate_study_plan(&request, &snapshot, &PlanContext::new(today, 42)).unwrap();
//! assert_eq!(plan.weekly_plans.len(), 8);
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod allocator;
pub mod config;
pub mod error;
pub mod gap;
pub mod logging;
pub mod milestones;
pub mod phase;
pub mod planner;
pub mod sanitize;
pub mod service;
pub mod sessions;
pub mod simulation;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use allocator::{Allocation, HourAllocator};
pub use config::PlannerConfig;
pub use error::{PlanError, PlanResult};
pub use gap::GapAnalyzer;
pub use milestones::MilestoneGenerator;
pub use phase::{phase_for, predict_mastery, PhaseScheduler, WeekBreakdown};
pub use planner::{generate_study_plan, weeks_until_exam, PlanContext, StudyPlanner};
pub use service::{
    InMemorySources, JsonFileSink, MasterySource, PerformanceData, PerformanceSource, PlanSink,
    SnapshotFile, StudyPlanService, TopicCatalog,
};
pub use sessions::{SessionScheduler, WeekSessions};
pub use simulation::{CancellationFlag, OutcomeSimulator};
