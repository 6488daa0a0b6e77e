//! Study plan generation pipeline.
//!
//! gap analysis → hour allocation → phase scheduling → session scheduling,
//! then milestones and outcome simulation over the finished weeks. Each stage
//! returns a fresh value; all working state is local to one call.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate};

use crate::allocator::HourAllocator;
use crate::config::PlannerConfig;
use crate::error::{PlanError, PlanResult};
use crate::gap::GapAnalyzer;
use crate::milestones::MilestoneGenerator;
use crate::phase::{PhaseScheduler, WeekBreakdown};
use crate::sanitize::sanitize_snapshot;
use crate::sessions::{SessionScheduler, WeekSessions};
use crate::simulation::{plan_confidence, CancellationFlag, OutcomeSimulator};
use crate::types::{FocusArea, Phase, PlanRequest, PlanSnapshot, StudyPlan, WeeklyPlan};

const GOAL_TOPICS_PER_WEEK: usize = 2;

/// Per-invocation inputs that are not part of the request
#[derive(Debug, Clone)]
pub struct PlanContext {
    pub today: NaiveDate,
    pub seed: u64,
    pub cancel: CancellationFlag,
}

impl PlanContext {
    pub fn new(today: NaiveDate, seed: u64) -> Self {
        Self {
            today,
            seed,
            cancel: CancellationFlag::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }
}

/// Whole weeks until the exam, rounded up
pub fn weeks_until_exam(today: NaiveDate, exam_date: NaiveDate) -> i64 {
    let days = (exam_date - today).num_days();
    if days > 0 {
        (days + 6) / 7
    } else {
        -(-days / 7)
    }
}

pub struct StudyPlanner {
    config: PlannerConfig,
    simulator: OutcomeSimulator,
}

impl Default for StudyPlanner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}

impl StudyPlanner {
    pub fn new(config: PlannerConfig) -> Self {
        let simulator = OutcomeSimulator::from_config(&config);
        Self { config, simulator }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Check the request and return the number of planned weeks
    pub fn validate(&self, request: &PlanRequest, today: NaiveDate) -> PlanResult<u32> {
        if request.user_id.trim().is_empty() {
            return Err(PlanError::InvalidInput("user id is empty".to_string()));
        }
        if !request.target_score.is_finite() {
            return Err(PlanError::InvalidInput(format!(
                "target score is not finite: {}",
                request.target_score
            )));
        }

        let hours = request.available_hours_per_week;
        if hours == 0 || hours > self.config.max_hours_per_week {
            return Err(PlanError::InvalidBudget(hours));
        }

        let weeks = weeks_until_exam(today, request.exam_date);
        if weeks < 1 || weeks > self.config.max_weeks as i64 {
            return Err(PlanError::ScheduleRange { weeks });
        }

        Ok(weeks as u32)
    }

    pub fn generate_study_plan(
        &self,
        request: &PlanRequest,
        snapshot: &PlanSnapshot,
        ctx: &PlanContext,
    ) -> PlanResult<StudyPlan> {
        let total_weeks = self.validate(request, ctx.today)?;
        let snapshot = sanitize_snapshot(snapshot)?;
        let hours_per_week = request.available_hours_per_week;
        let current_score = snapshot.current_score;
        let target_score = request.target_score;

        let focus_areas = GapAnalyzer::analyze(
            &snapshot.topic_mastery,
            &snapshot.topics,
            target_score,
            current_score,
        );

        let budget = total_weeks * hours_per_week;
        let allocation = HourAllocator::allocate(&focus_areas, budget);

        let breakdowns =
            PhaseScheduler::schedule(&focus_areas, &allocation, total_weeks, hours_per_week);
        let sessions = SessionScheduler::schedule(&breakdowns, total_weeks, hours_per_week);

        let weekly_plans: Vec<WeeklyPlan> = breakdowns
            .into_iter()
            .zip(sessions)
            .map(|(breakdown, sessions)| {
                assemble_week(
                    breakdown,
                    sessions,
                    &focus_areas,
                    ctx.today,
                    total_weeks,
                    hours_per_week,
                    current_score,
                    target_score,
                )
            })
            .collect();

        let milestones = MilestoneGenerator::generate(
            &weekly_plans,
            total_weeks,
            hours_per_week,
            current_score,
            target_score,
        );

        let outcome = self.simulator.simulate(
            &weekly_plans,
            &focus_areas,
            current_score,
            total_weeks,
            ctx.seed,
            &ctx.cancel,
        )?;

        let final_progress = weekly_plans
            .last()
            .map(|w| w.expected_progress)
            .unwrap_or(target_score);
        let confidence_score = plan_confidence(&outcome.probability_range, final_progress);

        tracing::info!(
            user_id = %request.user_id,
            exam_type = %request.exam_type,
            weeks = total_weeks,
            focus_areas = focus_areas.len(),
            allocated_hours = allocation.total_hours(),
            predicted_score = outcome.predicted_score,
            confidence_score,
            "study plan generated"
        );

        Ok(StudyPlan {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: request.user_id.clone(),
            exam_type: request.exam_type.clone(),
            exam_date: request.exam_date,
            generated_on: ctx.today,
            seed: ctx.seed,
            current_score,
            target_score,
            hours_per_week,
            total_weeks,
            focus_areas,
            allocation: allocation.hours,
            weekly_plans,
            milestones,
            outcome,
            confidence_score,
            preferences: request.preferences.clone(),
            adjustments: Vec::new(),
        })
    }
}

/// Generate a plan with the default configuration
pub fn generate_study_plan(
    request: &PlanRequest,
    snapshot: &PlanSnapshot,
    ctx: &PlanContext,
) -> PlanResult<StudyPlan> {
    StudyPlanner::default().generate_study_plan(request, snapshot, ctx)
}

#[allow(clippy::too_many_arguments)]
fn assemble_week(
    breakdown: WeekBreakdown,
    sessions: WeekSessions,
    focus_areas: &[FocusArea],
    today: NaiveDate,
    total_weeks: u32,
    hours_per_week: u32,
    current_score: f64,
    target_score: f64,
) -> WeeklyPlan {
    let week = breakdown.week_number;
    let start_date = today + Duration::days(7 * (week as i64 - 1));
    let end_date = start_date + Duration::days(6);
    let expected_progress =
        current_score + (target_score - current_score) * week as f64 / total_weeks as f64;

    let names: HashMap<&str, &str> = focus_areas
        .iter()
        .map(|a| (a.topic_id.as_str(), a.topic_name.as_str()))
        .collect();

    let mut goals = vec![
        format!("Reach a practice score of {expected_progress:.0}"),
        phase_goal(breakdown.phase).to_string(),
    ];

    let mut ranked: Vec<_> = breakdown.topics.iter().collect();
    ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    for topic in ranked.into_iter().take(GOAL_TOPICS_PER_WEEK) {
        let name = names
            .get(topic.topic_id.as_str())
            .copied()
            .unwrap_or(topic.topic_id.as_str());
        goals.push(format!(
            "Raise {name} mastery to {:.2}",
            topic.mastery.expected
        ));
    }

    WeeklyPlan {
        week_number: week,
        start_date,
        end_date,
        phase: breakdown.phase,
        total_hours: hours_per_week as f64,
        topics: breakdown.topics,
        practices: sessions.practices,
        mock_exams: sessions.mock_exams,
        goals,
        expected_progress,
    }
}

fn phase_goal(phase: Phase) -> &'static str {
    match phase {
        Phase::Foundation => "Build core concepts in weak topics",
        Phase::Building => "Turn concepts into reliable skills through practice",
        Phase::Reinforcement => "Consolidate skills with mixed practice and full-length exams",
        Phase::Peak => "Simulate exam conditions and sharpen timing",
        Phase::Taper => "Review lightly and rest before the exam",
    }
}
