//! Common Types and Constants
//!
//! Shared data structures used across all planning stages.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Mastery ceiling for targets and projections
pub const MAX_MASTERY: f64 = 0.95;

/// Minimum mastery gap for a topic to become a focus area
pub const FOCUS_GAP_THRESHOLD: f64 = 0.1;

/// Score points that correspond to one full mastery point
pub const SCORE_POINTS_PER_MASTERY: f64 = 100.0;

/// Hours needed to close one full mastery point
pub const HOURS_PER_MASTERY_POINT: f64 = 50.0;

/// Learning rate of the weekly mastery projection
pub const MASTERY_LEARNING_RATE: f64 = 0.05;

/// Share of the weekly budget spent in practice sessions
pub const PRACTICE_SHARE: f64 = 0.6;

/// Numerical stability epsilon
pub const EPSILON: f64 = 1e-10;

// ==================== Request Types ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStyle {
    Visual,
    Auditory,
    Kinesthetic,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionLength {
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
    Flexible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyPreference {
    Challenging,
    Balanced,
    Comfortable,
}

/// Learner preferences, passed through untouched for material selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_style: Option<StudyStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_length: Option<SessionLength>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyPreference>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub user_id: String,
    pub exam_type: String,
    pub exam_date: NaiveDate,
    pub target_score: f64,
    pub available_hours_per_week: u32,
    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// Topic metadata from the content catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicInfo {
    pub name: String,
    pub weight: f64,
}

impl TopicInfo {
    /// Fallback used when the catalog has no entry for a topic
    pub fn fallback(topic_id: &str) -> Self {
        Self {
            name: topic_id.to_string(),
            weight: 1.0,
        }
    }
}

/// Everything the pure pipeline needs, fetched up front by the caller
#[derive(Debug, Clone)]
pub struct PlanSnapshot {
    pub current_score: f64,
    pub topic_mastery: BTreeMap<String, f64>,
    pub topics: BTreeMap<String, TopicInfo>,
}

// ==================== Focus Areas ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Intensive,
    Focused,
    Maintenance,
}

impl Strategy {
    /// Strategy implied by a mastery gap
    pub fn from_gap(gap: f64) -> Self {
        if gap > 0.4 {
            Self::Intensive
        } else if gap > 0.2 {
            Self::Focused
        } else {
            Self::Maintenance
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusArea {
    pub topic_id: String,
    pub topic_name: String,
    pub current_mastery: f64,
    pub target_mastery: f64,
    /// Expected score points per unit of mastery gained
    pub improvement_potential: f64,
    /// Hours to close the gap
    pub time_required: f64,
    pub strategy: Strategy,
}

impl FocusArea {
    pub fn gap(&self) -> f64 {
        self.target_mastery - self.current_mastery
    }
}

// ==================== Phases ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Foundation,
    Building,
    Reinforcement,
    Peak,
    Taper,
}

/// Share of study hours spent on concept, practice and review
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseWeights {
    pub concept: f64,
    pub practice: f64,
    pub review: f64,
}

/// Session-type shares of the weekly practice hours
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionMix {
    pub adaptive: f64,
    pub targeted: f64,
    pub mixed: f64,
    pub timed: f64,
}

// ==================== Weekly Plan Types ====================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasteryProjection {
    pub current: f64,
    pub target: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StudySplit {
    pub concept: f64,
    pub practice: f64,
    pub review: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAllocation {
    pub topic_id: String,
    pub hours: f64,
    pub priority: f64,
    pub mastery: MasteryProjection,
    pub split: StudySplit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    Adaptive,
    Targeted,
    Mixed,
    Timed,
}

impl SessionType {
    /// Questions answered per hour of practice
    pub fn questions_per_hour(&self) -> f64 {
        match self {
            Self::Adaptive => 40.0,
            Self::Targeted => 35.0,
            Self::Mixed => 40.0,
            Self::Timed => 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeSession {
    pub session_type: SessionType,
    pub topics: Vec<String>,
    pub hours: f64,
    pub question_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_accuracy: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockExamType {
    Diagnostic,
    Section,
    Full,
}

impl MockExamType {
    pub fn duration_minutes(&self) -> u32 {
        match self {
            Self::Diagnostic => 120,
            Self::Section => 60,
            Self::Full => 180,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockExam {
    pub exam_type: MockExamType,
    pub is_final: bool,
    pub duration_minutes: u32,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    pub week_number: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub phase: Phase,
    pub total_hours: f64,
    pub topics: Vec<TopicAllocation>,
    pub practices: Vec<PracticeSession>,
    pub mock_exams: Vec<MockExam>,
    pub goals: Vec<String>,
    pub expected_progress: f64,
}

impl WeeklyPlan {
    pub fn allocated_hours(&self) -> f64 {
        self.topics.iter().map(|t| t.hours).sum()
    }
}

// ==================== Milestones ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneType {
    Consistency,
    Score,
    Mastery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Importance {
    Critical,
    Important,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub week_number: u32,
    #[serde(rename = "type")]
    pub milestone_type: MilestoneType,
    pub target: f64,
    pub description: String,
    pub importance: Importance,
}

// ==================== Outcome ====================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityRange {
    pub min: f64,
    pub median: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub predicted_score: f64,
    pub confidence: f64,
    pub probability_range: ProbabilityRange,
    pub strengths: Vec<String>,
    pub risks: Vec<String>,
}

// ==================== Study Plan ====================

/// Post-generation plan change; reserved for adaptive adjustment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanAdjustment {
    pub week_number: u32,
    pub reason: String,
    pub changes: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub id: String,
    pub user_id: String,
    pub exam_type: String,
    pub exam_date: NaiveDate,
    pub generated_on: NaiveDate,
    pub seed: u64,
    pub current_score: f64,
    pub target_score: f64,
    pub hours_per_week: u32,
    pub total_weeks: u32,
    pub focus_areas: Vec<FocusArea>,
    pub allocation: BTreeMap<String, u32>,
    pub weekly_plans: Vec<WeeklyPlan>,
    pub milestones: Vec<Milestone>,
    pub outcome: Outcome,
    pub confidence_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
    #[serde(default)]
    pub adjustments: Vec<PlanAdjustment>,
}
