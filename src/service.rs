//! Calling layer around the pure planner.
//!
//! Fetches the learner snapshot from external collaborators, runs the
//! pipeline and hands the finished plan to a sink. Persistence is
//! fire-and-forget: a failed save is logged and the plan is still returned.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::planner::{PlanContext, StudyPlanner};
use crate::simulation::CancellationFlag;
use crate::types::{PlanRequest, PlanSnapshot, StudyPlan, TopicInfo};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceData {
    pub current_score: f64,
}

pub trait PerformanceSource: Send + Sync {
    fn performance(&self, user_id: &str) -> PlanResult<PerformanceData>;
}

pub trait MasterySource: Send + Sync {
    fn topic_mastery(&self, user_id: &str, exam_type: &str) -> PlanResult<BTreeMap<String, f64>>;
}

pub trait TopicCatalog: Send + Sync {
    fn topic_info(&self, topic_id: &str) -> Option<TopicInfo>;
}

pub trait PlanSink: Send + Sync {
    fn save_plan(&self, plan: &StudyPlan) -> PlanResult<()>;
}

fn unavailable(source: &str, err: PlanError) -> PlanError {
    match err {
        PlanError::DataUnavailable(_) => err,
        other => PlanError::DataUnavailable(format!("{source}: {other}")),
    }
}

/// Seed from the clock, for callers that did not configure one
fn clock_seed() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(42)
}

pub struct StudyPlanService {
    planner: StudyPlanner,
    performance: Arc<dyn PerformanceSource>,
    mastery: Arc<dyn MasterySource>,
    catalog: Arc<dyn TopicCatalog>,
    sink: Option<Arc<dyn PlanSink>>,
}

impl StudyPlanService {
    pub fn new(
        planner: StudyPlanner,
        performance: Arc<dyn PerformanceSource>,
        mastery: Arc<dyn MasterySource>,
        catalog: Arc<dyn TopicCatalog>,
    ) -> Self {
        Self {
            planner,
            performance,
            mastery,
            catalog,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn PlanSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Fetch everything the planner needs for `request`
    pub fn fetch_snapshot(&self, request: &PlanRequest) -> PlanResult<PlanSnapshot> {
        let performance = self
            .performance
            .performance(&request.user_id)
            .map_err(|e| unavailable("performance", e))?;

        let topic_mastery = self
            .mastery
            .topic_mastery(&request.user_id, &request.exam_type)
            .map_err(|e| unavailable("topic mastery", e))?;

        let topics = topic_mastery
            .keys()
            .map(|topic_id| {
                let info = self.catalog.topic_info(topic_id).unwrap_or_else(|| {
                    tracing::warn!(
                        topic_id = %topic_id,
                        "topic missing from catalog, using defaults"
                    );
                    TopicInfo::fallback(topic_id)
                });
                (topic_id.clone(), info)
            })
            .collect();

        Ok(PlanSnapshot {
            current_score: performance.current_score,
            topic_mastery,
            topics,
        })
    }

    /// Generate a plan dated `today`, seeded from config or the clock
    pub fn generate(&self, request: &PlanRequest, today: NaiveDate) -> PlanResult<StudyPlan> {
        let seed = self.planner.config().seed.unwrap_or_else(clock_seed);
        self.generate_with_context(request, &PlanContext::new(today, seed))
    }

    pub fn generate_with_cancel(
        &self,
        request: &PlanRequest,
        today: NaiveDate,
        cancel: CancellationFlag,
    ) -> PlanResult<StudyPlan> {
        let seed = self.planner.config().seed.unwrap_or_else(clock_seed);
        self.generate_with_context(request, &PlanContext::new(today, seed).with_cancel(cancel))
    }

    pub fn generate_with_context(
        &self,
        request: &PlanRequest,
        ctx: &PlanContext,
    ) -> PlanResult<StudyPlan> {
        let snapshot = self.fetch_snapshot(request)?;
        let plan = self.planner.generate_study_plan(request, &snapshot, ctx)?;

        if let Some(sink) = &self.sink {
            if let Err(err) = sink.save_plan(&plan) {
                tracing::warn!(
                    error = %err,
                    plan_id = %plan.id,
                    user_id = %plan.user_id,
                    "failed to persist study plan"
                );
            }
        }

        Ok(plan)
    }
}

// ============================================================================
// In-memory and file-backed collaborators
// ============================================================================

/// Collaborators served from memory, keyed by user (and exam type for mastery)
#[derive(Debug, Clone, Default)]
pub struct InMemorySources {
    scores: HashMap<String, f64>,
    mastery: HashMap<(String, String), BTreeMap<String, f64>>,
    topics: HashMap<String, TopicInfo>,
}

impl InMemorySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(mut self, user_id: &str, current_score: f64) -> Self {
        self.scores.insert(user_id.to_string(), current_score);
        self
    }

    pub fn with_mastery(
        mut self,
        user_id: &str,
        exam_type: &str,
        mastery: BTreeMap<String, f64>,
    ) -> Self {
        self.mastery
            .insert((user_id.to_string(), exam_type.to_string()), mastery);
        self
    }

    pub fn with_topic(mut self, topic_id: &str, info: TopicInfo) -> Self {
        self.topics.insert(topic_id.to_string(), info);
        self
    }

    pub fn from_snapshot_file(file: &SnapshotFile) -> Self {
        let mut sources = Self::new()
            .with_score(&file.request.user_id, file.current_score)
            .with_mastery(
                &file.request.user_id,
                &file.request.exam_type,
                file.topic_mastery.clone(),
            );
        for (topic_id, info) in &file.topics {
            sources = sources.with_topic(topic_id, info.clone());
        }
        sources
    }
}

impl PerformanceSource for InMemorySources {
    fn performance(&self, user_id: &str) -> PlanResult<PerformanceData> {
        self.scores
            .get(user_id)
            .map(|&current_score| PerformanceData { current_score })
            .ok_or_else(|| PlanError::DataUnavailable(format!("no performance data for {user_id}")))
    }
}

impl MasterySource for InMemorySources {
    fn topic_mastery(&self, user_id: &str, exam_type: &str) -> PlanResult<BTreeMap<String, f64>> {
        self.mastery
            .get(&(user_id.to_string(), exam_type.to_string()))
            .cloned()
            .ok_or_else(|| {
                PlanError::DataUnavailable(format!("no mastery data for {user_id} / {exam_type}"))
            })
    }
}

impl TopicCatalog for InMemorySources {
    fn topic_info(&self, topic_id: &str) -> Option<TopicInfo> {
        self.topics.get(topic_id).cloned()
    }
}

/// JSON input accepted by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotFile {
    pub request: PlanRequest,
    pub current_score: f64,
    pub topic_mastery: BTreeMap<String, f64>,
    #[serde(default)]
    pub topics: BTreeMap<String, TopicInfo>,
}

/// Writes each saved plan as pretty JSON to a fixed path
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl PlanSink for JsonFileSink {
    fn save_plan(&self, plan: &StudyPlan) -> PlanResult<()> {
        let json = serde_json::to_string_pretty(plan)
            .map_err(|e| PlanError::Persistence(format!("serialize: {e}")))?;
        std::fs::write(&self.path, json)
            .map_err(|e| PlanError::Persistence(format!("{}: {e}", self.path.display())))?;
        tracing::debug!(path = %self.path.display(), plan_id = %plan.id, "study plan written");
        Ok(())
    }
}
