//! Gap Analysis
//!
//! Turns per-topic mastery plus the overall score gap into a ranked list of
//! focus areas.
//!
//! Unit convention: 100 score points ≈ 1.0 mastery point, so
//! `target = min(0.95, mastery + score_gap / 100)`.
//!
//! A non-positive score gap keeps every target at or below current mastery,
//! so such a request yields no focus areas and a maintenance-only plan.

use std::collections::BTreeMap;

use crate::types::{
    FocusArea, Strategy, TopicInfo, FOCUS_GAP_THRESHOLD, HOURS_PER_MASTERY_POINT, MAX_MASTERY,
    SCORE_POINTS_PER_MASTERY,
};

pub struct GapAnalyzer;

impl GapAnalyzer {
    /// Rank topics whose mastery gap exceeds the focus threshold, by
    /// improvement potential descending. Ties keep topic-id order.
    pub fn analyze(
        topic_mastery: &BTreeMap<String, f64>,
        topics: &BTreeMap<String, TopicInfo>,
        target_score: f64,
        current_score: f64,
    ) -> Vec<FocusArea> {
        let score_gap = target_score - current_score;

        let mut areas: Vec<FocusArea> = topic_mastery
            .iter()
            .filter_map(|(topic_id, &mastery)| {
                let target_mastery =
                    (mastery + score_gap / SCORE_POINTS_PER_MASTERY).min(MAX_MASTERY);
                let gap = target_mastery - mastery;
                if gap <= FOCUS_GAP_THRESHOLD {
                    return None;
                }

                let info = topics
                    .get(topic_id)
                    .cloned()
                    .unwrap_or_else(|| TopicInfo::fallback(topic_id));

                Some(FocusArea {
                    topic_id: topic_id.clone(),
                    topic_name: info.name,
                    current_mastery: mastery,
                    target_mastery,
                    improvement_potential: gap * info.weight,
                    time_required: gap * HOURS_PER_MASTERY_POINT,
                    strategy: Strategy::from_gap(gap),
                })
            })
            .collect();

        areas.sort_by(|a, b| b.improvement_potential.total_cmp(&a.improvement_potential));

        tracing::debug!(
            topics = topic_mastery.len(),
            focus_areas = areas.len(),
            score_gap,
            "gap analysis complete"
        );

        areas
    }
}
