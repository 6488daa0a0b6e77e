//! Data Sanitization
//!
//! Numerical stability utilities.
//!
//! Functions:
//! - Non-finite mastery lookup
//! - Mastery clamping
//! - Snapshot validation
//! - Guarded division

use std::collections::BTreeMap;

use crate::error::PlanError;
use crate::types::{PlanSnapshot, EPSILON};

/// First topic (in id order) whose mastery is NaN or infinite
pub fn first_non_finite(topic_mastery: &BTreeMap<String, f64>) -> Option<&str> {
    topic_mastery
        .iter()
        .find(|(_, m)| !m.is_finite())
        .map(|(topic_id, _)| topic_id.as_str())
}

/// Clamp a mastery estimate to [0, 1]
pub fn sanitize_mastery(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Divide, returning `None` when the denominator is (close to) zero or the result is not finite
pub fn safe_ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.abs() < EPSILON {
        return None;
    }
    let ratio = numerator / denominator;
    ratio.is_finite().then_some(ratio)
}

/// Clamp a score-like factor into [0, 1], mapping NaN to 0
pub fn unit_interval(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Validate a fetched snapshot and return a copy with mastery clamped to [0, 1]
pub fn sanitize_snapshot(snapshot: &PlanSnapshot) -> Result<PlanSnapshot, PlanError> {
    if !snapshot.current_score.is_finite() {
        return Err(PlanError::InvalidInput(format!(
            "current score is not finite: {}",
            snapshot.current_score
        )));
    }

    if let Some(topic_id) = first_non_finite(&snapshot.topic_mastery) {
        return Err(PlanError::InvalidInput(format!(
            "mastery for topic {topic_id} is not finite"
        )));
    }

    let mut topic_mastery = BTreeMap::new();
    for (topic_id, &mastery) in &snapshot.topic_mastery {
        let clamped = sanitize_mastery(mastery);
        if clamped != mastery {
            tracing::warn!(topic_id = %topic_id, mastery, "mastery outside [0, 1], clamping");
        }
        topic_mastery.insert(topic_id.clone(), clamped);
    }

    let mut topics = BTreeMap::new();
    for (topic_id, info) in &snapshot.topics {
        let mut info = info.clone();
        if !info.weight.is_finite() || info.weight < 0.0 {
            tracing::warn!(
                topic_id = %topic_id,
                weight = info.weight,
                "invalid topic weight, using 1.0"
            );
            info.weight = 1.0;
        }
        topics.insert(topic_id.clone(), info);
    }

    Ok(PlanSnapshot {
        current_score: snapshot.current_score,
        topic_mastery,
        topics,
    })
}
