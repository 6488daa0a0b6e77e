//! Phase Scheduling
//!
//! Spreads the horizon-wide allocation over weeks. Each week belongs to a
//! preparation phase determined by progress `week / total_weeks`:
//!
//! | progress | phase         |
//! |----------|---------------|
//! | ≤ 0.2    | foundation    |
//! | ≤ 0.4    | building      |
//! | ≤ 0.7    | reinforcement |
//! | ≤ 0.9    | peak          |
//! | > 0.9    | taper         |
//!
//! Weekly hours are the uniform average `total / weeks`, boosted ×1.3 for weak
//! topics in foundation and damped ×0.7 for strong topics in peak, then
//! greedily capped at the weekly budget in focus-area order.

use serde::{Deserialize, Serialize};

use crate::allocator::Allocation;
use crate::sanitize::unit_interval;
use crate::types::{
    FocusArea, MasteryProjection, Phase, PhaseWeights, SessionMix, StudySplit, TopicAllocation,
    EPSILON, MASTERY_LEARNING_RATE, MAX_MASTERY,
};

const FOUNDATION_BOOST: f64 = 1.3;
const FOUNDATION_WEAK_MASTERY: f64 = 0.3;
const PEAK_DAMPING: f64 = 0.7;
const PEAK_STRONG_MASTERY: f64 = 0.7;

/// Phase of `week` (1-based) within `total_weeks`
pub fn phase_for(week: u32, total_weeks: u32) -> Phase {
    let progress = if total_weeks == 0 {
        1.0
    } else {
        week as f64 / total_weeks as f64
    };

    if progress <= 0.2 {
        Phase::Foundation
    } else if progress <= 0.4 {
        Phase::Building
    } else if progress <= 0.7 {
        Phase::Reinforcement
    } else if progress <= 0.9 {
        Phase::Peak
    } else {
        Phase::Taper
    }
}

pub fn phase_weights(phase: Phase) -> PhaseWeights {
    let (concept, practice, review) = match phase {
        Phase::Foundation => (0.6, 0.3, 0.1),
        Phase::Building => (0.4, 0.45, 0.15),
        Phase::Reinforcement => (0.3, 0.5, 0.2),
        Phase::Peak => (0.15, 0.6, 0.25),
        Phase::Taper => (0.1, 0.5, 0.4),
    };
    PhaseWeights {
        concept,
        practice,
        review,
    }
}

pub fn session_mix(phase: Phase) -> SessionMix {
    let (adaptive, targeted, mixed, timed) = match phase {
        Phase::Foundation => (0.5, 0.3, 0.2, 0.0),
        Phase::Building => (0.4, 0.3, 0.2, 0.1),
        Phase::Reinforcement => (0.3, 0.3, 0.2, 0.2),
        Phase::Peak => (0.2, 0.2, 0.2, 0.4),
        Phase::Taper => (0.2, 0.1, 0.3, 0.4),
    };
    SessionMix {
        adaptive,
        targeted,
        mixed,
        timed,
    }
}

/// Projected mastery after `hours` of study; non-decreasing in `hours`, never above 0.95
pub fn predict_mastery(current: f64, hours: f64) -> f64 {
    let hours = hours.max(0.0);
    let gained = (MAX_MASTERY - current) * (1.0 - (-MASTERY_LEARNING_RATE * hours).exp());
    (current + gained).min(MAX_MASTERY)
}

/// Topic study hours for one week, before sessions are attached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekBreakdown {
    pub week_number: u32,
    pub phase: Phase,
    pub topics: Vec<TopicAllocation>,
}

pub struct PhaseScheduler;

impl PhaseScheduler {
    pub fn schedule(
        areas: &[FocusArea],
        allocation: &Allocation,
        total_weeks: u32,
        hours_per_week: u32,
    ) -> Vec<WeekBreakdown> {
        (1..=total_weeks)
            .map(|week| Self::schedule_week(areas, allocation, week, total_weeks, hours_per_week))
            .collect()
    }

    fn schedule_week(
        areas: &[FocusArea],
        allocation: &Allocation,
        week: u32,
        total_weeks: u32,
        hours_per_week: u32,
    ) -> WeekBreakdown {
        let phase = phase_for(week, total_weeks);
        let weights = phase_weights(phase);
        let progress = week as f64 / total_weeks.max(1) as f64;
        let mut remaining = hours_per_week as f64;
        let mut topics = Vec::new();

        for area in areas {
            let total = allocation.hours_for(&area.topic_id);
            if total == 0 {
                continue;
            }

            let mut hours = total as f64 / total_weeks.max(1) as f64;
            if phase == Phase::Foundation && area.current_mastery < FOUNDATION_WEAK_MASTERY {
                hours *= FOUNDATION_BOOST;
            }
            if phase == Phase::Peak && area.current_mastery > PEAK_STRONG_MASTERY {
                hours *= PEAK_DAMPING;
            }

            let hours = hours.min(remaining);
            if hours <= EPSILON {
                continue;
            }
            remaining -= hours;

            let priority = unit_interval(
                0.3 * (1.0 - progress) + 0.4 * area.gap() + 0.3 * area.improvement_potential,
            );

            topics.push(TopicAllocation {
                topic_id: area.topic_id.clone(),
                hours,
                priority,
                mastery: MasteryProjection {
                    current: area.current_mastery,
                    target: area.target_mastery,
                    expected: predict_mastery(area.current_mastery, hours),
                },
                split: StudySplit {
                    concept: hours * weights.concept,
                    practice: hours * weights.practice,
                    review: hours * weights.review,
                },
            });
        }

        WeekBreakdown {
            week_number: week,
            phase,
            topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strategy;
    use std::collections::BTreeMap;

    fn area(id: &str, current: f64, target: f64, potential: f64) -> FocusArea {
        FocusArea {
            topic_id: id.to_string(),
            topic_name: id.to_string(),
            current_mastery: current,
            target_mastery: target,
            improvement_potential: potential,
            time_required: (target - current) * 50.0,
            strategy: Strategy::Focused,
        }
    }

    fn allocation(entries: &[(&str, u32)]) -> Allocation {
        Allocation {
            hours: entries
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect::<BTreeMap<_, _>>(),
            total_improvement: 0.0,
        }
    }

    #[test]
    fn test_phase_boundaries() {
        assert_eq!(phase_for(2, 10), Phase::Foundation);
        assert_eq!(phase_for(3, 10), Phase::Building);
        assert_eq!(phase_for(4, 10), Phase::Building);
        assert_eq!(phase_for(7, 10), Phase::Reinforcement);
        assert_eq!(phase_for(9, 10), Phase::Peak);
        assert_eq!(phase_for(10, 10), Phase::Taper);
    }

    #[test]
    fn test_weights_sum_to_one() {
        for phase in [
            Phase::Foundation,
            Phase::Building,
            Phase::Reinforcement,
            Phase::Peak,
            Phase::Taper,
        ] {
            let w = phase_weights(phase);
            assert!((w.concept + w.practice + w.review - 1.0).abs() < 1e-9);
            let m = session_mix(phase);
            assert!((m.adaptive + m.targeted + m.mixed + m.timed - 1.0).abs() < 1e-9);
        }
        assert!(phase_weights(Phase::Foundation).concept > phase_weights(Phase::Peak).concept);
    }

    #[test]
    fn test_predict_mastery_bounds() {
        assert_eq!(predict_mastery(0.3, 0.0), 0.3);
        assert!(predict_mastery(0.3, 10.0) > 0.3);
        assert!(predict_mastery(0.3, 1e6) <= MAX_MASTERY);
        assert_eq!(predict_mastery(0.99, 5.0), MAX_MASTERY);
    }

    #[test]
    fn test_uniform_spread() {
        let areas = vec![area("Algebra", 0.5, 0.7, 0.2)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("Algebra", 20)]), 10, 10);
        assert_eq!(weeks.len(), 10);
        assert!((weeks[4].topics[0].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_foundation_boost_for_weak_topics() {
        let areas = vec![area("Algebra", 0.2, 0.5, 0.3)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("Algebra", 20)]), 10, 10);
        assert!((weeks[0].topics[0].hours - 2.6).abs() < 1e-9);
        assert!((weeks[4].topics[0].hours - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_damping_for_strong_topics() {
        let areas = vec![area("Logic", 0.75, 0.95, 0.2)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("Logic", 20)]), 10, 10);
        assert_eq!(weeks[8].phase, Phase::Peak);
        assert!((weeks[8].topics[0].hours - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_weekly_cap_is_greedy() {
        let areas = vec![
            area("A", 0.5, 0.7, 0.4),
            area("B", 0.5, 0.7, 0.3),
            area("C", 0.5, 0.7, 0.2),
        ];
        let hours = allocation(&[("A", 24), ("B", 24), ("C", 24)]);
        let weeks = PhaseScheduler::schedule(&areas, &hours, 4, 10);
        for week in &weeks {
            let sum: f64 = week.topics.iter().map(|t| t.hours).sum();
            assert!(sum <= 10.0 + 1e-9);
            assert_eq!(week.topics.len(), 2);
            assert!((week.topics[1].hours - 4.0).abs() < 1e-9);
            assert_eq!(week.topics[1].topic_id, "B");
        }
    }

    #[test]
    fn test_priority_decreases_over_time() {
        let areas = vec![area("Algebra", 0.5, 0.7, 0.2)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("Algebra", 20)]), 10, 10);
        assert!(weeks[0].topics[0].priority > weeks[9].topics[0].priority);
        let expected = 0.3 * 0.9 + 0.4 * 0.2 + 0.3 * 0.2;
        assert!((weeks[0].topics[0].priority - expected).abs() < 1e-9);
    }

    #[test]
    fn test_unallocated_topics_skipped() {
        let areas = vec![area("A", 0.5, 0.7, 0.2), area("B", 0.5, 0.7, 0.1)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("A", 10)]), 5, 10);
        assert!(weeks.iter().all(|w| w.topics.iter().all(|t| t.topic_id == "A")));
    }

    #[test]
    fn test_split_matches_phase_weights() {
        let areas = vec![area("Algebra", 0.5, 0.7, 0.2)];
        let weeks = PhaseScheduler::schedule(&areas, &allocation(&[("Algebra", 20)]), 10, 10);
        let t = &weeks[0].topics[0];
        assert!((t.split.concept - t.hours * 0.6).abs() < 1e-9);
        assert!((t.split.concept + t.split.practice + t.split.review - t.hours).abs() < 1e-9);
    }
}
