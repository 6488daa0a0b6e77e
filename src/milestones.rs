//! Milestone generation from finished weekly plans.

use crate::types::{Importance, Milestone, MilestoneType, WeeklyPlan};

const SCORE_CHECKPOINTS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const MASTERY_MILESTONE_PRIORITY: f64 = 0.7;

pub struct MilestoneGenerator;

impl MilestoneGenerator {
    pub fn generate(
        weekly_plans: &[WeeklyPlan],
        total_weeks: u32,
        hours_per_week: u32,
        current_score: f64,
        target_score: f64,
    ) -> Vec<Milestone> {
        let score_gap = target_score - current_score;
        let mut milestones = vec![Milestone {
            week_number: 1,
            milestone_type: MilestoneType::Consistency,
            target: hours_per_week as f64,
            description: format!("Complete {hours_per_week} hours of study in the first week"),
            importance: Importance::Important,
        }];

        for p in SCORE_CHECKPOINTS {
            let week = (total_weeks as f64 * p).floor() as u32;
            if week == 0 {
                continue;
            }
            let target = current_score + score_gap * p;
            milestones.push(Milestone {
                week_number: week,
                milestone_type: MilestoneType::Score,
                target,
                description: format!("Reach a practice score of {target:.0}"),
                importance: if p >= 1.0 {
                    Importance::Critical
                } else {
                    Importance::Important
                },
            });
        }

        for plan in weekly_plans {
            let key: Vec<_> = plan
                .topics
                .iter()
                .filter(|t| t.priority > MASTERY_MILESTONE_PRIORITY)
                .collect();
            if key.is_empty() {
                continue;
            }
            let target = key.iter().map(|t| t.mastery.expected).sum::<f64>() / key.len() as f64;
            let names: Vec<&str> = key.iter().map(|t| t.topic_id.as_str()).collect();
            milestones.push(Milestone {
                week_number: plan.week_number,
                milestone_type: MilestoneType::Mastery,
                target,
                description: format!("Raise mastery of {} to {target:.2}", names.join(", ")),
                importance: Importance::Normal,
            });
        }

        milestones.sort_by_key(|m| m.week_number);

        tracing::debug!(count = milestones.len(), "milestones generated");
        milestones
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MasteryProjection, Phase, StudySplit, TopicAllocation};
    use chrono::NaiveDate;

    fn plan(week: u32, priorities: &[f64]) -> WeeklyPlan {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        WeeklyPlan {
            week_number: week,
            start_date: start,
            end_date: start,
            phase: Phase::Building,
            total_hours: 10.0,
            topics: priorities
                .iter()
                .enumerate()
                .map(|(i, &priority)| TopicAllocation {
                    topic_id: format!("T{i}"),
                    hours: 1.0,
                    priority,
                    mastery: MasteryProjection {
                        current: 0.4,
                        target: 0.6,
                        expected: 0.42,
                    },
                    split: StudySplit {
                        concept: 0.4,
                        practice: 0.4,
                        review: 0.2,
                    },
                })
                .collect(),
            practices: vec![],
            mock_exams: vec![],
            goals: vec![],
            expected_progress: 150.0,
        }
    }

    fn count(milestones: &[Milestone], kind: MilestoneType) -> usize {
        milestones.iter().filter(|m| m.milestone_type == kind).count()
    }

    #[test]
    fn test_four_score_milestones() {
        let plans: Vec<WeeklyPlan> = (1..=8).map(|w| plan(w, &[])).collect();
        let ms = MilestoneGenerator::generate(&plans, 8, 10, 150.0, 170.0);
        assert_eq!(count(&ms, MilestoneType::Score), 4);
        assert_eq!(count(&ms, MilestoneType::Consistency), 1);

        let scores: Vec<&Milestone> = ms
            .iter()
            .filter(|m| m.milestone_type == MilestoneType::Score)
            .collect();
        let weeks: Vec<u32> = scores.iter().map(|m| m.week_number).collect();
        assert_eq!(weeks, vec![2, 4, 6, 8]);
        assert!((scores[0].target - 155.0).abs() < 1e-9);
        assert_eq!(scores[3].importance, Importance::Critical);
        assert_eq!(scores[1].importance, Importance::Important);
    }

    #[test]
    fn test_short_horizon_skips_week_zero() {
        let plans = vec![plan(1, &[]), plan(2, &[])];
        let ms = MilestoneGenerator::generate(&plans, 2, 10, 150.0, 170.0);
        let weeks: Vec<u32> = ms
            .iter()
            .filter(|m| m.milestone_type == MilestoneType::Score)
            .map(|m| m.week_number)
            .collect();
        assert_eq!(weeks, vec![1, 1, 2]);
    }

    #[test]
    fn test_mastery_milestones_for_high_priority_weeks() {
        let plans = vec![plan(1, &[0.8, 0.3]), plan(2, &[0.6]), plan(3, &[0.75, 0.9])];
        let ms = MilestoneGenerator::generate(&plans, 3, 10, 150.0, 160.0);
        let mastery: Vec<u32> = ms
            .iter()
            .filter(|m| m.milestone_type == MilestoneType::Mastery)
            .map(|m| m.week_number)
            .collect();
        assert_eq!(mastery, vec![1, 3]);
    }

    #[test]
    fn test_consistency_first() {
        let plans = vec![plan(1, &[])];
        let ms = MilestoneGenerator::generate(&plans, 1, 12, 150.0, 150.0);
        assert_eq!(ms[0].milestone_type, MilestoneType::Consistency);
        assert_eq!(ms[0].week_number, 1);
        assert_eq!(ms[0].target, 12.0);
    }
}
