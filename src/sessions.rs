//! Session Scheduling
//!
//! Turns a week's topic breakdown into practice sessions and mock exams.
//! 60% of the weekly budget is practice, split across session types by the
//! phase's session mix.

use serde::{Deserialize, Serialize};

use crate::phase::{session_mix, WeekBreakdown};
use crate::types::{
    MockExam, MockExamType, Phase, PracticeSession, SessionType, TopicAllocation, EPSILON,
    PRACTICE_SHARE,
};

const ADAPTIVE_BASE_ACCURACY: f64 = 0.75;
const ADAPTIVE_WEEKLY_STEP: f64 = 0.01;
const MAX_TARGET_ACCURACY: f64 = 0.95;
const TARGETED_BASE_ACCURACY: f64 = 0.7;
const TARGETED_MASTERY_FACTOR: f64 = 0.2;
const TARGETED_MIN_PRIORITY: f64 = 0.5;
const SECTION_EXAM_TOPICS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSessions {
    pub practices: Vec<PracticeSession>,
    pub mock_exams: Vec<MockExam>,
}

pub struct SessionScheduler;

impl SessionScheduler {
    pub fn schedule(
        weeks: &[WeekBreakdown],
        total_weeks: u32,
        hours_per_week: u32,
    ) -> Vec<WeekSessions> {
        weeks
            .iter()
            .map(|week| WeekSessions {
                practices: Self::practice_sessions(week, hours_per_week),
                mock_exams: Self::mock_exams(week, total_weeks),
            })
            .collect()
    }

    /// Practice sessions for one week. A week with no topics gets none.
    pub fn practice_sessions(week: &WeekBreakdown, hours_per_week: u32) -> Vec<PracticeSession> {
        if week.topics.is_empty() {
            return Vec::new();
        }
        let practice_hours = PRACTICE_SHARE * hours_per_week as f64;
        let mix = session_mix(week.phase);
        let all_topics: Vec<String> = week.topics.iter().map(|t| t.topic_id.clone()).collect();
        let mut sessions = Vec::new();

        let adaptive_hours = practice_hours * mix.adaptive;
        if adaptive_hours > EPSILON {
            let accuracy = (ADAPTIVE_BASE_ACCURACY + ADAPTIVE_WEEKLY_STEP * week.week_number as f64)
                .min(MAX_TARGET_ACCURACY);
            sessions.push(session(
                SessionType::Adaptive,
                all_topics.clone(),
                adaptive_hours,
                Some(accuracy),
            ));
        }

        let targeted_hours = practice_hours * mix.targeted;
        let eligible: Vec<&TopicAllocation> = week
            .topics
            .iter()
            .filter(|t| t.priority > TARGETED_MIN_PRIORITY)
            .collect();
        if targeted_hours > EPSILON && !eligible.is_empty() {
            let per_topic = targeted_hours / eligible.len() as f64;
            for topic in eligible {
                let accuracy =
                    TARGETED_BASE_ACCURACY + TARGETED_MASTERY_FACTOR * topic.mastery.current;
                sessions.push(session(
                    SessionType::Targeted,
                    vec![topic.topic_id.clone()],
                    per_topic,
                    Some(accuracy),
                ));
            }
        }

        let mixed_hours = practice_hours * mix.mixed;
        if mixed_hours > EPSILON {
            sessions.push(session(SessionType::Mixed, all_topics.clone(), mixed_hours, None));
        }

        let timed_hours = practice_hours * mix.timed;
        if timed_hours > EPSILON {
            sessions.push(session(SessionType::Timed, all_topics, timed_hours, None));
        }

        sessions
    }

    /// Diagnostic in week 1, section exams on even building weeks, full exams
    /// during peak and on even reinforcement weeks, and a final full exam in
    /// the second-to-last week.
    pub fn mock_exams(week: &WeekBreakdown, total_weeks: u32) -> Vec<MockExam> {
        let n = week.week_number;
        let all_topics: Vec<String> = week.topics.iter().map(|t| t.topic_id.clone()).collect();
        let is_final_week = total_weeks >= 2 && n == total_weeks - 1;
        let mut exams = Vec::new();

        if n == 1 {
            exams.push(exam(MockExamType::Diagnostic, false, all_topics.clone()));
        }

        match week.phase {
            Phase::Building if n % 2 == 0 => {
                exams.push(exam(MockExamType::Section, false, top_topics(&week.topics)));
            }
            Phase::Peak if !is_final_week => {
                exams.push(exam(MockExamType::Full, false, all_topics.clone()));
            }
            Phase::Reinforcement if n % 2 == 0 && !is_final_week => {
                exams.push(exam(MockExamType::Full, false, all_topics.clone()));
            }
            _ => {}
        }

        if is_final_week {
            exams.push(exam(MockExamType::Full, true, all_topics));
        }

        exams
    }
}

fn session(
    session_type: SessionType,
    topics: Vec<String>,
    hours: f64,
    target_accuracy: Option<f64>,
) -> PracticeSession {
    PracticeSession {
        session_type,
        topics,
        hours,
        question_count: (hours * session_type.questions_per_hour()).round() as u32,
        target_accuracy,
    }
}

fn exam(exam_type: MockExamType, is_final: bool, topics: Vec<String>) -> MockExam {
    MockExam {
        exam_type,
        is_final,
        duration_minutes: exam_type.duration_minutes(),
        topics,
    }
}

fn top_topics(topics: &[TopicAllocation]) -> Vec<String> {
    let mut ranked: Vec<&TopicAllocation> = topics.iter().collect();
    ranked.sort_by(|a, b| b.priority.total_cmp(&a.priority));
    ranked
        .into_iter()
        .take(SECTION_EXAM_TOPICS)
        .map(|t| t.topic_id.clone())
        .collect()
}
