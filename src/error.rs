use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("exam must be one week to the planning horizon away (got {weeks} weeks)")]
    ScheduleRange { weeks: i64 },
    #[error("invalid weekly hour budget: {0}")]
    InvalidBudget(u32),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("failed to persist plan: {0}")]
    Persistence(String),
    #[error("plan generation cancelled")]
    Cancelled,
}

impl PlanError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ScheduleRange { .. } => "SCHEDULE_RANGE",
            Self::InvalidBudget(_) => "INVALID_BUDGET",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::DataUnavailable(_) => "DATA_UNAVAILABLE",
            Self::Persistence(_) => "PERSISTENCE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
