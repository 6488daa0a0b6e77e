use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannerConfig {
    pub simulation_trials: usize,
    /// Trials per batch; cancellation is checked between batches
    pub simulation_batch_size: usize,
    pub seed: Option<u64>,
    pub max_weeks: u32,
    pub max_hours_per_week: u32,
    pub log_level: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            simulation_trials: 1000,
            simulation_batch_size: 100,
            seed: None,
            max_weeks: 104,
            max_hours_per_week: 168,
            log_level: "info".to_string(),
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let simulation_trials = env_parse("PLANNER_SIMULATION_TRIALS")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.simulation_trials);

        let simulation_batch_size = env_parse("PLANNER_BATCH_SIZE")
            .filter(|&n: &usize| n > 0)
            .unwrap_or(defaults.simulation_batch_size);

        let max_weeks = env_parse("PLANNER_MAX_WEEKS")
            .filter(|&n: &u32| n > 0)
            .unwrap_or(defaults.max_weeks);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        Self {
            simulation_trials,
            simulation_batch_size,
            seed: env_parse("PLANNER_SEED"),
            max_weeks,
            max_hours_per_week: defaults.max_hours_per_week,
            log_level,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.simulation_trials = trials.max(1);
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse::<T>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.simulation_trials, 1000);
        assert_eq!(config.simulation_batch_size, 100);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_builders() {
        let config = PlannerConfig::default().with_seed(7).with_trials(0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.simulation_trials, 1);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: PlannerConfig = serde_json::from_str(
            r#"{"simulationTrials":200,"simulationBatchSize":50,"seed":9,
                "maxWeeks":52,"maxHoursPerWeek":40,"logLevel":"debug"}"#,
        )
        .unwrap();
        assert_eq!(config.simulation_trials, 200);
        assert_eq!(config.max_weeks, 52);
        assert_eq!(config.seed, Some(9));
    }
}
