//! Hour Allocation
//!
//! Distributes an integer hour budget across focus areas to maximise total
//! expected improvement. Each area has a concave, saturating value curve
//!
//! ```text
//! improvement(area, h) = gap × potential × (1 − e^(−h / time_required))
//! ```
//!
//! so this is a bounded knapsack with diminishing returns, solved exactly by
//! dynamic programming over (area index, hours used):
//!
//! ```text
//! dp[i][h] = max(dp[i-1][h], max_{a ∈ 1..=min(h, cap_i)} dp[i-1][h-a] + improvement(area_i, a))
//! ```
//!
//! Complexity: O(n × H × cap), with `cap_i = min(H, ceil(time_required_i))`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{FocusArea, EPSILON};

/// Horizon-wide allocation result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    /// Topic id -> total hours over the whole horizon (zero-hour topics omitted)
    pub hours: BTreeMap<String, u32>,
    /// Optimal objective value `dp[n][H]`
    pub total_improvement: f64,
}

impl Allocation {
    pub fn total_hours(&self) -> u32 {
        self.hours.values().sum()
    }

    pub fn hours_for(&self, topic_id: &str) -> u32 {
        self.hours.get(topic_id).copied().unwrap_or(0)
    }
}

pub struct HourAllocator;

impl HourAllocator {
    /// Expected improvement from studying `area` for `hours`
    pub fn improvement(area: &FocusArea, hours: f64) -> f64 {
        if area.time_required <= EPSILON {
            return 0.0;
        }
        area.gap() * area.improvement_potential * (1.0 - (-hours / area.time_required).exp())
    }

    /// Upper bound on hours a single area may receive
    pub fn topic_cap(area: &FocusArea, budget: u32) -> u32 {
        let needed = area.time_required.max(0.0).ceil();
        if needed >= budget as f64 {
            budget
        } else {
            needed as u32
        }
    }

    /// Solve the allocation for `budget` total hours.
    ///
    /// Among allocation amounts reaching the same optimum the smallest one
    /// (scanned ascending) wins.
    pub fn allocate(areas: &[FocusArea], budget: u32) -> Allocation {
        let eligible: Vec<&FocusArea> = areas
            .iter()
            .filter(|a| a.time_required.is_finite() && a.time_required > EPSILON)
            .collect();

        if budget == 0 || eligible.is_empty() {
            return Allocation::default();
        }

        let n = eligible.len();
        let h_max = budget as usize;

        let mut dp = vec![vec![0.0_f64; h_max + 1]; n + 1];
        let mut choice = vec![vec![0_u32; h_max + 1]; n];

        for i in 1..=n {
            let area = eligible[i - 1];
            let cap = Self::topic_cap(area, budget) as usize;
            let gains: Vec<f64> = (0..=cap)
                .map(|a| Self::improvement(area, a as f64))
                .collect();

            let (prev_rows, cur_rows) = dp.split_at_mut(i);
            let prev = &prev_rows[i - 1];
            let cur = &mut cur_rows[0];

            for h in 0..=h_max {
                let mut best = prev[h];
                let mut best_a = 0usize;
                for a in 1..=cap.min(h) {
                    let candidate = prev[h - a] + gains[a];
                    if candidate > best {
                        best = candidate;
                        best_a = a;
                    }
                }
                cur[h] = best;
                choice[i - 1][h] = best_a as u32;
            }
        }

        let mut hours = BTreeMap::new();
        let mut remaining = h_max;
        for i in (0..n).rev() {
            let a = choice[i][remaining];
            if a > 0 {
                hours.insert(eligible[i].topic_id.clone(), a);
                remaining -= a as usize;
            }
        }

        let allocation = Allocation {
            hours,
            total_improvement: dp[n][h_max],
        };

        tracing::debug!(
            budget,
            areas = n,
            allocated = allocation.total_hours(),
            improvement = allocation.total_improvement,
            "hour allocation solved"
        );

        allocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Strategy;

    fn area(id: &str, current: f64, target: f64, potential: f64, time_required: f64) -> FocusArea {
        FocusArea {
            topic_id: id.to_string(),
            topic_name: id.to_string(),
            current_mastery: current,
            target_mastery: target,
            improvement_potential: potential,
            time_required,
            strategy: Strategy::Focused,
        }
    }

    #[test]
    fn test_improvement_zero_hours() {
        let a = area("A", 0.3, 0.6, 0.3, 15.0);
        assert_eq!(HourAllocator::improvement(&a, 0.0), 0.0);
    }

    #[test]
    fn test_improvement_saturates() {
        let a = area("A", 0.3, 0.6, 0.3, 15.0);
        let ceiling = a.gap() * a.improvement_potential;
        let big = HourAllocator::improvement(&a, 10_000.0);
        assert!((big - ceiling).abs() < 1e-9);
    }

    #[test]
    fn test_zero_time_required_yields_nothing() {
        let a = area("A", 0.95, 0.95, 0.0, 0.0);
        assert_eq!(HourAllocator::improvement(&a, 5.0), 0.0);
        let alloc = HourAllocator::allocate(&[a], 40);
        assert!(alloc.hours.is_empty());
        assert_eq!(alloc.total_improvement, 0.0);
    }

    #[test]
    fn test_zero_budget() {
        let alloc = HourAllocator::allocate(&[area("A", 0.3, 0.6, 0.3, 15.0)], 0);
        assert!(alloc.hours.is_empty());
    }

    #[test]
    fn test_empty_areas() {
        let alloc = HourAllocator::allocate(&[], 80);
        assert!(alloc.hours.is_empty());
        assert_eq!(alloc.total_hours(), 0);
    }

    #[test]
    fn test_single_area_gets_cap() {
        let a = area("Algebra", 0.3, 0.45, 0.15, 7.5);
        let alloc = HourAllocator::allocate(&[a], 80);
        assert_eq!(alloc.hours_for("Algebra"), 8);
        assert_eq!(alloc.total_hours(), 8);
    }

    #[test]
    fn test_cap_limited_by_budget() {
        let a = area("A", 0.2, 0.7, 0.5, 25.0);
        assert_eq!(HourAllocator::topic_cap(&a, 10), 10);
        assert_eq!(HourAllocator::topic_cap(&a, 100), 25);
        let alloc = HourAllocator::allocate(&[a], 10);
        assert_eq!(alloc.hours_for("A"), 10);
    }

    #[test]
    fn test_budget_split_favors_higher_value() {
        let high = area("High", 0.2, 0.7, 1.0, 25.0);
        let low = area("Low", 0.5, 0.65, 0.15, 7.5);
        let alloc = HourAllocator::allocate(&[low, high], 20);
        assert_eq!(alloc.total_hours(), 20);
        assert!(alloc.hours_for("High") > alloc.hours_for("Low"));
    }

    #[test]
    fn test_matches_brute_force_for_two_areas() {
        let a = area("A", 0.2, 0.6, 0.8, 20.0);
        let b = area("B", 0.4, 0.7, 0.3, 15.0);
        let budget = 18;
        let alloc = HourAllocator::allocate(&[a.clone(), b.clone()], budget);

        let mut best = 0.0_f64;
        for ha in 0..=HourAllocator::topic_cap(&a, budget) {
            for hb in 0..=HourAllocator::topic_cap(&b, budget) {
                if ha + hb <= budget {
                    let v = HourAllocator::improvement(&a, ha as f64)
                        + HourAllocator::improvement(&b, hb as f64);
                    best = best.max(v);
                }
            }
        }
        assert!((alloc.total_improvement - best).abs() < 1e-9);
    }
}
