//! Growth projections: compounding with end-of-period contributions, and
//! lump sums carried through a historical return.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// Longest horizon accepted from user input.
pub const MAX_HORIZON_YEARS: u32 = 100;

/// Projects an account balance over `horizon_years` periods.
///
/// Element 0 is `initial_amount`. Each period applies growth first and then
/// adds the contribution.
pub fn simulate(
    initial_amount: f64,
    periodic_contribution: f64,
    annual_return: f64,
    horizon_years: u32,
) -> Vec<f64> {
    let mut trajectory = Vec::with_capacity(horizon_years as usize + 1);
    trajectory.push(initial_amount);
    for _ in 0..horizon_years {
        let previous = trajectory[trajectory.len() - 1];
        trajectory.push(previous * (1.0 + annual_return) + periodic_contribution);
    }
    trajectory
}

/// Final value of a single investment that earned `cumulative_return`.
pub fn project_lump_sum(amount: f64, cumulative_return: f64) -> f64 {
    amount * (1.0 + cumulative_return)
}

/// User supplied simulation parameters, validated once at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub amount: f64,
    pub contribution: f64,
    pub horizon_years: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            amount: 10_000.0,
            contribution: 500.0,
            horizon_years: 10,
        }
    }
}

impl SimulationConfig {
    pub fn new(amount: f64, contribution: f64, horizon_years: u32) -> Result<Self> {
        let config = Self {
            amount,
            contribution,
            horizon_years,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            bail!(
                "Initial amount must be a non-negative number, got {}",
                self.amount
            );
        }
        if !self.contribution.is_finite() || self.contribution < 0.0 {
            bail!(
                "Periodic contribution must be a non-negative number, got {}",
                self.contribution
            );
        }
        if self.horizon_years > MAX_HORIZON_YEARS {
            bail!(
                "Horizon must be at most {MAX_HORIZON_YEARS} years, got {}",
                self.horizon_years
            );
        }
        Ok(())
    }

    pub fn simulate(&self, annual_return: f64) -> Vec<f64> {
        simulate(
            self.amount,
            self.contribution,
            annual_return,
            self.horizon_years,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_horizon_returns_initial_amount() {
        assert_eq!(simulate(1234.5, 0.0, 0.07, 0), vec![1234.5]);
        assert_eq!(simulate(0.0, 100.0, -0.5, 0), vec![0.0]);
    }

    #[test]
    fn test_zero_return_is_pure_addition() {
        assert_eq!(
            simulate(1000.0, 100.0, 0.0, 3),
            vec![1000.0, 1100.0, 1200.0, 1300.0]
        );
    }

    #[test]
    fn test_pure_compounding() {
        let trajectory = simulate(1000.0, 0.0, 0.10, 1);
        assert_eq!(trajectory.len(), 2);
        assert_eq!(trajectory[0], 1000.0);
        assert!((trajectory[1] - 1100.0).abs() < 1e-9);
    }

    #[test]
    fn test_contribution_added_after_growth() {
        // 1000 * 1.1 + 100 = 1200, then 1200 * 1.1 + 100 = 1420
        let trajectory = simulate(1000.0, 100.0, 0.10, 2);
        assert!((trajectory[1] - 1200.0).abs() < 1e-9);
        assert!((trajectory[2] - 1420.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_return_shrinks_balance() {
        let trajectory = simulate(1000.0, 0.0, -0.5, 2);
        assert_eq!(trajectory, vec![1000.0, 500.0, 250.0]);
    }

    #[test]
    fn test_final_value_round_trips_with_zero_horizon() {
        let trajectory = simulate(5000.0, 250.0, 0.06, 15);
        assert_eq!(trajectory.len(), 16);
        let last = *trajectory.last().unwrap();
        assert_eq!(simulate(last, 0.0, 0.06, 0), vec![last]);
    }

    #[test]
    fn test_lump_sum_projection() {
        assert!((project_lump_sum(10_000.0, 0.25) - 12_500.0).abs() < 1e-9);
        assert!((project_lump_sum(10_000.0, -0.1) - 9_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulation_config_rejects_bad_input() {
        assert!(SimulationConfig::new(-1.0, 0.0, 5).is_err());
        assert!(SimulationConfig::new(100.0, -5.0, 5).is_err());
        assert!(SimulationConfig::new(f64::NAN, 0.0, 5).is_err());
        let err = SimulationConfig::new(100.0, 0.0, 500).unwrap_err();
        assert!(err.to_string().contains("at most 100 years"));
    }

    #[test]
    fn test_simulation_config_simulates() {
        let config = SimulationConfig::new(1000.0, 100.0, 3).unwrap();
        assert_eq!(
            config.simulate(0.0),
            vec![1000.0, 1100.0, 1200.0, 1300.0]
        );
    }
}
