use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::EconomyError;

/// Game tick counter for deterministic simulation
#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
pub struct GameTick {
    pub current: u64,
    pub target_tps: u32, // Ticks per second
}

impl Default for GameTick {
    fn default() -> Self {
        Self {
            current: 0,
            target_tps: 60,
        }
    }
}

impl GameTick {
    pub fn new(target_tps: u32) -> Self {
        Self {
            current: 0,
            target_tps,
        }
    }

    pub fn tick(&mut self) {
        self.current += 1;
    }

    pub fn delta_time(&self) -> f32 {
        1.0 / self.target_tps.max(1) as f32
    }
}

/// Running totals of command outcomes, for debugging and headless reports
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeCounters {
    pub contracts_settled: u64,
    pub contracts_rejected: u64,
    pub conflicts_opened: u64,
    pub conflicts_resolved: u64,
    pub resolutions_rejected: u64,
}

/// Game balance numbers for the business economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Cash every new business starts with
    pub starting_money: f64,
    pub mediation_fee_min: f64,
    pub mediation_fee_max: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 1000.0,
            mediation_fee_min: 100.0,
            mediation_fee_max: 500.0,
        }
    }
}

impl EconomyConfig {
    pub fn validate(&self) -> Result<(), EconomyError> {
        let fields = [
            ("starting_money", self.starting_money),
            ("mediation_fee_min", self.mediation_fee_min),
            ("mediation_fee_max", self.mediation_fee_max),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(EconomyError::InvalidConfig(format!(
                    "{field} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.mediation_fee_min > self.mediation_fee_max {
            return Err(EconomyError::InvalidConfig(format!(
                "mediation_fee_min ({}) exceeds mediation_fee_max ({})",
                self.mediation_fee_min, self.mediation_fee_max
            )));
        }

        Ok(())
    }

    /// Inclusive band check; NaN never passes.
    pub fn check_mediation_fee(&self, fee: f64) -> Result<(), EconomyError> {
        if (self.mediation_fee_min..=self.mediation_fee_max).contains(&fee) {
            Ok(())
        } else {
            Err(EconomyError::MediationFeeOutOfRange {
                fee,
                min: self.mediation_fee_min,
                max: self.mediation_fee_max,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_delta() {
        let mut tick = GameTick::new(20);
        tick.tick();
        assert_eq!(tick.current, 1);
        assert_eq!(tick.delta_time(), 0.05);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = EconomyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.starting_money, 1000.0);
    }

    #[test]
    fn test_inverted_fee_band_is_invalid() {
        let config = EconomyConfig {
            mediation_fee_min: 600.0,
            ..EconomyConfig::default()
        };
        assert!(matches!(config.validate(), Err(EconomyError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_starting_money_is_invalid() {
        let config = EconomyConfig {
            starting_money: -5.0,
            ..EconomyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_mediation_fee_band_is_inclusive() {
        let config = EconomyConfig::default();
        assert!(config.check_mediation_fee(100.0).is_ok());
        assert!(config.check_mediation_fee(500.0).is_ok());
        assert!(config.check_mediation_fee(99.99).is_err());
        assert!(config.check_mediation_fee(500.01).is_err());
        assert!(config.check_mediation_fee(f64::NAN).is_err());
    }
}
