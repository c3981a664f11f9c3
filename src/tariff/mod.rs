//! Tariff engine for electricity cost calculation
//!
//! Two pricing paths:
//! - Flat: a single rate per kWh, used for per-appliance cost snapshots
//! - Tiered: a progressive band schedule for whole-household billing,
//!   where each consumption band is billed at its own marginal rate

use crate::core::TariffConfig;

/// Convert manual appliance input into monthly energy and flat-rate cost.
///
/// Pure and total for all numeric inputs; range validation happens at record
/// creation, not here.
pub fn compute_energy_and_cost(
    power_watts: f64,
    hours_per_day: f64,
    days_per_month: u32,
    rate_per_kwh: f64,
) -> (f64, f64) {
    let energy_kwh = power_watts * hours_per_day * days_per_month as f64 / 1000.0;
    let cost = energy_kwh * rate_per_kwh;
    (energy_kwh, cost)
}

/// Tariff schedule that prices energy consumption
#[derive(Debug, Clone)]
pub struct TariffSchedule {
    config: TariffConfig,
}

impl TariffSchedule {
    /// Create a new schedule with the given configuration
    pub fn new(config: &TariffConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Update the tariff configuration.
    ///
    /// Applies to future calculations only; existing appliance records keep
    /// the cost snapshot taken when they were created.
    pub fn update_config(&mut self, config: &TariffConfig) {
        self.config = config.clone();
    }

    /// Current flat rate per kWh
    pub fn rate_per_kwh(&self) -> f64 {
        self.config.rate_per_kwh
    }

    /// Currency symbol for display
    pub fn currency_symbol(&self) -> &str {
        &self.config.currency_symbol
    }

    /// Flat-rate cost for a given energy consumption in kWh
    pub fn flat_cost(&self, kwh: f64) -> f64 {
        kwh * self.config.rate_per_kwh
    }

    /// Progressive cost over the configured band schedule.
    ///
    /// Each band bills only the consumption falling inside it, so the result
    /// is continuous at band boundaries and non-decreasing in `total_kwh`.
    /// Non-positive consumption costs nothing.
    pub fn tiered_cost(&self, total_kwh: f64) -> f64 {
        if total_kwh <= 0.0 {
            return 0.0;
        }

        let mut cost = 0.0;
        let mut billed = 0.0;

        for tier in &self.config.tiers {
            let band_top = tier.upto_kwh.unwrap_or(f64::INFINITY);
            if billed >= band_top {
                continue;
            }
            let in_band = (total_kwh.min(band_top) - billed).max(0.0);
            cost += in_band * tier.rate_per_kwh;
            billed += in_band;
            if billed >= total_kwh {
                break;
            }
        }

        cost
    }

    /// Estimated carbon footprint in kg CO2 for a given energy consumption
    pub fn carbon_footprint(&self, energy_kwh: f64) -> f64 {
        energy_kwh * self.config.emission_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TariffTier;

    fn schedule() -> TariffSchedule {
        TariffSchedule::new(&TariffConfig::default())
    }

    #[test]
    fn test_energy_and_cost_formula() {
        let (energy, cost) = compute_energy_and_cost(150.0, 24.0, 30, 1500.0);
        assert!((energy - 108.0).abs() < 1e-9);
        assert!((cost - 162_000.0).abs() < 1e-6);

        // Zero hours means zero energy regardless of rate
        let (energy, cost) = compute_energy_and_cost(2000.0, 0.0, 31, 9999.0);
        assert_eq!(energy, 0.0);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn test_tiered_fixed_points() {
        let schedule = schedule();
        assert!((schedule.tiered_cost(50.0) - 50_000.0).abs() < 1e-6);
        // 50*1000 + 50*1200 + 50*1500
        assert!((schedule.tiered_cost(150.0) - 185_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_tiered_zero_and_negative() {
        let schedule = schedule();
        assert_eq!(schedule.tiered_cost(0.0), 0.0);
        assert_eq!(schedule.tiered_cost(-12.5), 0.0);
    }

    #[test]
    fn test_tiered_continuous_at_boundaries() {
        let schedule = schedule();
        for boundary in [50.0, 100.0, 200.0] {
            let below = schedule.tiered_cost(boundary - 1e-6);
            let at = schedule.tiered_cost(boundary);
            let above = schedule.tiered_cost(boundary + 1e-6);
            assert!((at - below).abs() < 1e-2);
            assert!((above - at).abs() < 1e-2);
        }
    }

    #[test]
    fn test_tiered_monotone_non_decreasing() {
        let schedule = schedule();
        let mut last = 0.0;
        for i in 0..600 {
            let cost = schedule.tiered_cost(i as f64);
            assert!(cost >= last);
            last = cost;
        }
    }

    #[test]
    fn test_top_band_is_open_ended() {
        let schedule = schedule();
        let base = schedule.tiered_cost(200.0);
        // Everything above 200 kWh bills at the top marginal rate
        assert!((schedule.tiered_cost(300.0) - (base + 100.0 * 2000.0)).abs() < 1e-6);
    }

    #[test]
    fn test_custom_single_tier_degenerates_to_flat() {
        let config = TariffConfig {
            tiers: vec![TariffTier { upto_kwh: None, rate_per_kwh: 1444.7 }],
            ..TariffConfig::default()
        };
        let schedule = TariffSchedule::new(&config);
        assert!((schedule.tiered_cost(123.0) - 123.0 * 1444.7).abs() < 1e-6);
    }

    #[test]
    fn test_carbon_footprint() {
        let schedule = schedule();
        assert!((schedule.carbon_footprint(100.0) - 85.0).abs() < 1e-9);
        assert_eq!(schedule.carbon_footprint(0.0), 0.0);
    }

    #[test]
    fn test_update_config_applies_to_future_only() {
        let mut schedule = schedule();
        assert_eq!(schedule.rate_per_kwh(), 1500.0);

        let record =
            crate::core::ApplianceRecord::new("TV", None, 100.0, 5.0, 30, schedule.rate_per_kwh())
                .unwrap();

        schedule.update_config(&TariffConfig {
            rate_per_kwh: 2000.0,
            ..TariffConfig::default()
        });

        // Existing snapshot keeps the old rate
        assert!((record.cost_amount - 15.0 * 1500.0).abs() < 1e-6);
        assert!((schedule.flat_cost(15.0) - 15.0 * 2000.0).abs() < 1e-6);
    }
}
