//! Appliance registry - ordered collection of registered devices with
//! aggregate queries and recommendation heuristics

use crate::core::{ApplianceRecord, Category, CategorySummary, Error, Result};
use crate::tariff::TariffSchedule;

/// Total monthly energy above which the upgrade/off-peak suggestions kick in
pub const HIGH_USAGE_THRESHOLD_KWH: f64 = 200.0;

/// Ordered, append-only collection of appliance records.
///
/// Records are owned exclusively by the registry and never mutated in place;
/// the only whole-record operations are append, positional removal and bulk
/// replacement on reload.
#[derive(Debug, Clone, Default)]
pub struct DeviceRegistry {
    records: Vec<ApplianceRecord>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. Duplicate names are permitted; there is no upsert.
    pub fn add(&mut self, record: ApplianceRecord) {
        log::debug!("Registered appliance '{}' ({:.2} kWh/month)", record.name, record.energy_kwh);
        self.records.push(record);
    }

    /// Remove a record by position
    pub fn remove(&mut self, index: usize) -> Result<ApplianceRecord> {
        if index >= self.records.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    /// Replace the whole collection (bulk reset/reload path)
    pub fn replace_all(&mut self, records: Vec<ApplianceRecord>) {
        self.records = records;
    }

    pub fn records(&self) -> &[ApplianceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of monthly energy over all records, in kWh
    pub fn total_energy(&self) -> f64 {
        self.records.iter().map(|r| r.energy_kwh).sum()
    }

    /// Sum of the flat-rate cost snapshots over all records.
    ///
    /// Callers wanting progressive billing should price
    /// `tariff.tiered_cost(self.total_energy())` instead.
    pub fn total_cost(&self) -> f64 {
        self.records.iter().map(|r| r.cost_amount).sum()
    }

    /// Total cost repriced live at the current flat rate, ignoring the
    /// per-record snapshots
    pub fn reprice_total(&self, tariff: &TariffSchedule) -> f64 {
        tariff.flat_cost(self.total_energy())
    }

    /// Record with the highest monthly energy, or `None` when nothing is
    /// registered yet (the UI shows an "add a device" hint in that case)
    pub fn top_consumer(&self) -> Option<&ApplianceRecord> {
        self.records
            .iter()
            .max_by(|a, b| a.energy_kwh.total_cmp(&b.energy_kwh))
    }

    /// Like [`top_consumer`](Self::top_consumer) but for callers that treat
    /// an empty registry as an error
    pub fn top_consumer_required(&self) -> Result<&ApplianceRecord> {
        self.top_consumer().ok_or(Error::EmptyRegistry)
    }

    /// Group records by category, summing energy and cost per group.
    ///
    /// Groups come out in the fixed category order, with the uncategorized
    /// group last; empty groups are skipped.
    pub fn by_category(&self) -> Vec<CategorySummary> {
        let mut groups: Vec<CategorySummary> = Vec::new();

        let buckets = Category::ALL
            .iter()
            .map(|c| Some(*c))
            .chain(std::iter::once(None));

        for bucket in buckets {
            let mut summary = CategorySummary {
                category: bucket,
                count: 0,
                energy_kwh: 0.0,
                cost_amount: 0.0,
            };
            for record in self.records.iter().filter(|r| r.category == bucket) {
                summary.count += 1;
                summary.energy_kwh += record.energy_kwh;
                summary.cost_amount += record.cost_amount;
            }
            if summary.count > 0 {
                groups.push(summary);
            }
        }

        groups
    }

    /// Deterministic, ordered rule list producing saving suggestions.
    ///
    /// Not machine learning: rule 1 targets the top consumer, rule 2 fires
    /// above [`HIGH_USAGE_THRESHOLD_KWH`], rule 3 always appends the general
    /// tips.
    pub fn recommendations(&self, tariff: &TariffSchedule) -> Vec<String> {
        let mut tips = Vec::new();

        if let Some(top) = self.top_consumer() {
            // A 2 h/day reduction is estimated to recover 25% of the cost
            let savings = top.cost_amount * 0.25;
            tips.push(format!(
                "{} is your highest consumer ({:.1} kWh/month). Cutting its use by \
                 2 hours a day would save about {}{:.0} per month.",
                top.name,
                top.energy_kwh,
                tariff.currency_symbol(),
                savings
            ));
        }

        if self.total_energy() > HIGH_USAGE_THRESHOLD_KWH {
            tips.push(format!(
                "Total usage is above {:.0} kWh/month: consider replacing old appliances \
                 with energy-efficient (inverter) models.",
                HIGH_USAGE_THRESHOLD_KWH
            ));
            tips.push(
                "Shift heavy loads such as washing machines and water heaters to \
                 off-peak hours (22:00-06:00)."
                    .to_string(),
            );
        }

        tips.push("Unplug chargers and electronics on standby when not in use.".to_string());
        tips.push("Use LED lighting and natural daylight where possible.".to_string());
        tips.push("Set air conditioners to 24-25\u{00B0}C and clean their filters monthly.".to_string());

        tips
    }
}
