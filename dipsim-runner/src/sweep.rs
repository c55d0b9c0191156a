//! Parameter sweeps: replay one series under every config in a grid.

use std::cmp::Ordering;
use std::collections::HashMap;

use anyhow::Context;
use rayon::prelude::*;
use tracing::{debug, info};

use dipsim_core::{FundDay, SimulationConfig};

use crate::runner::{run_from_data, RunError, SimulationReport};

/// Values to try for each tunable parameter.
///
/// An empty axis keeps the base config's value.
#[derive(Debug, Clone, Default)]
pub struct ParamGrid {
    pub buy_amounts_per_unit: Vec<f64>,
    pub min_buy_drop_percents: Vec<f64>,
    pub sell_gain_thresholds: Vec<f64>,
    pub sell_ratios: Vec<f64>,
    pub rounding_modes: Vec<bool>,
}

impl ParamGrid {
    /// Thresholds 3..=10 and ratios 20/30/50/70/100.
    pub fn take_profit_default() -> Self {
        Self {
            sell_gain_thresholds: vec![3.0, 4.0, 5.0, 6.0, 8.0, 10.0],
            sell_ratios: vec![20.0, 30.0, 50.0, 70.0, 100.0],
            ..Default::default()
        }
    }

    /// Number of combinations before invalid ones are dropped.
    pub fn size(&self) -> usize {
        [
            self.buy_amounts_per_unit.len(),
            self.min_buy_drop_percents.len(),
            self.sell_gain_thresholds.len(),
            self.sell_ratios.len(),
            self.rounding_modes.len(),
        ]
        .iter()
        .map(|&n| n.max(1))
        .product()
    }

    /// Every combination, in axis order, minus configs that fail validation.
    pub fn generate_configs(&self, base: &SimulationConfig) -> Vec<SimulationConfig> {
        fn axis<T: Copy>(values: &[T], base: T) -> Vec<T> {
            if values.is_empty() {
                vec![base]
            } else {
                values.to_vec()
            }
        }

        let mut configs = Vec::with_capacity(self.size());
        for amount in axis(&self.buy_amounts_per_unit, base.buy_amount_per_unit) {
            for drop in axis(&self.min_buy_drop_percents, base.min_buy_drop_percent) {
                for threshold in axis(&self.sell_gain_thresholds, base.sell_gain_threshold_percent) {
                    for ratio in axis(&self.sell_ratios, base.sell_ratio_percent) {
                        for rounding in axis(&self.rounding_modes, base.use_rounding) {
                            let config = SimulationConfig {
                                buy_amount_per_unit: amount,
                                min_buy_drop_percent: drop,
                                sell_gain_threshold_percent: threshold,
                                sell_ratio_percent: ratio,
                                use_rounding: rounding,
                                ..base.clone()
                            };
                            match config.validate() {
                                Ok(()) => configs.push(config),
                                Err(e) => debug!(error = %e, "skipping grid point"),
                            }
                        }
                    }
                }
            }
        }
        configs
    }
}

/// Sweep executor.
#[derive(Debug, Clone)]
pub struct ParamSweep {
    parallel: bool,
}

impl Default for ParamSweep {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSweep {
    pub fn new() -> Self {
        Self { parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Replay `data` under every grid config.
    pub fn sweep(
        &self,
        grid: &ParamGrid,
        base: &SimulationConfig,
        data: &[FundDay],
        fund_code: &str,
    ) -> Result<SweepResults, RunError> {
        let configs = grid.generate_configs(base);
        info!(
            configs = configs.len(),
            days = data.len(),
            parallel = self.parallel,
            "starting sweep"
        );

        let reports: Vec<SimulationReport> = if self.parallel {
            configs
                .par_iter()
                .map(|config| run_from_data(config, data, fund_code))
                .collect::<Result<Vec<_>, _>>()?
        } else {
            configs
                .iter()
                .map(|config| run_from_data(config, data, fund_code))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(SweepResults::new(reports))
    }
}

/// Reports from a sweep, in grid order.
#[derive(Debug)]
pub struct SweepResults {
    reports: Vec<SimulationReport>,
    by_run_id: HashMap<String, usize>,
}

impl SweepResults {
    fn new(reports: Vec<SimulationReport>) -> Self {
        let by_run_id = reports
            .iter()
            .enumerate()
            .map(|(i, r)| (r.run_id.as_str().to_string(), i))
            .collect();
        Self { reports, by_run_id }
    }

    pub fn all(&self) -> &[SimulationReport] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn get(&self, run_id: &str) -> Option<&SimulationReport> {
        self.by_run_id.get(run_id).map(|&i| &self.reports[i])
    }

    /// Descending by `return_percent`; ties keep grid order.
    pub fn sorted_by_return(&self) -> Vec<&SimulationReport> {
        let mut sorted: Vec<_> = self.reports.iter().collect();
        sorted.sort_by(|a, b| {
            b.return_percent()
                .partial_cmp(&a.return_percent())
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    pub fn top_n(&self, n: usize) -> Vec<&SimulationReport> {
        self.sorted_by_return().into_iter().take(n).collect()
    }

    pub fn best(&self) -> Option<&SimulationReport> {
        self.sorted_by_return().into_iter().next()
    }

    /// One summary row per report, best first.
    pub fn to_csv(&self) -> anyhow::Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record([
            "run_id",
            "buy_amount_per_unit",
            "min_buy_drop_percent",
            "use_rounding",
            "sell_gain_threshold_percent",
            "sell_ratio_percent",
            "return_percent",
            "total_return",
            "total_trade_profit",
            "buy_count",
            "sell_count",
            "max_holding_value",
        ])?;
        for r in self.sorted_by_return() {
            let c = &r.config;
            let res = &r.result;
            wtr.write_record([
                r.run_id.short(12),
                &c.buy_amount_per_unit.to_string(),
                &c.min_buy_drop_percent.to_string(),
                &c.use_rounding.to_string(),
                &c.sell_gain_threshold_percent.to_string(),
                &c.sell_ratio_percent.to_string(),
                &format!("{:.4}", res.return_percent),
                &format!("{:.2}", res.total_return),
                &format!("{:.2}", res.total_trade_profit),
                &res.buy_count.to_string(),
                &res.sell_count.to_string(),
                &format!("{:.2}", res.max_holding_value),
            ])?;
        }
        let data = wtr.into_inner().context("failed to flush CSV writer")?;
        String::from_utf8(data).context("CSV output is not valid UTF-8")
    }
}
