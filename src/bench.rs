//! Benchmark driver: repeated runs over the same configuration with
//! consecutive seeds, aggregated into distribution statistics.

use crate::config::Config;
use crate::engine::Engine;
use crate::metrics::RunReport;
use crate::stats::{Sample, SampleReport};
use anyhow::{Context, Result};
use rand::Rng;
use serde::Serialize;

/// Aggregated statistics across all benchmark runs.
#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub runs: usize,
    pub final_profit: SampleReport,
    /// Statistics over the runs that reached break-even, if any.
    pub breakeven_day: Option<SampleReport>,
    /// Fraction of runs that reached break-even.
    pub breakeven_share: f64,
    pub best_quarter_profit: Option<SampleReport>,
    pub final_subscriptions: SampleReport,
    pub final_prepaid: SampleReport,
    pub final_one_off_pool: SampleReport,
    /// Cumulative profit distribution per week across runs.
    pub weekly_profit: Vec<SampleReport>,
}

/// Run the benchmark: `cfg.runs` simulations seeded `seed + i`.
pub fn run_benchmark(cfg: &Config) -> Result<BenchReport> {
    let base_seed = cfg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("base seed: {base_seed}");
    let mut reports = Vec::with_capacity(cfg.runs);
    for i_run in 0..cfg.runs {
        log::info!("starting run {}/{}", i_run + 1, cfg.runs);
        let mut engine = Engine::new(cfg.clone(), base_seed.wrapping_add(i_run as u64));
        reports.push(engine.run().context("failed to run simulation")?);
    }
    Ok(aggregate(&reports))
}

fn aggregate(reports: &[RunReport]) -> BenchReport {
    let mut final_profit = Sample::new();
    let mut breakeven = Sample::new();
    let mut best_quarter = Sample::new();
    let mut subscriptions = Sample::new();
    let mut prepaid = Sample::new();
    let mut one_off = Sample::new();

    for report in reports {
        final_profit.push(report.final_profit);
        if let Some(day) = report.breakeven_day {
            breakeven.push(f64::from(day));
        }
        if let Some(quarter) = report.best_quarter {
            best_quarter.push(quarter.profit);
        }
        subscriptions.push(f64::from(report.final_subscriptions));
        prepaid.push(f64::from(report.final_prepaid));
        one_off.push(f64::from(report.final_one_off_pool));
    }

    let n_weeks = reports
        .iter()
        .map(|report| report.weekly.len())
        .min()
        .unwrap_or(0);
    let mut weekly_profit = Vec::with_capacity(n_weeks);
    for week in 0..n_weeks {
        let mut sample = Sample::new();
        for report in reports {
            sample.push(report.weekly[week].cumulative_profit);
        }
        weekly_profit.push(sample.report());
    }

    BenchReport {
        runs: reports.len(),
        final_profit: final_profit.report(),
        breakeven_day: (!breakeven.is_empty()).then(|| breakeven.report()),
        breakeven_share: breakeven.len() as f64 / reports.len().max(1) as f64,
        best_quarter_profit: (!best_quarter.is_empty()).then(|| best_quarter.report()),
        final_subscriptions: subscriptions.report(),
        final_prepaid: prepaid.report(),
        final_one_off_pool: one_off.report(),
        weekly_profit,
    }
}
