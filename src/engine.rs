use crate::arrival::{self, ArrivalCtx};
use crate::config::Config;
use crate::demand::DailyDemand;
use crate::metrics::RunReport;
use crate::params;
use crate::periodic;
use crate::schedule;
use crate::state::SimState;
use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;

/// Simulation engine.
///
/// Holds the configuration, current state, and random number generator,
/// and advances the simulation one day at a time.
pub struct Engine {
    cfg: Config,
    state: SimState,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with the given configuration and seed.
    pub fn new(cfg: Config, seed: u64) -> Self {
        let state = SimState::new(
            cfg.horizon_days,
            cfg.release_cadence_days,
            cfg.marketing_budget_monthly,
        );
        let rng = ChaCha12Rng::seed_from_u64(seed);
        Self { cfg, state, rng }
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SimState {
        &mut self.state
    }

    /// Run the simulation to its horizon and produce the final report.
    pub fn run(&mut self) -> Result<RunReport> {
        while self.state.day < self.cfg.horizon_days {
            self.step_day().context("failed to step day")?;
            if self.state.day % params::DAYS_PER_MONTH == 0 {
                let progress = 100.0 * self.state.day as f64 / self.cfg.horizon_days as f64;
                log::info!("completed {progress:06.2}%");
            }
        }
        periodic::scan_best_quarter(&mut self.state);
        Ok(RunReport::from_state(&self.state))
    }

    /// Advance the simulation by one day.
    pub fn step_day(&mut self) -> Result<()> {
        self.state.day += 1;

        periodic::refresh_roster(&mut self.state);
        periodic::absorb_hires(&mut self.state);
        periodic::run_hiring_cycle(&mut self.state);
        let unstable = periodic::update_instability(&mut self.state);

        let mut demand = DailyDemand::size_day(&mut self.rng, &self.state)
            .context("failed to size daily demand")?;
        let (business, off_hours) = schedule::split_day(demand.total_arrivals);

        let weekday = self.state.is_weekday();
        if weekday {
            let minutes = schedule::business_arrival_minutes(&mut self.rng, business)
                .context("failed to draw arrival times")?;
            let day_offset = (self.state.day - 1) as f64 * params::WORKDAY_MINUTES;
            for minute in minutes {
                let force_new = demand.draw_forced_new(&mut self.rng);
                let ctx = ArrivalCtx {
                    business_hours: true,
                    weekday: true,
                    unstable,
                    clock: Some(day_offset + minute),
                };
                arrival::process_arrival(&mut self.rng, &mut self.state, ctx, force_new)
                    .context("failed to process arrival")?;
            }
        }
        for _ in 0..off_hours {
            let force_new = demand.draw_forced_new(&mut self.rng);
            let ctx = ArrivalCtx {
                business_hours: false,
                weekday,
                unstable,
                clock: None,
            };
            arrival::process_arrival(&mut self.rng, &mut self.state, ctx, force_new)
                .context("failed to process arrival")?;
        }

        if self.state.day % params::DAYS_PER_WEEK == 0 {
            periodic::close_week(&mut self.rng, &mut self.state)
                .context("failed to close week")?;
        }
        if self.state.day % params::DAYS_PER_MONTH == 0 {
            periodic::bill_subscriptions(&mut self.rng, &mut self.state)
                .context("failed to bill subscriptions")?;
            periodic::reset_marketing(&mut self.state);
        }
        if self.state.day % params::DAYS_PER_MONTH == 1 {
            periodic::pay_development(&mut self.state);
        }

        periodic::record_day(&mut self.state);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(horizon_days: u32) -> Config {
        Config {
            horizon_days,
            release_cadence_days: 30,
            marketing_budget_monthly: 2000.0,
            seed: Some(42),
            runs: 1,
        }
    }

    #[test]
    fn run_produces_one_profit_entry_per_day() {
        let mut engine = Engine::new(test_config(60), 42);
        let report = engine.run().unwrap();
        assert_eq!(engine.state().daily_profit.len(), 60);
        assert_eq!(report.horizon_days, 60);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let report_a = Engine::new(test_config(90), 7).run().unwrap();
        let report_b = Engine::new(test_config(90), 7).run().unwrap();
        assert_eq!(report_a.final_profit, report_b.final_profit);
        assert_eq!(report_a.final_package_holders, report_b.final_package_holders);
        assert_eq!(report_a.breakeven_day, report_b.breakeven_day);
    }

    #[test]
    fn payroll_lands_on_the_first_day_of_each_month() {
        let mut engine = Engine::new(test_config(31), 1);
        engine.step_day().unwrap();
        assert_eq!(
            engine.state().development_cost,
            params::MONTHLY_DEVELOPMENT_COST
        );
        for _ in 0..29 {
            engine.step_day().unwrap();
        }
        assert_eq!(
            engine.state().development_cost,
            params::MONTHLY_DEVELOPMENT_COST
        );
        engine.step_day().unwrap();
        assert_eq!(
            engine.state().development_cost,
            2.0 * params::MONTHLY_DEVELOPMENT_COST
        );
    }

    #[test]
    fn weekly_snapshots_accumulate() {
        let mut engine = Engine::new(test_config(28), 3);
        for _ in 0..28 {
            engine.step_day().unwrap();
        }
        assert_eq!(engine.state().weekly.len(), 4);
    }

    #[test]
    fn populations_stay_bounded() {
        let mut engine = Engine::new(test_config(120), 11);
        for _ in 0..120 {
            engine.step_day().unwrap();
            let state = engine.state();
            assert_eq!(
                state.subscriptions_total,
                state.loyal_subscription + state.standard_subscription
            );
            assert_eq!(
                state.prepaid_total,
                state.loyal_prepaid + state.standard_prepaid
            );
            assert!(state.dissatisfied_subscription <= state.subscriptions_total);
            assert!(state.dissatisfied_prepaid <= state.prepaid_total);
            assert!(state.prepaid_balance >= 0.0);
            assert!(!state.dev_pool.is_empty());
            assert!(!state.apps_it_pool.is_empty());
        }
    }
}
