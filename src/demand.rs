//! Daily demand sizing: how many service requests arrive today and how
//! many of them come through the marketing channel as brand-new clients.

use crate::dist;
use crate::params;
use crate::state::SimState;
use anyhow::Result;
use rand::Rng;

/// Demand drawn for one day, consumed arrival by arrival.
#[derive(Debug, Clone, Copy)]
pub struct DailyDemand {
    pub total_arrivals: u32,
    remaining_arrivals: u32,
    remaining_new: u32,
}

impl DailyDemand {
    /// Draw today's demand. The loyal channel is negative-binomial in the
    /// loyal population; the marketing channel is Poisson in the daily
    /// marketing rate, capped by the budget left this month.
    pub fn size_day(rng: &mut impl Rng, state: &SimState) -> Result<Self> {
        let loyal = state.loyal_total();
        let loyal_jobs = if loyal == 0 {
            0
        } else {
            let mean = loyal as f64 * params::JOBS_PER_LOYAL_PER_DAY;
            let p = params::DEMAND_NEG_BINOMIAL_P;
            let r = mean * p / (1.0 - p);
            let raw = dist::neg_binomial(rng, r, p);
            raw.clamp(params::DAILY_JOBS_MIN, params::DAILY_JOBS_MAX) as u32
        };

        let daily_rate = state.marketing_budget_monthly
            / params::DAYS_PER_MONTH as f64
            / params::MARKETING_COST_PER_NEW_CLIENT;
        let budget_left =
            (state.marketing_budget_monthly - state.marketing_spent_month).max(0.0);
        let affordable = (budget_left / params::MARKETING_COST_PER_NEW_CLIENT).floor() as u64;
        let new_clients = dist::poisson(rng, daily_rate)?.min(affordable) as u32;

        let total_arrivals = loyal_jobs + new_clients;
        Ok(Self {
            total_arrivals,
            remaining_arrivals: total_arrivals,
            remaining_new: new_clients,
        })
    }

    /// Decide whether the next arrival is one of today's marketing-channel
    /// clients. Drawing without replacement keeps the channel split exact
    /// over the day regardless of arrival order.
    pub fn draw_forced_new(&mut self, rng: &mut impl Rng) -> bool {
        if self.remaining_arrivals == 0 {
            return false;
        }
        let prob = self.remaining_new as f64 / self.remaining_arrivals as f64;
        self.remaining_arrivals -= 1;
        let forced = dist::chance(rng, prob);
        if forced {
            self.remaining_new -= 1;
        }
        forced
    }
}
