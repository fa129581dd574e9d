//! Run observables: weekly snapshots and the end-of-run report.

use crate::state::{BestQuarter, LossTally, SimState};
use serde::Serialize;

/// Snapshot taken at the close of every seventh day.
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyMetrics {
    pub week: u32,
    pub day: u32,
    pub engagement_score: f64,

    pub one_off_pool: u32,
    pub package_holders: u32,
    pub loyal_customers: u32,
    pub subscriptions: u32,
    pub prepaid: u32,
    pub dev_technicians: usize,
    pub apps_it_technicians: usize,

    pub dissatisfied_prepaid_pct: f64,
    pub dissatisfied_subscription_pct: f64,
    pub dissatisfied_overall_pct: f64,

    pub net_profit_jobs: f64,
    pub net_profit_prepaid: f64,
    pub net_profit_subscription: f64,
    pub cumulative_profit: f64,

    pub marketing_cost: f64,
    pub technician_cost: f64,
    pub compensation_cost: f64,
    pub development_cost: f64,

    pub losses: LossTally,
    pub losses_total: u32,
}

fn pct(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

impl WeeklyMetrics {
    pub fn capture(state: &SimState) -> Self {
        Self {
            week: state.day / crate::params::DAYS_PER_WEEK,
            day: state.day,
            engagement_score: state.engagement_score(),
            one_off_pool: state.one_off_pool,
            package_holders: state.package_holders,
            loyal_customers: state.loyal_total(),
            subscriptions: state.subscriptions_total,
            prepaid: state.prepaid_total,
            dev_technicians: state.dev_pool.len(),
            apps_it_technicians: state.apps_it_pool.len(),
            dissatisfied_prepaid_pct: pct(state.dissatisfied_prepaid, state.prepaid_total),
            dissatisfied_subscription_pct: pct(
                state.dissatisfied_subscription,
                state.subscriptions_total,
            ),
            dissatisfied_overall_pct: pct(
                state.dissatisfied_loyal + state.dissatisfied_standard,
                state.package_holders,
            ),
            net_profit_jobs: state.net_profit_jobs,
            net_profit_prepaid: state.net_profit_prepaid,
            net_profit_subscription: state.net_profit_subscription,
            cumulative_profit: state.cumulative_profit(),
            marketing_cost: state.marketing_cost,
            technician_cost: state.technician_cost,
            compensation_cost: state.compensation_cost,
            development_cost: state.development_cost,
            losses: state.week_losses,
            losses_total: state.week_losses.total(),
        }
    }
}

/// End-of-run summary written as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub horizon_days: u32,
    pub final_profit: f64,
    pub net_profit_jobs: f64,
    pub net_profit_prepaid: f64,
    pub net_profit_subscription: f64,
    pub incoming_credits: f64,
    pub technician_cost: f64,
    pub compensation_cost: f64,
    pub development_cost: f64,
    pub marketing_cost: f64,
    pub breakeven_day: Option<u32>,
    pub best_quarter: Option<BestQuarter>,
    pub final_one_off_pool: u32,
    pub final_package_holders: u32,
    pub final_loyal_customers: u32,
    pub final_subscriptions: u32,
    pub final_prepaid: u32,
    pub final_dev_technicians: usize,
    pub final_apps_it_technicians: usize,
    pub weekly: Vec<WeeklyMetrics>,
}

impl RunReport {
    pub fn from_state(state: &SimState) -> Self {
        Self {
            horizon_days: state.horizon_days,
            final_profit: state.cumulative_profit(),
            net_profit_jobs: state.net_profit_jobs,
            net_profit_prepaid: state.net_profit_prepaid,
            net_profit_subscription: state.net_profit_subscription,
            incoming_credits: state.incoming_credits,
            technician_cost: state.technician_cost,
            compensation_cost: state.compensation_cost,
            development_cost: state.development_cost,
            marketing_cost: state.marketing_cost,
            breakeven_day: state.breakeven_day,
            best_quarter: state.best_quarter,
            final_one_off_pool: state.one_off_pool,
            final_package_holders: state.package_holders,
            final_loyal_customers: state.loyal_total(),
            final_subscriptions: state.subscriptions_total,
            final_prepaid: state.prepaid_total,
            final_dev_technicians: state.dev_pool.len(),
            final_apps_it_technicians: state.apps_it_pool.len(),
            weekly: state.weekly.clone(),
        }
    }
}
