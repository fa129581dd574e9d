//! Simulation state: the single mutable aggregate owned by one run.
//!
//! Every component receives `&mut SimState`; nothing is shared across runs.
//! Counter mutations clamp at zero and at the bounding population, so the
//! invariants of the model hold by construction.

use crate::params;
use serde::Serialize;

/// Status of one technician slot within a pool.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TechStatus {
    Free,
    /// Busy until the given absolute clock value (minutes).
    BusyUntil(f64),
}

impl TechStatus {
    pub fn available_at(self, clock: f64) -> bool {
        match self {
            TechStatus::Free => true,
            TechStatus::BusyUntil(until) => until <= clock,
        }
    }
}

/// Pending hiring intake: headcount increases landing on a future day.
#[derive(Debug, Clone, Copy)]
pub struct HireIntake {
    pub arrival_day: u32,
    pub dev: usize,
    pub apps_it: usize,
}

/// Jobs lost for want of a technician, tallied per hiring cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct LostJobs {
    pub development: u32,
    pub apps_it: u32,
}

/// Reasons a customer (or a calendarized job) is lost, tallied per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossReason {
    NoTechnician,
    CalendarRegret,
    OneOffDissatisfied,
    PrepaidAbandon,
    PrepaidNonRenewal,
    SubscriptionNonRenewal,
}

/// Weekly loss tally, reset after each weekly snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct LossTally {
    pub no_technician: u32,
    pub calendar_regret: u32,
    pub one_off_dissatisfied: u32,
    pub prepaid_abandon: u32,
    pub prepaid_non_renewal: u32,
    pub subscription_non_renewal: u32,
}

impl LossTally {
    pub fn record(&mut self, reason: LossReason) {
        self.add(reason, 1);
    }

    pub fn add(&mut self, reason: LossReason, count: u32) {
        let slot = match reason {
            LossReason::NoTechnician => &mut self.no_technician,
            LossReason::CalendarRegret => &mut self.calendar_regret,
            LossReason::OneOffDissatisfied => &mut self.one_off_dissatisfied,
            LossReason::PrepaidAbandon => &mut self.prepaid_abandon,
            LossReason::PrepaidNonRenewal => &mut self.prepaid_non_renewal,
            LossReason::SubscriptionNonRenewal => &mut self.subscription_non_renewal,
        };
        *slot += count;
    }

    pub fn total(&self) -> u32 {
        self.no_technician
            + self.calendar_regret
            + self.one_off_dissatisfied
            + self.prepaid_abandon
            + self.prepaid_non_renewal
            + self.subscription_non_renewal
    }
}

/// Highest-profit trailing 120-day window found so far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BestQuarter {
    pub start_day: u32,
    pub end_day: u32,
    pub profit: f64,
}

/// The mutable ledger of one simulation run.
#[derive(Debug, Clone)]
pub struct SimState {
    // Control parameters.
    pub horizon_days: u32,
    pub release_cadence_days: u32,
    pub marketing_budget_monthly: f64,
    /// Current simulated day, starting at 0 before the first step.
    pub day: u32,

    // Customer counts: {loyal, standard} x {subscription, prepaid} packages,
    // plus the one-off pool and the package-holder total.
    pub one_off_pool: u32,
    pub loyal_subscription: u32,
    pub loyal_prepaid: u32,
    pub standard_subscription: u32,
    pub standard_prepaid: u32,
    pub package_holders: u32,
    pub subscriptions_total: u32,
    pub prepaid_total: u32,

    // Dissatisfaction counters, each bounded by its population.
    pub dissatisfied_loyal: u32,
    pub dissatisfied_standard: u32,
    pub dissatisfied_prepaid: u32,
    pub dissatisfied_subscription: u32,

    // Financial accumulators (credits).
    pub incoming_credits: f64,
    pub marketing_cost: f64,
    pub marketing_spent_month: f64,
    pub technician_cost: f64,
    pub compensation_cost: f64,
    pub development_cost: f64,
    pub net_profit_jobs: f64,
    pub net_profit_prepaid: f64,
    pub net_profit_subscription: f64,

    /// Single shared prepaid credit block backing all prepaid customers.
    pub prepaid_balance: f64,

    // Release instability tracking.
    pub last_release_day: u32,
    pub instability_days_left: u32,

    // Weekly calendarization adjustment.
    pub prev_week_score: f64,
    pub calendar_adjustment: f64,

    // Technician pools: one busy-until slot per head.
    pub dev_pool: Vec<TechStatus>,
    pub apps_it_pool: Vec<TechStatus>,
    pub pending_hires: Vec<HireIntake>,
    pub lost_jobs: LostJobs,

    // Metrics.
    pub week_losses: LossTally,
    pub breakeven_day: Option<u32>,
    pub best_quarter: Option<BestQuarter>,
    /// Cumulative net profit at the close of each day, one entry per day.
    pub daily_profit: Vec<f64>,
    pub weekly: Vec<crate::metrics::WeeklyMetrics>,
}

impl SimState {
    pub fn new(horizon_days: u32, release_cadence_days: u32, marketing_budget_monthly: f64) -> Self {
        Self {
            horizon_days,
            release_cadence_days,
            marketing_budget_monthly,
            day: 0,
            one_off_pool: params::INITIAL_ONE_OFF_POOL,
            loyal_subscription: params::INITIAL_LOYAL_SUBSCRIPTION,
            loyal_prepaid: params::INITIAL_LOYAL_PREPAID,
            standard_subscription: params::INITIAL_STANDARD_SUBSCRIPTION,
            standard_prepaid: params::INITIAL_STANDARD_PREPAID,
            package_holders: params::INITIAL_PACKAGE_HOLDERS,
            subscriptions_total: params::INITIAL_LOYAL_SUBSCRIPTION
                + params::INITIAL_STANDARD_SUBSCRIPTION,
            prepaid_total: params::INITIAL_LOYAL_PREPAID + params::INITIAL_STANDARD_PREPAID,
            dissatisfied_loyal: 0,
            dissatisfied_standard: 0,
            dissatisfied_prepaid: 0,
            dissatisfied_subscription: 0,
            incoming_credits: 0.0,
            marketing_cost: 0.0,
            marketing_spent_month: 0.0,
            technician_cost: 0.0,
            compensation_cost: 0.0,
            development_cost: 0.0,
            net_profit_jobs: 0.0,
            net_profit_prepaid: 0.0,
            net_profit_subscription: 0.0,
            prepaid_balance: params::PREPAID_BLOCK_CREDITS,
            last_release_day: 0,
            instability_days_left: 0,
            prev_week_score: params::INITIAL_PREV_WEEK_SCORE,
            calendar_adjustment: 0.0,
            dev_pool: vec![TechStatus::Free; params::INITIAL_DEV_TECHNICIANS],
            apps_it_pool: vec![TechStatus::Free; params::INITIAL_APPS_IT_TECHNICIANS],
            pending_hires: Vec::new(),
            lost_jobs: LostJobs::default(),
            week_losses: LossTally::default(),
            breakeven_day: None,
            best_quarter: None,
            daily_profit: Vec::with_capacity(horizon_days as usize),
            weekly: Vec::new(),
        }
    }

    pub fn loyal_total(&self) -> u32 {
        self.loyal_subscription + self.loyal_prepaid
    }

    pub fn standard_total(&self) -> u32 {
        self.standard_subscription + self.standard_prepaid
    }

    /// Engagement score: 2 x loyal + package holders - loyal.
    pub fn engagement_score(&self) -> f64 {
        let loyal = self.loyal_total() as f64;
        loyal * 2.0 + self.package_holders as f64 - loyal
    }

    /// Cumulative net profit: job + prepaid + subscription nets, minus
    /// development and marketing costs.
    pub fn cumulative_profit(&self) -> f64 {
        self.net_profit_jobs + self.net_profit_prepaid + self.net_profit_subscription
            - self.development_cost
            - self.marketing_cost
    }

    /// Business-hours arrivals are processed Monday through Friday only.
    pub fn is_weekday(&self) -> bool {
        self.day % params::DAYS_PER_WEEK <= 4
    }

    // --- Clamped dissatisfaction mutations ---

    pub fn mark_dissatisfied_loyal(&mut self) {
        self.dissatisfied_loyal = (self.dissatisfied_loyal + 1).min(self.loyal_total());
    }

    pub fn mark_dissatisfied_standard(&mut self) {
        self.dissatisfied_standard = (self.dissatisfied_standard + 1).min(self.standard_total());
    }

    pub fn mark_dissatisfied_prepaid(&mut self) {
        self.dissatisfied_prepaid = (self.dissatisfied_prepaid + 1).min(self.prepaid_total);
    }

    pub fn mark_dissatisfied_subscription(&mut self) {
        self.dissatisfied_subscription =
            (self.dissatisfied_subscription + 1).min(self.subscriptions_total);
    }

    pub fn recover_loyal(&mut self) {
        self.dissatisfied_loyal = self.dissatisfied_loyal.saturating_sub(1);
    }

    pub fn recover_standard(&mut self) {
        self.dissatisfied_standard = self.dissatisfied_standard.saturating_sub(1);
    }

    pub fn recover_prepaid(&mut self) {
        self.dissatisfied_prepaid = self.dissatisfied_prepaid.saturating_sub(1);
    }

    pub fn recover_subscription(&mut self) {
        self.dissatisfied_subscription = self.dissatisfied_subscription.saturating_sub(1);
    }

    // --- Package bookkeeping ---

    pub fn add_subscription(&mut self, loyal: bool) {
        self.subscriptions_total += 1;
        self.package_holders += 1;
        if loyal {
            self.loyal_subscription += 1;
        } else {
            self.standard_subscription += 1;
        }
    }

    /// Counter update only; the shared prepaid block is not grown per head.
    pub fn add_prepaid(&mut self, loyal: bool) {
        self.prepaid_total += 1;
        self.package_holders += 1;
        if loyal {
            self.loyal_prepaid += 1;
        } else {
            self.standard_prepaid += 1;
        }
    }
}
