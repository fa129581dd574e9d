//! Periodic processes: the daily roster, the 21-day hiring cycle, weekly
//! attrition and snapshots, monthly billing and payroll, break-even and
//! best-quarter tracking.

use crate::dist;
use crate::metrics::WeeklyMetrics;
use crate::params;
use crate::state::{BestQuarter, HireIntake, LossReason, SimState, TechStatus};
use anyhow::Result;
use rand::Rng;

/// Technicians start every day free; unfinished work does not carry over.
pub fn refresh_roster(state: &mut SimState) {
    for slot in state.dev_pool.iter_mut().chain(state.apps_it_pool.iter_mut()) {
        *slot = TechStatus::Free;
    }
}

/// Fold due hires into the pools.
pub fn absorb_hires(state: &mut SimState) {
    let day = state.day;
    let mut due = (0, 0);
    state.pending_hires.retain(|intake| {
        if intake.arrival_day <= day {
            due.0 += intake.dev;
            due.1 += intake.apps_it;
            false
        } else {
            true
        }
    });
    state.dev_pool.extend(std::iter::repeat_n(TechStatus::Free, due.0));
    state
        .apps_it_pool
        .extend(std::iter::repeat_n(TechStatus::Free, due.1));
}

/// Every 21 days, size a hiring intake from the jobs lost since the last
/// cycle. Recruits take a full cycle to arrive.
pub fn run_hiring_cycle(state: &mut SimState) {
    if state.day == 0 || state.day % params::HIRING_CYCLE_DAYS != 0 {
        return;
    }
    let dev = (state.lost_jobs.development as f64 * params::DEV_HIRES_PER_LOST_JOB).round() as usize;
    let apps_it =
        (state.lost_jobs.apps_it as f64 * params::APPS_IT_HIRES_PER_LOST_JOB).round() as usize;
    if dev > 0 || apps_it > 0 {
        state.pending_hires.push(HireIntake {
            arrival_day: state.day + params::HIRING_CYCLE_DAYS,
            dev,
            apps_it,
        });
    }
    state.lost_jobs = Default::default();
}

/// Release cadence: a release lands every `release_cadence_days` days and
/// leaves a proportional tail of unstable days behind it.
pub fn update_instability(state: &mut SimState) -> bool {
    let cadence = state.release_cadence_days;
    if state.day - state.last_release_day >= cadence {
        state.last_release_day = state.day;
        state.instability_days_left =
            (cadence as f64 * params::INSTABILITY_DAYS_SHARE).ceil() as u32;
        return true;
    }
    if state.instability_days_left > 0 {
        state.instability_days_left -= 1;
        return true;
    }
    false
}

/// Weekly close: technician attrition, calendarization adjustment from the
/// score trend, a metrics snapshot, and the loss tally reset.
pub fn close_week(rng: &mut impl Rng, state: &mut SimState) -> Result<()> {
    apply_attrition(rng, state)?;

    let score = state.engagement_score();
    let change = if state.prev_week_score > 0.0 {
        (score - state.prev_week_score) / state.prev_week_score
    } else {
        0.0
    };
    state.calendar_adjustment = change / 5.0;
    state.prev_week_score = score;

    state.weekly.push(WeeklyMetrics::capture(state));
    state.week_losses = Default::default();
    Ok(())
}

/// Each technician independently quits with a small weekly probability;
/// a pool never drops below one head.
fn apply_attrition(rng: &mut impl Rng, state: &mut SimState) -> Result<()> {
    let dev_quits =
        dist::binomial(rng, state.dev_pool.len() as u64, params::WEEKLY_ATTRITION_PROB)? as usize;
    if dev_quits > 0 {
        let keep = state.dev_pool.len().saturating_sub(dev_quits).max(1);
        state.dev_pool.truncate(keep);
    }
    let apps_quits = dist::binomial(
        rng,
        state.apps_it_pool.len() as u64,
        params::WEEKLY_ATTRITION_PROB,
    )? as usize;
    if apps_quits > 0 {
        let keep = state.apps_it_pool.len().saturating_sub(apps_quits).max(1);
        state.apps_it_pool.truncate(keep);
    }
    Ok(())
}

/// Monthly subscription billing, preceded by the churn of dissatisfied
/// subscribers who decline to renew.
pub fn bill_subscriptions(rng: &mut impl Rng, state: &mut SimState) -> Result<()> {
    if state.dissatisfied_subscription > 0 {
        let departures = dist::binomial(
            rng,
            u64::from(state.dissatisfied_subscription),
            params::PROB_SUBSCRIPTION_NON_RENEWAL,
        )? as u32;
        let departures = departures.min(state.subscriptions_total);
        if departures > 0 {
            drop_subscribers(state, departures);
        }
    }

    let income = state.subscriptions_total as f64 * params::SUBSCRIPTION_MONTHLY_PRICE;
    state.incoming_credits += income;
    state.net_profit_subscription += income;
    Ok(())
}

fn drop_subscribers(state: &mut SimState, departures: u32) {
    state.week_losses.add(LossReason::SubscriptionNonRenewal, departures);
    state.subscriptions_total -= departures;
    state.package_holders = state.package_holders.saturating_sub(departures);

    let total = state.loyal_subscription + state.standard_subscription;
    if total > 0 {
        let loyal_share = state.loyal_subscription as f64 / total as f64;
        let mut loyal_drops =
            ((departures as f64 * loyal_share).round() as u32).min(state.loyal_subscription);
        let standard_drops = (departures - loyal_drops).min(state.standard_subscription);
        loyal_drops = departures - standard_drops;
        state.loyal_subscription = state.loyal_subscription.saturating_sub(loyal_drops);
        state.standard_subscription -= standard_drops;
        state.dissatisfied_loyal = state.dissatisfied_loyal.saturating_sub(loyal_drops);
        state.dissatisfied_standard = state.dissatisfied_standard.saturating_sub(standard_drops);
    }
    state.dissatisfied_subscription = state.dissatisfied_subscription.saturating_sub(departures);
}

/// Monthly marketing budget reset.
pub fn reset_marketing(state: &mut SimState) {
    state.marketing_spent_month = 0.0;
}

/// Fixed monthly platform development payroll.
pub fn pay_development(state: &mut SimState) {
    state.development_cost += params::MONTHLY_DEVELOPMENT_COST;
}

/// End-of-day accounting: break-even detection, the cumulative profit
/// series, and the incremental quarter check.
pub fn record_day(state: &mut SimState) {
    let profit = state.cumulative_profit();
    if state.breakeven_day.is_none() && profit > 0.0 {
        state.breakeven_day = Some(state.day);
    }
    state.daily_profit.push(profit);

    if state.day >= params::QUARTER_DAYS && state.day % params::QUARTER_DAYS == 0 {
        consider_quarter(state, state.day);
    }
}

/// Final pass: slide the 120-day window over the whole profit history so
/// the best quarter can start on any day.
pub fn scan_best_quarter(state: &mut SimState) {
    let days = state.daily_profit.len() as u32;
    for end in params::QUARTER_DAYS..=days {
        consider_quarter(state, end);
    }
}

fn consider_quarter(state: &mut SimState, end_day: u32) {
    let end_profit = state.daily_profit[end_day as usize - 1];
    let start_profit = if end_day > params::QUARTER_DAYS {
        state.daily_profit[(end_day - params::QUARTER_DAYS) as usize - 1]
    } else {
        0.0
    };
    let profit = end_profit - start_profit;
    let better = state.best_quarter.is_none_or(|best| profit > best.profit);
    if better {
        state.best_quarter = Some(BestQuarter {
            start_day: end_day - params::QUARTER_DAYS + 1,
            end_day,
            profit,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn roster_refresh_frees_every_slot() {
        let mut state = SimState::new(10, 30, 2000.0);
        state.dev_pool[1] = TechStatus::BusyUntil(900.0);
        refresh_roster(&mut state);
        assert!(state.dev_pool.iter().all(|slot| *slot == TechStatus::Free));
    }

    #[test]
    fn hires_land_one_cycle_later() {
        let mut state = SimState::new(100, 30, 2000.0);
        state.day = 21;
        state.lost_jobs.development = 10;
        state.lost_jobs.apps_it = 20;
        run_hiring_cycle(&mut state);
        assert_eq!(state.pending_hires.len(), 1);
        assert_eq!(state.pending_hires[0].arrival_day, 42);
        assert_eq!(state.pending_hires[0].dev, 2);
        assert_eq!(state.pending_hires[0].apps_it, 2);
        assert_eq!(state.lost_jobs.development, 0);

        let dev_before = state.dev_pool.len();
        state.day = 42;
        absorb_hires(&mut state);
        assert_eq!(state.dev_pool.len(), dev_before + 2);
        assert!(state.pending_hires.is_empty());
    }

    #[test]
    fn instability_tail_follows_each_release() {
        let mut state = SimState::new(100, 10, 2000.0);
        let mut unstable_days = 0;
        for day in 1..=10 {
            state.day = day;
            if update_instability(&mut state) {
                unstable_days += 1;
            }
        }
        // Release on day 10 plus ceil(10 * 0.15) = 2 trailing days booked.
        assert_eq!(unstable_days, 1);
        assert_eq!(state.last_release_day, 10);
        assert_eq!(state.instability_days_left, 2);
    }

    #[test]
    fn weekly_close_tracks_the_score_trend() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let mut state = SimState::new(100, 30, 2000.0);
        state.day = 7;
        state.week_losses.record(LossReason::NoTechnician);
        close_week(&mut rng, &mut state).unwrap();
        // Score unchanged since initialization: no adjustment.
        assert_eq!(state.calendar_adjustment, 0.0);
        assert_eq!(state.weekly.len(), 1);
        assert_eq!(state.weekly[0].losses.no_technician, 1);
        assert_eq!(state.week_losses.total(), 0);
    }

    #[test]
    fn attrition_never_empties_a_pool() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let mut state = SimState::new(100, 30, 2000.0);
        state.dev_pool = vec![TechStatus::Free; 1];
        for _ in 0..500 {
            apply_attrition(&mut rng, &mut state).unwrap();
        }
        assert!(!state.dev_pool.is_empty());
    }

    #[test]
    fn subscription_billing_books_monthly_income() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let mut state = SimState::new(100, 30, 2000.0);
        state.dissatisfied_subscription = 0;
        bill_subscriptions(&mut rng, &mut state).unwrap();
        let expected = 47.0 * params::SUBSCRIPTION_MONTHLY_PRICE;
        assert!((state.incoming_credits - expected).abs() < 1e-9);
        assert_eq!(state.subscriptions_total, 47);
    }

    #[test]
    fn dissatisfied_subscribers_churn_at_billing() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let mut state = SimState::new(100, 30, 2000.0);
        state.dissatisfied_subscription = 20;
        state.dissatisfied_standard = 20;
        bill_subscriptions(&mut rng, &mut state).unwrap();
        assert!(state.subscriptions_total < 47);
        assert_eq!(
            state.subscriptions_total,
            state.loyal_subscription + state.standard_subscription
        );
        assert_eq!(
            state.week_losses.subscription_non_renewal,
            47 - state.subscriptions_total
        );
    }

    #[test]
    fn breakeven_is_the_first_profitable_day() {
        let mut state = SimState::new(100, 30, 2000.0);
        state.day = 1;
        state.development_cost = 100.0;
        record_day(&mut state);
        assert_eq!(state.breakeven_day, None);
        state.day = 2;
        state.net_profit_jobs = 150.0;
        record_day(&mut state);
        assert_eq!(state.breakeven_day, Some(2));
        state.day = 3;
        state.net_profit_jobs = 80.0;
        record_day(&mut state);
        assert_eq!(state.breakeven_day, Some(2));
    }

    #[test]
    fn best_quarter_scan_finds_the_peak_window() {
        let mut state = SimState::new(300, 30, 2000.0);
        // Profit grows by 1 per day for 140 days, then stalls.
        let mut cumulative = 0.0;
        for day in 1..=300u32 {
            if day <= 140 {
                cumulative += 1.0;
            }
            state.daily_profit.push(cumulative);
        }
        scan_best_quarter(&mut state);
        let best = state.best_quarter.unwrap();
        assert_eq!(best.profit, 120.0);
        assert_eq!(best.end_day - best.start_day + 1, params::QUARTER_DAYS);
        assert!(best.end_day <= 140);
    }
}
