//! Per-arrival flow: who the client is, what they need done, whether a
//! technician can take it now, and how satisfaction, billing, churn and
//! conversion play out.

use crate::billing;
use crate::dist;
use crate::params;
use crate::state::{LossReason, SimState, TechStatus};
use anyhow::Result;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagePlan {
    Subscription,
    Prepaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientKind {
    /// Pays per job, no package.
    OneOff,
    Package {
        loyal: bool,
    },
}

/// Identity of the arriving client, drawn at classification time. New
/// package clients carry `plan: None` until first billing settles it.
#[derive(Debug, Clone, Copy)]
pub struct Client {
    pub is_new: bool,
    pub kind: ClientKind,
    pub plan: Option<PackagePlan>,
    /// False when the sampled client was already dissatisfied.
    pub conforming: bool,
}

impl Client {
    fn is_loyal(&self) -> bool {
        matches!(self.kind, ClientKind::Package { loyal: true })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Apps,
    It,
    Development,
}

#[derive(Debug, Clone, Copy)]
pub struct Job {
    pub kind: JobKind,
    pub value: f64,
    pub busy_minutes: f64,
}

/// Where and when the arrival lands.
#[derive(Debug, Clone, Copy)]
pub struct ArrivalCtx {
    pub business_hours: bool,
    pub weekday: bool,
    pub unstable: bool,
    /// Absolute clock in minutes, present for business-hours arrivals.
    pub clock: Option<f64>,
}

/// Terminal result of one arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Marketing budget exhausted, the client never materializes.
    NoShow,
    /// Offered a calendar slot and walked away.
    Regret,
    /// Took the slot but did not show up; penalty billed.
    MissedMeeting,
    /// Deferred to the calendar with no further processing today.
    Calendarized,
    /// Prepaid client abandoned the platform mid-flow.
    Abandoned,
    /// One-off client left dissatisfied.
    Churned,
    /// One-off client bought a package.
    Converted,
    Retained,
}

enum CalendarFate {
    Regret,
    Missed,
    Kept,
}

/// Run one client arrival end to end.
pub fn process_arrival(
    rng: &mut impl Rng,
    state: &mut SimState,
    ctx: ArrivalCtx,
    force_new: bool,
) -> Result<Outcome> {
    let Some(mut client) = classify(rng, state, force_new)? else {
        return Ok(Outcome::NoShow);
    };
    let job = draw_job(rng)?;

    let on_site = ctx.business_hours && ctx.weekday;
    if on_site {
        let clock = ctx.clock.unwrap_or(0.0);
        if !try_assign_technician(state, &job, clock) {
            match job.kind {
                JobKind::Development => state.lost_jobs.development += 1,
                JobKind::Apps | JobKind::It => state.lost_jobs.apps_it += 1,
            }
            state.week_losses.record(LossReason::NoTechnician);
            return match calendar_fate(rng, state, &client)? {
                CalendarFate::Regret => {
                    state.week_losses.record(LossReason::CalendarRegret);
                    Ok(Outcome::Regret)
                }
                CalendarFate::Missed => Ok(Outcome::MissedMeeting),
                CalendarFate::Kept => Ok(Outcome::Calendarized),
            };
        }
    }

    // Voluntary calendarization can still happen after a technician has
    // been booked; the slot stays occupied either way.
    let mut calendarized = false;
    let base = if on_site {
        params::PROB_CALENDARIZE_BUSINESS_HOURS
    } else {
        params::PROB_CALENDARIZE_OFF_HOURS
    };
    let prob = (base + state.calendar_adjustment).clamp(0.0, 1.0);
    if dist::beta_chance(rng, prob, params::BETA_CONCENTRATION)? {
        calendarized = true;
        match calendar_fate(rng, state, &client)? {
            CalendarFate::Regret => {
                state.week_losses.record(LossReason::CalendarRegret);
                return Ok(Outcome::Regret);
            }
            CalendarFate::Missed => return Ok(Outcome::MissedMeeting),
            CalendarFate::Kept => {}
        }
    }

    let mut dissat_prob = dist::beta_prob(rng, params::PROB_DISSATISFACTION_BASE, params::BETA_CONCENTRATION)?
        + dist::beta_prob(rng, params::PROB_POOR_CONNECTIVITY, params::BETA_CONCENTRATION)?;
    if ctx.unstable {
        dissat_prob +=
            dist::beta_prob(rng, params::PROB_RELEASE_INSTABILITY, params::BETA_CONCENTRATION)?;
    }
    if calendarized {
        dissat_prob += dist::beta_prob(
            rng,
            params::PROB_DISSATISFACTION_CALENDARIZED,
            params::BETA_CONCENTRATION,
        )?;
    }

    if dist::chance(rng, dissat_prob.min(1.0)) {
        handle_dissatisfied(rng, state, &mut client, &job)
    } else {
        handle_satisfied(rng, state, &mut client, &job)
    }
}

// --- Classification ---

fn classify(rng: &mut impl Rng, state: &mut SimState, force_new: bool) -> Result<Option<Client>> {
    let pre_existing = if force_new {
        false
    } else {
        dist::chance(rng, pre_existing_prob(state.engagement_score()))
    };
    if pre_existing {
        Ok(Some(classify_pre_existing(rng, state)))
    } else {
        Ok(classify_new(rng, state))
    }
}

/// Probability that an unforced arrival is a returning client, driven by
/// the engagement score in 30-point steps above the threshold.
fn pre_existing_prob(score: f64) -> f64 {
    if score <= params::SCORE_THRESHOLD {
        return params::PROB_PRE_EXISTING_BASE;
    }
    let excess = score - params::SCORE_THRESHOLD;
    let increment = ((excess / params::PRE_EXISTING_STEP_POINTS).floor()
        * params::PRE_EXISTING_STEP)
        .min(params::PRE_EXISTING_INCREMENT_MAX);
    (params::PROB_PRE_EXISTING_BASE + increment).min(params::PROB_PRE_EXISTING_MAX)
}

fn classify_new(rng: &mut impl Rng, state: &mut SimState) -> Option<Client> {
    if state.marketing_spent_month >= state.marketing_budget_monthly {
        return None;
    }
    state.marketing_cost += params::MARKETING_COST_PER_NEW_CLIENT;
    state.marketing_spent_month += params::MARKETING_COST_PER_NEW_CLIENT;

    let draw = rng.random::<f64>();
    let kind = if draw < params::NEW_ONE_OFF_CUTOFF {
        ClientKind::OneOff
    } else if draw < params::NEW_STANDARD_CUTOFF {
        ClientKind::Package { loyal: false }
    } else {
        ClientKind::Package { loyal: true }
    };
    Some(Client {
        is_new: true,
        kind,
        plan: None,
        conforming: true,
    })
}

fn classify_pre_existing(rng: &mut impl Rng, state: &SimState) -> Client {
    let loyal = state.loyal_total() as f64;
    let loyal_weight = loyal * 5.0;
    let standard_weight = (state.standard_total() as f64 - loyal).max(0.0);
    let one_off_weight = state.one_off_pool as f64 / 10.0;
    let mut total = loyal_weight + standard_weight + one_off_weight;
    if total <= 0.0 {
        total = 1.0;
    }
    let draw = rng.random::<f64>() * total;

    if draw < loyal_weight {
        let plan = choose_plan(rng, state, true);
        Client {
            is_new: false,
            kind: ClientKind::Package { loyal: true },
            plan: Some(plan),
            conforming: conforming_draw(rng, state.dissatisfied_loyal, state.loyal_total()),
        }
    } else if draw < loyal_weight + standard_weight {
        let plan = choose_plan(rng, state, false);
        Client {
            is_new: false,
            kind: ClientKind::Package { loyal: false },
            plan: Some(plan),
            conforming: conforming_draw(rng, state.dissatisfied_standard, state.standard_total()),
        }
    } else {
        Client {
            is_new: false,
            kind: ClientKind::OneOff,
            plan: None,
            conforming: true,
        }
    }
}

/// Plan split within a segment follows its current proportions.
fn choose_plan(rng: &mut impl Rng, state: &SimState, loyal: bool) -> PackagePlan {
    let (subs, prepaid) = if loyal {
        (state.loyal_subscription, state.loyal_prepaid)
    } else {
        (state.standard_subscription, state.standard_prepaid)
    };
    let total = subs + prepaid;
    if total == 0 {
        return PackagePlan::Subscription;
    }
    if dist::chance(rng, subs as f64 / total as f64) {
        PackagePlan::Subscription
    } else {
        PackagePlan::Prepaid
    }
}

fn conforming_draw(rng: &mut impl Rng, dissatisfied: u32, population: u32) -> bool {
    if population == 0 {
        return true;
    }
    !dist::chance(rng, dissatisfied as f64 / population as f64)
}

// --- Job draw and technician booking ---

fn draw_job(rng: &mut impl Rng) -> Result<Job> {
    let draw = rng.random::<f64>();
    if draw < params::PROB_APPS {
        let minutes = dist::truncated_normal(
            rng,
            params::APPS_DURATION_MEAN_MIN,
            params::APPS_DURATION_STD_MIN,
            0.0,
            f64::INFINITY,
        )?;
        Ok(Job {
            kind: JobKind::Apps,
            value: minutes * params::APPS_RATE_PER_MINUTE,
            busy_minutes: minutes,
        })
    } else if draw < params::PROB_APPS + params::PROB_IT {
        let minutes = dist::truncated_normal(
            rng,
            params::IT_DURATION_MEAN_MIN,
            params::IT_DURATION_STD_MIN,
            0.0,
            f64::INFINITY,
        )?;
        Ok(Job {
            kind: JobKind::It,
            value: minutes * params::IT_RATE_PER_MINUTE,
            busy_minutes: minutes,
        })
    } else {
        let hours = dist::uniform(
            rng,
            params::DEV_DURATION_MIN_HOURS,
            params::DEV_DURATION_MAX_HOURS,
        )?;
        Ok(Job {
            kind: JobKind::Development,
            value: hours * params::DEV_RATE_PER_HOUR,
            busy_minutes: hours * params::MINUTES_PER_HOUR,
        })
    }
}

/// Development jobs need a development technician; apps and IT jobs take a
/// development technician first and fall back to the apps/IT pool.
fn try_assign_technician(state: &mut SimState, job: &Job, clock: f64) -> bool {
    let until = clock + job.busy_minutes;
    if let Some(slot) = state
        .dev_pool
        .iter_mut()
        .find(|slot| slot.available_at(clock))
    {
        *slot = TechStatus::BusyUntil(until);
        return true;
    }
    if job.kind != JobKind::Development {
        if let Some(slot) = state
            .apps_it_pool
            .iter_mut()
            .find(|slot| slot.available_at(clock))
        {
            *slot = TechStatus::BusyUntil(until);
            return true;
        }
    }
    false
}

// --- Calendarization ---

fn calendar_fate(
    rng: &mut impl Rng,
    state: &mut SimState,
    client: &Client,
) -> Result<CalendarFate> {
    if dist::beta_chance(rng, params::PROB_CALENDAR_REGRET, params::BETA_CONCENTRATION)? {
        return Ok(CalendarFate::Regret);
    }
    if dist::beta_chance(rng, params::PROB_MISSED_MEETING, params::BETA_CONCENTRATION)? {
        state.incoming_credits += params::MISSED_MEETING_PENALTY;
        state.net_profit_jobs += params::MISSED_MEETING_PENALTY * params::NET_MARGIN;
        if dist::beta_chance(rng, params::PROB_DISSATISFIED_IF_MISSED, params::BETA_CONCENTRATION)?
            && client.conforming
        {
            mark_first_dissatisfaction(state, client);
        }
        return Ok(CalendarFate::Missed);
    }
    Ok(CalendarFate::Kept)
}

fn mark_first_dissatisfaction(state: &mut SimState, client: &Client) {
    match client.kind {
        ClientKind::Package { loyal: true } => state.mark_dissatisfied_loyal(),
        ClientKind::Package { loyal: false } => {
            state.mark_dissatisfied_standard();
            match client.plan {
                Some(PackagePlan::Prepaid) => state.mark_dissatisfied_prepaid(),
                Some(PackagePlan::Subscription) => state.mark_dissatisfied_subscription(),
                None => {}
            }
        }
        ClientKind::OneOff => {}
    }
}

// --- Satisfaction outcomes ---

fn handle_dissatisfied(
    rng: &mut impl Rng,
    state: &mut SimState,
    client: &mut Client,
    job: &Job,
) -> Result<Outcome> {
    let billable = if job.kind == JobKind::Development {
        dist::beta_chance(rng, params::PROB_BILL_DEVELOPMENT, params::BETA_CONCENTRATION)?
    } else {
        !dist::beta_chance(rng, params::PROB_WAIVE_NON_DEVELOPMENT, params::BETA_CONCENTRATION)?
    };

    if client.is_loyal() {
        if billable {
            state.net_profit_jobs += job.value * params::NET_MARGIN;
        } else {
            state.net_profit_jobs -= job.value;
            state.compensation_cost += job.value;
        }
        if client.conforming {
            state.mark_dissatisfied_loyal();
        }
    } else if !billable {
        if client.plan == Some(PackagePlan::Prepaid) {
            if client.conforming {
                state.mark_dissatisfied_standard();
                state.mark_dissatisfied_prepaid();
            } else if dist::beta_chance(rng, params::PROB_PREPAID_ABANDON, params::BETA_CONCENTRATION)? {
                state.week_losses.record(LossReason::PrepaidAbandon);
                billing::remove_prepaid_customer(rng, state);
                return Ok(Outcome::Abandoned);
            } else if dist::beta_chance(rng, params::PROB_PACIFY, params::BETA_CONCENTRATION)? {
                // The waived bill wins them back.
                state.recover_standard();
                state.recover_prepaid();
            }
        } else if !dist::beta_chance(rng, params::PROB_PACIFY, params::BETA_CONCENTRATION)? {
            match client.kind {
                ClientKind::Package { .. } => {
                    if client.conforming {
                        state.mark_dissatisfied_standard();
                        if client.plan == Some(PackagePlan::Subscription) {
                            state.mark_dissatisfied_subscription();
                        }
                    }
                }
                ClientKind::OneOff => {
                    if !client.is_new {
                        state.one_off_pool = state.one_off_pool.saturating_sub(1);
                        state.week_losses.record(LossReason::OneOffDissatisfied);
                    }
                    return Ok(Outcome::Churned);
                }
            }
        }
    } else if let ClientKind::Package { loyal: false } = client.kind {
        if client.conforming {
            state.mark_dissatisfied_standard();
            match client.plan {
                Some(PackagePlan::Prepaid) => state.mark_dissatisfied_prepaid(),
                Some(PackagePlan::Subscription) => state.mark_dissatisfied_subscription(),
                None => {}
            }
        }
    }

    if billable {
        billing::route_payment(rng, state, client, job.value, true, true)?;
    }
    Ok(Outcome::Retained)
}

fn handle_satisfied(
    rng: &mut impl Rng,
    state: &mut SimState,
    client: &mut Client,
    job: &Job,
) -> Result<Outcome> {
    state.net_profit_jobs += job.value * params::NET_MARGIN;
    billing::route_payment(rng, state, client, job.value, false, true)?;

    // A good job recovers a previously dissatisfied client.
    if !client.conforming {
        match client.kind {
            ClientKind::Package { loyal: true } => state.recover_loyal(),
            ClientKind::Package { loyal: false } => {
                state.recover_standard();
                match client.plan {
                    Some(PackagePlan::Subscription) => state.recover_subscription(),
                    Some(PackagePlan::Prepaid) => state.recover_prepaid(),
                    None => {}
                }
            }
            ClientKind::OneOff => {}
        }
    }

    if !client.is_new
        && client.kind == ClientKind::OneOff
        && dist::beta_chance(rng, params::PROB_CONVERT_ONE_OFF, params::BETA_CONCENTRATION)?
    {
        return convert_one_off(rng, state);
    }
    Ok(Outcome::Retained)
}

/// A satisfied one-off client signs up for a package.
fn convert_one_off(rng: &mut impl Rng, state: &mut SimState) -> Result<Outcome> {
    let plan = choose_plan(rng, state, false);
    match plan {
        PackagePlan::Subscription => {
            state.incoming_credits += params::SUBSCRIPTION_MONTHLY_PRICE;
            state.net_profit_subscription += params::SUBSCRIPTION_MONTHLY_PRICE;
            state.add_subscription(false);
        }
        PackagePlan::Prepaid => {
            state.incoming_credits += params::PREPAID_RENEWAL_PRICE;
            state.net_profit_prepaid += params::PREPAID_RENEWAL_PRICE;
            state.add_prepaid(false);
        }
    }
    if dist::beta_chance(rng, params::PROB_LOYAL_AFTER_CONVERSION, params::BETA_CONCENTRATION)? {
        promote_to_loyal(state, plan);
    }
    state.one_off_pool = state.one_off_pool.saturating_sub(1);
    Ok(Outcome::Converted)
}

fn promote_to_loyal(state: &mut SimState, plan: PackagePlan) {
    match plan {
        PackagePlan::Subscription => {
            if state.standard_subscription > 0 {
                state.standard_subscription -= 1;
                state.loyal_subscription += 1;
            }
        }
        PackagePlan::Prepaid => {
            if state.standard_prepaid > 0 {
                state.standard_prepaid -= 1;
                state.loyal_prepaid += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    fn business_ctx() -> ArrivalCtx {
        ArrivalCtx {
            business_hours: true,
            weekday: true,
            unstable: false,
            clock: Some(0.0),
        }
    }

    #[test]
    fn exhausted_budget_turns_forced_new_into_no_show() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        let mut state = SimState::new(10, 30, 500.0);
        state.marketing_spent_month = 500.0;
        let outcome = process_arrival(&mut rng, &mut state, business_ctx(), true).unwrap();
        assert_eq!(outcome, Outcome::NoShow);
        assert_eq!(state.marketing_cost, 0.0);
    }

    #[test]
    fn forced_new_arrival_spends_marketing_budget() {
        let mut rng = ChaCha12Rng::seed_from_u64(2);
        let mut state = SimState::new(10, 30, 2000.0);
        process_arrival(&mut rng, &mut state, business_ctx(), true).unwrap();
        assert_eq!(state.marketing_spent_month, params::MARKETING_COST_PER_NEW_CLIENT);
        assert_eq!(state.marketing_cost, params::MARKETING_COST_PER_NEW_CLIENT);
    }

    #[test]
    fn business_arrival_books_a_development_technician_first() {
        let mut rng = ChaCha12Rng::seed_from_u64(3);
        let mut state = SimState::new(10, 30, 2000.0);
        state.day = 1;
        process_arrival(&mut rng, &mut state, business_ctx(), false).unwrap();
        assert!(matches!(state.dev_pool[0], TechStatus::BusyUntil(_)));
    }

    #[test]
    fn saturated_pools_divert_to_the_calendar() {
        let mut rng = ChaCha12Rng::seed_from_u64(4);
        let mut state = SimState::new(10, 30, 2000.0);
        state.dev_pool = vec![TechStatus::BusyUntil(1e9); 4];
        state.apps_it_pool = vec![TechStatus::BusyUntil(1e9); 6];
        for _ in 0..20 {
            let before = state.week_losses.no_technician;
            let outcome = process_arrival(&mut rng, &mut state, business_ctx(), false).unwrap();
            if outcome != Outcome::NoShow {
                assert!(matches!(
                    outcome,
                    Outcome::Regret | Outcome::MissedMeeting | Outcome::Calendarized
                ));
                assert_eq!(state.week_losses.no_technician, before + 1);
            }
        }
    }

    #[test]
    fn off_hours_arrivals_skip_technician_booking() {
        let mut rng = ChaCha12Rng::seed_from_u64(5);
        let mut state = SimState::new(10, 30, 2000.0);
        let ctx = ArrivalCtx {
            business_hours: false,
            weekday: true,
            unstable: false,
            clock: None,
        };
        for _ in 0..10 {
            process_arrival(&mut rng, &mut state, ctx, false).unwrap();
        }
        assert!(state.dev_pool.iter().all(|slot| *slot == TechStatus::Free));
        assert!(state.apps_it_pool.iter().all(|slot| *slot == TechStatus::Free));
    }

    #[test]
    fn pre_existing_prob_steps_with_the_score() {
        assert_eq!(pre_existing_prob(40.0), 0.20);
        assert_eq!(pre_existing_prob(60.0), 0.20);
        assert!((pre_existing_prob(95.0) - 0.21).abs() < 1e-12);
        // Far above the threshold the increment caps at 0.50, then the
        // overall probability caps at 0.70.
        assert_eq!(pre_existing_prob(10_000.0), 0.70);
    }

    #[test]
    fn job_values_are_non_negative() {
        let mut rng = ChaCha12Rng::seed_from_u64(6);
        for _ in 0..500 {
            let job = draw_job(&mut rng).unwrap();
            assert!(job.value >= 0.0);
            assert!(job.busy_minutes >= 0.0);
            if job.kind == JobKind::Development {
                assert!(job.busy_minutes >= params::DEV_DURATION_MIN_HOURS * 60.0);
            }
        }
    }

    #[test]
    fn conversion_moves_a_one_off_into_a_package() {
        let mut rng = ChaCha12Rng::seed_from_u64(7);
        let mut state = SimState::new(10, 30, 2000.0);
        let pool_before = state.one_off_pool;
        let holders_before = state.package_holders;
        convert_one_off(&mut rng, &mut state).unwrap();
        assert_eq!(state.one_off_pool, pool_before - 1);
        assert_eq!(state.package_holders, holders_before + 1);
        assert!(state.incoming_credits > 0.0);
    }
}
