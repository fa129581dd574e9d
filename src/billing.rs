//! Payment routing: per-job revenue, the subscription channel, and the
//! shared prepaid credit block with its renewal cycle.

use crate::arrival::{Client, ClientKind, PackagePlan};
use crate::dist;
use crate::params;
use crate::state::{LossReason, SimState};
use anyhow::Result;
use rand::Rng;

/// Book the revenue of a completed (or billed-through) job according to the
/// client's payment plan. New package clients pick their plan here, on
/// first billing.
pub fn route_payment(
    rng: &mut impl Rng,
    state: &mut SimState,
    client: &mut Client,
    value: f64,
    dissatisfied: bool,
    billable: bool,
) -> Result<()> {
    if client.is_new {
        match client.kind {
            ClientKind::Package { loyal } => {
                if dist::beta_chance(
                    rng,
                    params::PROB_NEW_SUBSCRIPTION,
                    params::BETA_CONCENTRATION,
                )? {
                    client.plan = Some(PackagePlan::Subscription);
                    state.incoming_credits += params::SUBSCRIPTION_MONTHLY_PRICE;
                    state.net_profit_subscription += params::SUBSCRIPTION_MONTHLY_PRICE;
                    state.add_subscription(loyal);
                    bill_subscription_job(state, value);
                } else {
                    client.plan = Some(PackagePlan::Prepaid);
                    state.incoming_credits += params::PREPAID_RENEWAL_PRICE;
                    state.net_profit_prepaid += params::PREPAID_RENEWAL_PRICE;
                    state.add_prepaid(loyal);
                    consume_prepaid(rng, state, value, dissatisfied, billable)?;
                }
            }
            ClientKind::OneOff => {
                state.incoming_credits += value;
                state.one_off_pool += 1;
            }
        }
        return Ok(());
    }

    match client.plan {
        Some(PackagePlan::Subscription) => bill_subscription_job(state, value),
        Some(PackagePlan::Prepaid) => consume_prepaid(rng, state, value, dissatisfied, billable)?,
        None => state.incoming_credits += value,
    }
    Ok(())
}

/// Subscription jobs are billed at the discounted margin.
fn bill_subscription_job(state: &mut SimState, value: f64) {
    state.net_profit_subscription +=
        value * (1.0 - params::SUBSCRIPTION_DISCOUNT) * params::NET_MARGIN;
}

/// Debit a job from the shared prepaid block, topping it up when it runs
/// dry. A dissatisfied-but-billable client pays the shortfall in cash
/// instead of buying a fresh block.
pub fn consume_prepaid(
    rng: &mut impl Rng,
    state: &mut SimState,
    value: f64,
    dissatisfied: bool,
    billable: bool,
) -> Result<()> {
    if state.prepaid_balance >= value {
        state.prepaid_balance -= value;
        charge_technician(state, value);
    } else {
        let available = state.prepaid_balance;
        let shortfall = value - available;
        state.prepaid_balance = 0.0;
        charge_technician(state, available);
        if dissatisfied && billable {
            state.incoming_credits += shortfall;
            state.net_profit_jobs += shortfall * params::NET_MARGIN;
        } else {
            state.incoming_credits += params::PREPAID_RENEWAL_PRICE;
            state.net_profit_prepaid += params::PREPAID_RENEWAL_PRICE;
            state.prepaid_balance = (params::PREPAID_BLOCK_CREDITS - shortfall).max(0.0);
            charge_technician(state, shortfall);
        }
    }
    if state.prepaid_balance <= 0.0 {
        renew_block(rng, state)?;
    }
    Ok(())
}

/// Prepaid work pays technicians out of the block's margin.
fn charge_technician(state: &mut SimState, amount: f64) {
    let cost = amount * params::PREPAID_TECH_COST_FACTOR;
    state.net_profit_prepaid -= cost;
    state.technician_cost += cost;
}

/// Renew the shared block once it is exhausted. A dissatisfied prepaid
/// customer may refuse to chip in and leave instead.
pub fn renew_block(rng: &mut impl Rng, state: &mut SimState) -> Result<()> {
    if state.prepaid_total == 0 {
        state.prepaid_balance = params::PREPAID_BLOCK_CREDITS;
        return Ok(());
    }
    let refusal = state.dissatisfied_prepaid > 0
        && dist::chance(
            rng,
            (state.dissatisfied_prepaid as f64 / state.prepaid_total as f64).min(1.0),
        )
        && dist::beta_chance(
            rng,
            params::PROB_PREPAID_NON_RENEWAL,
            params::BETA_CONCENTRATION,
        )?;
    if refusal {
        state.week_losses.record(LossReason::PrepaidNonRenewal);
        remove_prepaid_customer(rng, state);
    } else {
        state.incoming_credits += params::PREPAID_RENEWAL_PRICE;
        state.net_profit_prepaid += params::PREPAID_RENEWAL_PRICE;
    }
    state.prepaid_balance = params::PREPAID_BLOCK_CREDITS;
    Ok(())
}

/// Drop one prepaid customer, apportioned between the loyal and standard
/// segments by their current shares.
pub fn remove_prepaid_customer(rng: &mut impl Rng, state: &mut SimState) {
    let total = state.prepaid_total;
    if total == 0 {
        return;
    }
    state.prepaid_total -= 1;
    state.package_holders = state.package_holders.saturating_sub(1);
    state.dissatisfied_prepaid = state.dissatisfied_prepaid.saturating_sub(1);
    let loyal_share = state.loyal_prepaid as f64 / total as f64;
    if state.loyal_prepaid > 0 && dist::chance(rng, loyal_share) {
        state.loyal_prepaid -= 1;
        state.dissatisfied_loyal = state.dissatisfied_loyal.min(state.loyal_total());
    } else {
        state.standard_prepaid = state.standard_prepaid.saturating_sub(1);
        state.dissatisfied_standard = state.dissatisfied_standard.saturating_sub(1);
    }
}
