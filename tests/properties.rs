use platsim::state::HireIntake;
use platsim::{Config, Engine, params, periodic};

fn config(horizon_days: u32) -> Config {
    Config {
        horizon_days,
        release_cadence_days: 30,
        marketing_budget_monthly: 2000.0,
        seed: Some(0),
        runs: 1,
    }
}

#[test]
fn final_quarter_scan_never_loses_to_the_checkpoints() {
    let mut engine = Engine::new(config(250), 9);
    for _ in 0..250 {
        engine.step_day().unwrap();
    }
    let incremental = engine.state().best_quarter;
    periodic::scan_best_quarter(engine.state_mut());
    let scanned = engine.state().best_quarter.expect("no quarter found");
    if let Some(checkpoint) = incremental {
        assert!(scanned.profit >= checkpoint.profit);
    }
    assert_eq!(scanned.end_day - scanned.start_day + 1, params::QUARTER_DAYS);
    assert!(scanned.end_day <= 250);
}

#[test]
fn breakeven_marks_the_first_profitable_day() {
    let mut engine = Engine::new(config(180), 21);
    for _ in 0..180 {
        engine.step_day().unwrap();
    }
    let state = engine.state();
    if let Some(day) = state.breakeven_day {
        assert!(state.daily_profit[day as usize - 1] > 0.0);
        for earlier in &state.daily_profit[..day as usize - 1] {
            assert!(*earlier <= 0.0);
        }
    } else {
        assert!(state.daily_profit.iter().all(|profit| *profit <= 0.0));
    }
}

#[test]
fn a_day_with_no_customers_and_no_budget_stays_quiet() {
    let mut engine = Engine::new(config(10), 1);
    {
        let state = engine.state_mut();
        state.loyal_subscription = 0;
        state.loyal_prepaid = 0;
        state.marketing_spent_month = state.marketing_budget_monthly;
    }
    engine.step_day().unwrap();
    let state = engine.state();
    assert_eq!(state.incoming_credits, 0.0);
    assert_eq!(state.marketing_cost, 0.0);
    assert_eq!(state.technician_cost, 0.0);
    // Payroll is independent of demand.
    assert_eq!(state.development_cost, params::MONTHLY_DEVELOPMENT_COST);
}

#[test]
fn pending_hires_join_their_pools_on_arrival_day() {
    let mut engine = Engine::new(config(10), 5);
    engine.state_mut().pending_hires.push(HireIntake {
        arrival_day: 2,
        dev: 3,
        apps_it: 1,
    });
    let dev_before = engine.state().dev_pool.len();
    let apps_before = engine.state().apps_it_pool.len();

    engine.step_day().unwrap();
    assert_eq!(engine.state().dev_pool.len(), dev_before);
    assert_eq!(engine.state().pending_hires.len(), 1);

    engine.step_day().unwrap();
    assert_eq!(engine.state().dev_pool.len(), dev_before + 3);
    assert_eq!(engine.state().apps_it_pool.len(), apps_before + 1);
    assert!(engine.state().pending_hires.is_empty());
}

#[test]
fn long_run_keeps_every_invariant() {
    let mut engine = Engine::new(config(300), 13);
    for day in 1..=300u32 {
        engine.step_day().unwrap();
        let state = engine.state();
        assert_eq!(state.day, day);
        assert_eq!(state.daily_profit.len() as u32, day);
        assert_eq!(state.weekly.len() as u32, day / 7);
        assert_eq!(
            state.subscriptions_total,
            state.loyal_subscription + state.standard_subscription
        );
        assert_eq!(
            state.prepaid_total,
            state.loyal_prepaid + state.standard_prepaid
        );
        assert!(state.dissatisfied_loyal <= state.loyal_total());
        assert!(state.dissatisfied_standard <= state.standard_total());
        assert!(state.dissatisfied_subscription <= state.subscriptions_total);
        assert!(state.dissatisfied_prepaid <= state.prepaid_total);
        // Each day's profit entry is the three nets minus development and
        // marketing costs at that point.
        let identity = state.net_profit_jobs
            + state.net_profit_prepaid
            + state.net_profit_subscription
            - state.development_cost
            - state.marketing_cost;
        assert!((state.daily_profit[day as usize - 1] - identity).abs() < 1e-9);
        assert!(state.prepaid_balance >= 0.0);
        assert!(state.prepaid_balance <= params::PREPAID_BLOCK_CREDITS);
        assert!(state.marketing_spent_month <= state.marketing_budget_monthly);
        assert!(!state.dev_pool.is_empty());
        assert!(!state.apps_it_pool.is_empty());
    }
}

#[test]
fn marketing_spend_resets_every_month() {
    let mut engine = Engine::new(config(60), 17);
    for _ in 0..30 {
        engine.step_day().unwrap();
    }
    assert_eq!(engine.state().marketing_spent_month, 0.0);
    let cost_after_month = engine.state().marketing_cost;
    for _ in 0..30 {
        engine.step_day().unwrap();
    }
    // The lifetime accumulator keeps growing while the monthly one resets.
    assert!(engine.state().marketing_cost >= cost_after_month);
    assert_eq!(engine.state().marketing_spent_month, 0.0);
}
