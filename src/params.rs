//! Fixed model parameters.
//!
//! Single authoritative table; run-level knobs (horizon, release cadence,
//! marketing budget, seed) live in [`crate::config::Config`] instead.

// --- Calendar ---
pub const DAYS_PER_MONTH: u32 = 30;
pub const DAYS_PER_WEEK: u32 = 7;
pub const QUARTER_DAYS: u32 = 120;

// --- Prices and costs (credits) ---
pub const MONTHLY_DEVELOPMENT_COST: f64 = 16_000.0;
pub const MARKETING_COST_PER_NEW_CLIENT: f64 = 25.0;
pub const PREPAID_BLOCK_CREDITS: f64 = 460.0;
pub const PREPAID_RENEWAL_PRICE: f64 = 354.2;
pub const SUBSCRIPTION_MONTHLY_PRICE: f64 = 10.0;
pub const MISSED_MEETING_PENALTY: f64 = 12.0;
/// Share of billed job value kept as net margin.
pub const NET_MARGIN: f64 = 0.40;
pub const SUBSCRIPTION_DISCOUNT: f64 = 0.15;
/// Technician cost charged per prepaid credit consumed.
pub const PREPAID_TECH_COST_FACTOR: f64 = 0.77 * 0.60;

// --- Marketing budget bounds ---
pub const MARKETING_BUDGET_MIN: f64 = 500.0;
pub const MARKETING_BUDGET_MAX: f64 = 4500.0;

// --- Daily demand ---
pub const JOBS_PER_LOYAL_PER_DAY: f64 = 1.0;
pub const DAILY_JOBS_MIN: u64 = 1;
pub const DAILY_JOBS_MAX: u64 = 200;
/// Negative-binomial probability parameter; the dispersion parameter r is
/// derived from the target mean as r = mean * p / (1 - p), so the draw's
/// expectation matches the mean.
pub const DEMAND_NEG_BINOMIAL_P: f64 = 0.20;
pub const BUSINESS_HOURS_SHARE: f64 = 0.95;
pub const OFF_HOURS_SHARE: f64 = 0.05;

// --- New vs pre-existing classification ---
pub const SCORE_THRESHOLD: f64 = 60.0;
pub const PROB_PRE_EXISTING_BASE: f64 = 0.20;
pub const PROB_PRE_EXISTING_MAX: f64 = 0.70;
/// Probability increment per 30 score points above the threshold.
pub const PRE_EXISTING_STEP: f64 = 0.01;
pub const PRE_EXISTING_STEP_POINTS: f64 = 30.0;
pub const PRE_EXISTING_INCREMENT_MAX: f64 = 0.50;

// --- New-customer segment mix (cumulative cutoffs) ---
pub const NEW_ONE_OFF_CUTOFF: f64 = 0.90;
pub const NEW_STANDARD_CUTOFF: f64 = 0.97;
pub const PROB_NEW_SUBSCRIPTION: f64 = 0.50;

// --- Job types ---
pub const PROB_APPS: f64 = 0.52;
pub const PROB_IT: f64 = 0.43;
pub const APPS_DURATION_MEAN_MIN: f64 = 15.0;
pub const APPS_DURATION_STD_MIN: f64 = 35.0;
pub const IT_DURATION_MEAN_MIN: f64 = 5.0;
pub const IT_DURATION_STD_MIN: f64 = 40.0;
pub const DEV_DURATION_MIN_HOURS: f64 = 2.0;
pub const DEV_DURATION_MAX_HOURS: f64 = 20.0;
pub const APPS_RATE_PER_MINUTE: f64 = 1.0;
pub const IT_RATE_PER_MINUTE: f64 = 1.25;
pub const DEV_RATE_PER_HOUR: f64 = 30.0;

// --- Calendarization ---
pub const PROB_CALENDARIZE_BUSINESS_HOURS: f64 = 0.05;
pub const PROB_CALENDARIZE_OFF_HOURS: f64 = 0.65;
pub const PROB_CALENDAR_REGRET: f64 = 0.60;
pub const PROB_MISSED_MEETING: f64 = 0.05;
pub const PROB_DISSATISFIED_IF_MISSED: f64 = 0.50;

// --- Satisfaction ---
pub const PROB_DISSATISFACTION_BASE: f64 = 0.035;
pub const PROB_POOR_CONNECTIVITY: f64 = 0.10;
pub const PROB_RELEASE_INSTABILITY: f64 = 0.45;
pub const PROB_DISSATISFACTION_CALENDARIZED: f64 = 0.17;
/// Concentration of the Beta perturbation applied to nominal probabilities.
pub const BETA_CONCENTRATION: f64 = 8.0;

// --- Billing on dissatisfaction ---
pub const PROB_WAIVE_NON_DEVELOPMENT: f64 = 0.85;
pub const PROB_BILL_DEVELOPMENT: f64 = 0.50;
pub const PROB_PACIFY: f64 = 0.50;

// --- Churn and renewal ---
pub const PROB_SUBSCRIPTION_NON_RENEWAL: f64 = 0.80;
pub const PROB_PREPAID_NON_RENEWAL: f64 = 0.80;
pub const PROB_PREPAID_ABANDON: f64 = 0.60;

// --- One-off conversion ---
pub const PROB_CONVERT_ONE_OFF: f64 = 0.05;
pub const PROB_LOYAL_AFTER_CONVERSION: f64 = 0.30;

// --- Releases ---
/// Fraction of the release cadence spent in the instability window.
pub const INSTABILITY_DAYS_SHARE: f64 = 0.15;

// --- Technicians and workday ---
pub const WORK_HOURS: usize = 8;
pub const MINUTES_PER_HOUR: f64 = 60.0;
pub const WORKDAY_MINUTES: f64 = 480.0;
/// Bimodal intraday arrival weights, one per working hour (mid-morning and
/// mid-afternoon peaks).
pub const HOURLY_WEIGHTS: [f64; WORK_HOURS] = [0.10, 0.14, 0.16, 0.12, 0.10, 0.14, 0.14, 0.10];
pub const HIRING_CYCLE_DAYS: u32 = 21;
pub const WEEKLY_ATTRITION_PROB: f64 = 0.01;
pub const DEV_HIRES_PER_LOST_JOB: f64 = 0.15;
pub const APPS_IT_HIRES_PER_LOST_JOB: f64 = 0.12;

// --- Initial state ---
pub const INITIAL_ONE_OFF_POOL: u32 = 940;
pub const INITIAL_LOYAL_SUBSCRIPTION: u32 = 14;
pub const INITIAL_LOYAL_PREPAID: u32 = 3;
pub const INITIAL_STANDARD_SUBSCRIPTION: u32 = 33;
pub const INITIAL_STANDARD_PREPAID: u32 = 10;
pub const INITIAL_PACKAGE_HOLDERS: u32 = 60;
pub const INITIAL_PREV_WEEK_SCORE: f64 = 77.0;
pub const INITIAL_DEV_TECHNICIANS: usize = 4;
pub const INITIAL_APPS_IT_TECHNICIANS: usize = 6;
