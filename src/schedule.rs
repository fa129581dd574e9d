//! Intraday scheduling: splits the day's arrivals between business hours
//! and off hours, and spreads the business-hours ones over the workday as
//! a non-homogeneous Poisson process with a bimodal hourly profile.

use crate::dist;
use crate::params;
use anyhow::Result;
use rand::Rng;

/// Split today's arrivals into business-hours and off-hours channels:
/// the ceiling of the business-hours share goes in hours, the floor of the
/// rest goes off hours, so the two channels always conserve the total.
pub fn split_day(total: u32) -> (u32, u32) {
    let business = (total as f64 * params::BUSINESS_HOURS_SHARE).ceil() as u32;
    (business, total - business)
}

/// Draw `count` arrival minutes over the workday, in increasing order.
///
/// Gaps are exponential with the rate of the hour the clock currently sits
/// in; past the last hour the final hour's rate keeps applying, so late
/// arrivals can land beyond the nominal close of the workday.
pub fn business_arrival_minutes(rng: &mut impl Rng, count: u32) -> Result<Vec<f64>> {
    let mut minutes = Vec::with_capacity(count as usize);
    if count == 0 {
        return Ok(minutes);
    }
    let mut clock = 0.0_f64;
    for _ in 0..count {
        let hour = ((clock / params::MINUTES_PER_HOUR) as usize).min(params::WORK_HOURS - 1);
        clock += dist::exp_interarrival(rng, hour_rate(count, hour))?;
        minutes.push(clock);
    }
    Ok(minutes)
}

/// Per-minute arrival rate in the given hour: the target count spread over
/// the normalized weight table.
fn hour_rate(count: u32, hour: usize) -> f64 {
    let total: f64 = params::HOURLY_WEIGHTS.iter().sum();
    count as f64 * (params::HOURLY_WEIGHTS[hour] / total) / params::MINUTES_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn split_conserves_the_total() {
        for total in [0, 1, 7, 13, 17, 21, 200] {
            let (business, off) = split_day(total);
            assert_eq!(business + off, total);
        }
    }

    #[test]
    fn split_rounds_business_hours_up() {
        assert_eq!(split_day(100), (95, 5));
        assert_eq!(split_day(1), (1, 0));
        assert_eq!(split_day(21), (20, 1));
    }

    #[test]
    fn arrival_minutes_are_sorted_and_positive() {
        let mut rng = ChaCha12Rng::seed_from_u64(13);
        let minutes = business_arrival_minutes(&mut rng, 50).unwrap();
        assert_eq!(minutes.len(), 50);
        for pair in minutes.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        assert!(minutes[0] > 0.0);
    }

    #[test]
    fn hour_rate_normalizes_the_weight_table() {
        let total: f64 = params::HOURLY_WEIGHTS.iter().sum();
        // Hour 2 carries weight 0.16 of the day's 60 arrivals.
        let expected = 60.0 * (0.16 / total) / params::MINUTES_PER_HOUR;
        assert!((hour_rate(60, 2) - expected).abs() < 1e-12);
        // One minute at each hour's rate accounts for the full count.
        let summed: f64 = (0..params::WORK_HOURS).map(|hour| hour_rate(60, hour)).sum();
        assert!((summed * params::MINUTES_PER_HOUR - 60.0).abs() < 1e-9);
    }

    #[test]
    fn zero_count_yields_no_minutes() {
        let mut rng = ChaCha12Rng::seed_from_u64(1);
        assert!(business_arrival_minutes(&mut rng, 0).unwrap().is_empty());
    }
}
