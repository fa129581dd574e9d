//! Sampling primitives used throughout the simulation.
//!
//! Every function takes its parameters explicitly and returns a single draw,
//! so call sites read like the model description.

use anyhow::Result;
use rand::prelude::*;
use rand_distr::{Beta, Binomial, Exp, Normal, Uniform};

/// Bernoulli trial: true with probability `p`.
pub fn chance(rng: &mut impl Rng, p: f64) -> bool {
    rng.random::<f64>() < p
}

/// Gaussian draw clamped into `[min, max]`.
pub fn truncated_normal(
    rng: &mut impl Rng,
    mean: f64,
    std_dev: f64,
    min: f64,
    max: f64,
) -> Result<f64> {
    let dist = Normal::new(mean, std_dev)?;
    Ok(dist.sample(rng).clamp(min, max))
}

/// Uniform draw in `[a, b)`.
pub fn uniform(rng: &mut impl Rng, a: f64, b: f64) -> Result<f64> {
    let dist = Uniform::new(a, b)?;
    Ok(dist.sample(rng))
}

/// Number of successes over `n` independent trials at probability `p`.
pub fn binomial(rng: &mut impl Rng, n: u64, p: f64) -> Result<u64> {
    if n == 0 || p <= 0.0 {
        return Ok(0);
    }
    let dist = Binomial::new(n, p.min(1.0))?;
    Ok(dist.sample(rng))
}

/// Poisson draw: exact simulation for small rates, Gaussian approximation
/// (rounded, floored at 0) above 100.
pub fn poisson(rng: &mut impl Rng, rate: f64) -> Result<u64> {
    if rate <= 0.0 {
        return Ok(0);
    }
    if rate > 100.0 {
        let dist = Normal::new(rate, rate.sqrt())?;
        return Ok(dist.sample(rng).round().max(0.0) as u64);
    }
    let threshold = (-rate).exp();
    let mut count = 0u64;
    let mut product = 1.0;
    loop {
        count += 1;
        product *= rng.random::<f64>();
        if product <= threshold {
            return Ok(count - 1);
        }
    }
}

/// Negative binomial draw: number of failures before `r` successes at
/// success probability `p`. `r` is floored to an integer of at least 1.
pub fn neg_binomial(rng: &mut impl Rng, r: f64, p: f64) -> u64 {
    let target = (r as u64).max(1);
    let mut successes = 0u64;
    let mut failures = 0u64;
    while successes < target {
        if rng.random::<f64>() < p {
            successes += 1;
        } else {
            failures += 1;
        }
    }
    failures
}

/// Probability sampled from a Beta distribution with the given mean and
/// concentration (higher concentration, tighter spread).
pub fn beta_prob(rng: &mut impl Rng, mean: f64, concentration: f64) -> Result<f64> {
    let alpha = (mean * concentration).max(0.01);
    let beta = ((1.0 - mean) * concentration).max(0.01);
    let dist = Beta::new(alpha, beta)?;
    Ok(dist.sample(rng))
}

/// Bernoulli trial whose probability is itself a Beta draw around `mean`.
pub fn beta_chance(rng: &mut impl Rng, mean: f64, concentration: f64) -> Result<bool> {
    let p = beta_prob(rng, mean, concentration)?;
    Ok(chance(rng, p))
}

/// Time to the next event, in minutes, at `rate` events per minute.
/// Infinite for a non-positive rate.
pub fn exp_interarrival(rng: &mut impl Rng, rate: f64) -> Result<f64> {
    if rate <= 0.0 {
        return Ok(f64::INFINITY);
    }
    let dist = Exp::new(rate)?;
    Ok(dist.sample(rng))
}
