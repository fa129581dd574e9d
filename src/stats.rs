use serde::{Deserialize, Serialize};

/// Sample of one scalar observable across benchmark runs.
pub struct Sample {
    vals: Vec<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SampleReport {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
}

impl Sample {
    pub fn new() -> Self {
        Self { vals: Vec::new() }
    }

    pub fn push(&mut self, val: f64) {
        self.vals.push(val);
    }

    pub fn len(&self) -> usize {
        self.vals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    pub fn report(&self) -> SampleReport {
        let mut sorted = self.vals.clone();
        sorted.sort_by(f64::total_cmp);
        SampleReport {
            mean: compute_mean(&self.vals),
            std_dev: compute_var(&self.vals).sqrt(),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            p25: compute_quantile(&sorted, 0.25),
            p50: compute_quantile(&sorted, 0.50),
            p75: compute_quantile(&sorted, 0.75),
        }
    }
}

impl Default for Sample {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_mean(vals: &[f64]) -> f64 {
    if vals.is_empty() {
        return f64::NAN;
    }
    vals.iter().sum::<f64>() / vals.len() as f64
}

fn compute_var(vals: &[f64]) -> f64 {
    let n_vals = vals.len();
    if n_vals < 2 {
        return f64::NAN;
    }
    let mean = compute_mean(vals);
    vals.iter().map(|&val| (val - mean).powi(2)).sum::<f64>() / (n_vals - 1) as f64
}

/// Linear-interpolation quantile over an already sorted sample.
fn compute_quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}
