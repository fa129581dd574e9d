use crate::params;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Simulation configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of days to simulate.
    pub horizon_days: u32,
    /// Days between platform releases.
    pub release_cadence_days: u32,
    /// Monthly marketing budget in credits.
    pub marketing_budget_monthly: f64,

    /// Base RNG seed, drawn from the OS when absent; benchmark run `i`
    /// uses `seed + i`.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of benchmark runs.
    #[serde(default = "default_runs")]
    pub runs: usize,
}

fn default_runs() -> usize {
    1
}

impl Config {
    /// Load a [`Config`] from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let text =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        let config: Config = toml::from_str(&text).context("failed to parse config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        check_num(self.horizon_days, 1..100_000).context("invalid horizon")?;
        check_num(self.release_cadence_days, 1..=365).context("invalid release cadence")?;
        check_num(
            self.marketing_budget_monthly,
            params::MARKETING_BUDGET_MIN..=params::MARKETING_BUDGET_MAX,
        )
        .context("invalid marketing budget")?;
        check_num(self.runs, 1..10_000).context("invalid number of runs")?;
        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            horizon_days: 365,
            release_cadence_days: 30,
            marketing_budget_monthly: 2000.0,
            seed: Some(42),
            runs: 10,
        }
    }

    #[test]
    fn parses_a_minimal_toml_config() {
        let config: Config = toml::from_str(
            "horizon_days = 365\n\
             release_cadence_days = 30\n\
             marketing_budget_monthly = 2000.0\n",
        )
        .unwrap();
        assert_eq!(config.horizon_days, 365);
        assert_eq!(config.seed, None);
        assert_eq!(config.runs, 1);
        config.validate().unwrap();
    }

    #[test]
    fn rejects_an_out_of_range_budget() {
        let mut config = base_config();
        config.marketing_budget_monthly = 100.0;
        assert!(config.validate().is_err());
        config.marketing_budget_monthly = 5000.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_a_zero_horizon() {
        let mut config = base_config();
        config.horizon_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn accepts_the_budget_bounds() {
        let mut config = base_config();
        config.marketing_budget_monthly = params::MARKETING_BUDGET_MIN;
        config.validate().unwrap();
        config.marketing_budget_monthly = params::MARKETING_BUDGET_MAX;
        config.validate().unwrap();
    }
}
