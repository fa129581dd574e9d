use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use platsim::{Config, Engine, bench, metrics::RunReport};
use rand::Rng;
use serde::Serialize;
use std::{fs::File, io::BufWriter, path::Path, path::PathBuf};

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Single simulation run.
    Run {
        /// Write the full report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Repeated runs with aggregated statistics.
    Bench {
        /// Write the aggregated report as JSON.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let cfg = Config::from_file(&args.config).context("failed to load config")?;

    match args.command {
        Command::Run { output } => {
            let seed = cfg.seed.unwrap_or_else(|| rand::rng().random());
            log::info!("seed: {seed}");
            let mut engine = Engine::new(cfg.clone(), seed);
            let report = engine.run().context("failed to run simulation")?;
            log_summary(&report);
            if let Some(output) = output {
                write_json(&output, &report)?;
            }
        }
        Command::Bench { output } => {
            let report = bench::run_benchmark(&cfg).context("failed to run benchmark")?;
            log::info!(
                "final profit over {} runs: mean {:.2}, std {:.2}, p50 {:.2}",
                report.runs,
                report.final_profit.mean,
                report.final_profit.std_dev,
                report.final_profit.p50,
            );
            log::info!(
                "break-even reached in {:.0}% of runs",
                100.0 * report.breakeven_share
            );
            if let Some(output) = output {
                write_json(&output, &report)?;
            }
        }
    }

    Ok(())
}

fn log_summary(report: &RunReport) {
    log::info!(
        "net profit: jobs {:.2}, prepaid {:.2}, subscription {:.2}, total {:.2}",
        report.net_profit_jobs,
        report.net_profit_prepaid,
        report.net_profit_subscription,
        report.final_profit,
    );
    match report.breakeven_day {
        Some(day) => log::info!("break-even reached on day {day}"),
        None => log::info!("break-even not reached"),
    }
    if let Some(quarter) = report.best_quarter {
        log::info!(
            "best quarter: days {} to {}, profit {:.2}",
            quarter.start_day,
            quarter.end_day,
            quarter.profit,
        );
    }
    log::info!(
        "final customers: {} one-off, {} subscriptions, {} prepaid ({} loyal)",
        report.final_one_off_pool,
        report.final_subscriptions,
        report.final_prepaid,
        report.final_loyal_customers,
    );
}

fn write_json<T: Serialize>(file: &Path, value: &T) -> Result<()> {
    let file_handle =
        File::create(file).with_context(|| format!("failed to create {file:?}"))?;
    let writer = BufWriter::new(file_handle);
    serde_json::to_writer_pretty(writer, value).context("failed to serialize report")?;
    Ok(())
}
