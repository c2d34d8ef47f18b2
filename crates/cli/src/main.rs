//! Scenario runner.
//!
//! Loads a scenario file, runs it, and writes the result to stdout as JSON.
//! Logs go to stderr and are filtered through `RUST_LOG` (default `info`).
//!
//! Usage: contagion <scenario.{toml,json}> [--resample-days N] [--raw]

use std::{
    env,
    io::{self, BufWriter, Write},
    path::PathBuf,
    process,
};

use anyhow::{Context, Result, bail};
use contagion_seir::{config::Scenario, report::Report};
use jiff::SignedDuration;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const USAGE: &str = "Usage: contagion <scenario.{toml,json}> [--resample-days N] [--raw]";

#[derive(Debug, PartialEq)]
struct Args {
    scenario: PathBuf,
    resample_days: Option<f64>,
    raw: bool,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut scenario = None;
        let mut resample_days = None;
        let mut raw = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--raw" => raw = true,
                "--resample-days" => {
                    let value = args.next().context("--resample-days needs a value")?;
                    let days: f64 = value
                        .parse()
                        .with_context(|| format!("invalid day count `{value}`"))?;
                    if !(days.is_finite() && days > 0.0) {
                        bail!("--resample-days must be positive, got {days}");
                    }
                    resample_days = Some(days);
                }
                flag if flag.starts_with("--") => bail!("unknown option `{flag}`"),
                path if scenario.is_none() => scenario = Some(PathBuf::from(path)),
                extra => bail!("unexpected argument `{extra}`"),
            }
        }

        Ok(Self {
            scenario: scenario.context("missing scenario path")?,
            resample_days,
            raw,
        })
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a tracing subscriber was already installed");
    }

    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(err) => {
            eprintln!("Error: {err:#}\n{USAGE}");
            process::exit(2);
        }
    };

    if let Err(err) = run(&args) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let scenario = Scenario::from_path(&args.scenario)
        .with_context(|| format!("loading {}", args.scenario.display()))?;
    let simulation = scenario.simulation().context("configuring simulation")?;
    let schedule = scenario.schedule().context("reading policy")?;

    let trajectory = simulation
        .run_schedule(&schedule)
        .context("running simulation")?;

    let drift = trajectory.conservation_drift();
    info!(
        snapshots = trajectory.len(),
        end = %trajectory.final_state().time,
        dead = trajectory.final_state().compartments.dead,
        conservation_drift = drift,
        "simulation complete"
    );
    if drift > 1e-6 {
        warn!(conservation_drift = drift, "population total drifted");
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    if args.raw {
        serde_json::to_writer_pretty(&mut out, &trajectory).context("writing trajectory")?;
    } else {
        let report = match args.resample_days {
            None => Report::daily(&trajectory, simulation.parameters()),
            Some(days) => {
                let bin = SignedDuration::try_from_secs_f64(days * 86_400.0)
                    .context("resampling interval out of range")?;
                Report::resample(&trajectory, simulation.parameters(), bin)?
            }
        };
        if let Some(peak) = report.peak_hospitalized() {
            info!(date = %peak.time, hospitalized = peak.hospitalized, "hospital peak");
        }
        serde_json::to_writer_pretty(&mut out, &report).context("writing report")?;
    }

    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args> {
        Args::parse(args.iter().map(|arg| (*arg).to_string()))
    }

    #[test]
    fn scenario_path_alone_gives_daily_report() {
        let args = parse(&["lockdown.toml"]).unwrap();

        assert_eq!(
            args,
            Args {
                scenario: PathBuf::from("lockdown.toml"),
                resample_days: None,
                raw: false,
            }
        );
    }

    #[test]
    fn options_may_come_in_any_order() {
        let args = parse(&["--resample-days", "7", "run.json", "--raw"]).unwrap();

        assert_eq!(args.scenario, PathBuf::from("run.json"));
        assert_eq!(args.resample_days, Some(7.0));
        assert!(args.raw);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["a.toml", "b.toml"]).is_err());
        assert!(parse(&["a.toml", "--resample-days"]).is_err());
        assert!(parse(&["a.toml", "--resample-days", "0"]).is_err());
        assert!(parse(&["a.toml", "--verbose"]).is_err());
    }
}
