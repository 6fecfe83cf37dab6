//! Headless simulator: plays one run with the autopilot and prints its event
//! log as JSON lines on stdout.
//!
//! Usage: `overstack-sim [--seed N] [--nodes N] [--config path.ron] [--snapshot]`

use overstack::{autopilot, default_catalog, EngineConfig, EngineError, Run, ScoringPilot};
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct Args {
    seed: u64,
    nodes: u32,
    config_path: Option<String>,
    snapshot: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        seed: 1234,
        nodes: 6,
        config_path: None,
        snapshot: false,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(flag) = iter.next() {
        match flag.as_str() {
            "--seed" => {
                let value = iter.next().ok_or("--seed needs a value")?;
                args.seed = value.parse().map_err(|_| format!("invalid seed '{}'", value))?;
            }
            "--nodes" => {
                let value = iter.next().ok_or("--nodes needs a value")?;
                args.nodes = value.parse().map_err(|_| format!("invalid node count '{}'", value))?;
            }
            "--config" => {
                args.config_path = Some(iter.next().ok_or("--config needs a path")?);
            }
            "--snapshot" => args.snapshot = true,
            other => return Err(format!("unknown argument '{}'", other)),
        }
    }
    Ok(args)
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, EngineError> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .map_err(|err| EngineError::Config(format!("{}: {}", path, err)))?;
            EngineConfig::from_ron_str(&source)
        }
        None => Ok(EngineConfig::default()),
    }
}

fn simulate(args: &Args) -> Result<(), EngineError> {
    let config = load_config(args.config_path.as_deref())?;
    let mut run = Run::new(args.seed, args.nodes, config, default_catalog()?)?;
    let lines = autopilot(&mut run, &ScoringPilot::new())?;
    for line in &lines {
        println!("{}", line);
    }
    if args.snapshot {
        println!("{}", run.snapshot().to_json()?);
    }
    info!(events = lines.len(), result = %run.result(), "simulation finished");
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("usage: overstack-sim [--seed N] [--nodes N] [--config path.ron] [--snapshot]");
            return ExitCode::from(2);
        }
    };

    match simulate(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "simulation failed");
            ExitCode::FAILURE
        }
    }
}
