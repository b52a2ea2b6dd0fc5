#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::io::{BufWriter, Write};

use clap::Parser;
use config::{CliArgs, CliConfig, ClockKind, Command};
use flakegen::{IdGenerator, MonotonicClock, SystemClock, TimeSource};
use telemetry::init_telemetry;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = CliConfig::try_from(args)?;

    init_telemetry()?;

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match config.clock {
        ClockKind::System => run(&config, SystemClock, &mut out),
        ClockKind::Monotonic => run(&config, MonotonicClock::new(), &mut out),
    }
}

fn run<T>(config: &CliConfig, time: T, out: &mut impl Write) -> anyhow::Result<()>
where
    T: TimeSource,
{
    match &config.command {
        Command::Generate { count, json } => {
            let generator = IdGenerator::with_epoch(
                config.epoch,
                config.datacenter_id,
                config.machine_id,
                time,
            )?;
            command::run_generate(&generator, *count, *json, out)
        }
        Command::Decode { ids, json } => command::run_decode(ids, config.epoch, *json, out),
    }
}
