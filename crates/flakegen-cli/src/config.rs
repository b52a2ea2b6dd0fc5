use anyhow::bail;
use clap::{Parser, Subcommand};
use core::time::Duration;
use flakegen::{DEFAULT_EPOCH, SnowflakeId, SystemClock, TimeSource};

/// Runtime configuration for the `flakegen` binary.
///
/// The generator identity is normally handed out by deployment tooling, so
/// every global option can also be supplied through the environment or a
/// `.env` file in the working directory.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "flakegen",
    version,
    about = "Generate and decode Snowflake-style 64-bit IDs"
)]
pub struct CliArgs {
    /// Datacenter ID encoded into generated IDs (0-31).
    ///
    /// Environment variable: `DATACENTER_ID`
    #[arg(long, env = "DATACENTER_ID", default_value_t = 0, global = true)]
    pub datacenter_id: u64,

    /// Machine ID encoded into generated IDs (0-31). Must be unique among
    /// processes sharing a datacenter ID.
    ///
    /// Environment variable: `MACHINE_ID`
    #[arg(long, env = "MACHINE_ID", default_value_t = 0, global = true)]
    pub machine_id: u64,

    /// Epoch timestamps are measured from, in milliseconds since the Unix
    /// epoch. Every generator in a namespace must use the same value.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(
        long,
        env = "EPOCH_MS",
        default_value_t = DEFAULT_EPOCH.as_millis() as u64,
        global = true,
    )]
    pub epoch_ms: u64,

    /// Use a monotonic clock that ignores wall-clock steps after startup
    /// instead of failing on clock regression.
    ///
    /// Environment variable: `MONOTONIC_CLOCK`
    #[arg(long, env = "MONOTONIC_CLOCK", default_value_t = false, global = true)]
    pub monotonic: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print freshly generated IDs, one per line.
    Generate {
        /// Number of IDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u64,

        /// Print JSON objects with the decoded fields instead of bare
        /// integers.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the decoded fields of existing IDs.
    Decode {
        /// IDs to decode, as decimal integers.
        #[arg(required = true)]
        ids: Vec<u64>,

        /// Print JSON objects instead of a human-readable summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockKind {
    System,
    Monotonic,
}

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub epoch: Duration,
    pub datacenter_id: u64,
    pub machine_id: u64,
    pub clock: ClockKind,
    pub command: Command,
}

impl TryFrom<CliArgs> for CliConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.datacenter_id > SnowflakeId::MAX_DATACENTER_ID {
            bail!(
                "DATACENTER_ID ({}) exceeds the datacenter ID space (max = {})",
                args.datacenter_id,
                SnowflakeId::MAX_DATACENTER_ID
            );
        }

        if args.machine_id > SnowflakeId::MAX_MACHINE_ID {
            bail!(
                "MACHINE_ID ({}) exceeds the machine ID space (max = {})",
                args.machine_id,
                SnowflakeId::MAX_MACHINE_ID
            );
        }

        let now = SystemClock.current_millis();
        if args.epoch_ms > now {
            bail!("EPOCH_MS ({}) lies in the future (now = {now})", args.epoch_ms);
        }

        if let Command::Generate { count: 0, .. } = args.command {
            bail!("--count must be greater than 0");
        }

        Ok(Self {
            epoch: Duration::from_millis(args.epoch_ms),
            datacenter_id: args.datacenter_id,
            machine_id: args.machine_id,
            clock: if args.monotonic {
                ClockKind::Monotonic
            } else {
                ClockKind::System
            },
            command: args.command,
        })
    }
}
