//! Log output for the `flakegen` binary.
//!
//! Generated IDs go to stdout, so every log event is written to stderr and
//! piping the output stays clean. Verbosity is controlled with `RUST_LOG`
//! and defaults to `warn`, which surfaces clock anomalies reported by the
//! generator without drowning out normal runs.
//!
//! ```bash
//! RUST_LOG=flakegen=trace flakegen generate -n 3
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
