use std::io::Write;

use anyhow::{Context, bail};
use core::time::Duration;
use flakegen::{IdGenerator, SnowflakeId, SnowflakeParts, TimeSource};
use serde::Serialize;

/// One ID together with its decoded fields, as printed by `--json`.
#[derive(Serialize, Debug)]
struct IdRecord {
    id: u64,
    unix_millis: u64,
    #[serde(flatten)]
    parts: SnowflakeParts,
}

impl IdRecord {
    fn new(id: SnowflakeId, epoch: Duration) -> Self {
        Self {
            id: id.to_raw(),
            unix_millis: id.unix_millis(epoch),
            parts: id.into_parts(),
        }
    }
}

fn write_id(
    out: &mut impl Write,
    id: SnowflakeId,
    epoch: Duration,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &IdRecord::new(id, epoch))?;
        writeln!(out)?;
    } else {
        writeln!(out, "{id}")?;
    }
    Ok(())
}

/// Draws `count` IDs from `generator` and writes one per line.
///
/// Stops at the first failure; IDs written before it remain valid.
pub fn run_generate<T>(
    generator: &IdGenerator<T>,
    count: u64,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()>
where
    T: TimeSource,
{
    tracing::debug!(
        count,
        datacenter_id = generator.datacenter_id(),
        machine_id = generator.machine_id(),
        "generating IDs"
    );

    let epoch = generator.epoch();
    for n in 0..count {
        let id = match generator.try_next_id() {
            Ok(id) => id,
            Err(err) => {
                if err.is_clock_error() {
                    tracing::error!(%err, issued = n, "clock rejected by generator");
                }
                return Err(err)
                    .with_context(|| format!("failed to generate ID {} of {count}", n + 1));
            }
        };
        write_id(out, id, epoch, json)?;
    }

    out.flush()?;
    Ok(())
}

/// Writes the decoded fields of each raw ID, interpreting timestamps
/// relative to `epoch`.
pub fn run_decode(
    ids: &[u64],
    epoch: Duration,
    json: bool,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    for &raw in ids {
        let id = SnowflakeId::from_raw(raw);
        if !id.is_valid() {
            bail!("{raw} sets the reserved bit and cannot be a generated ID");
        }

        if json {
            write_id(out, id, epoch, true)?;
        } else {
            writeln!(
                out,
                "{id}: unix_millis={} timestamp={} datacenter_id={} machine_id={} sequence={}",
                id.unix_millis(epoch),
                id.timestamp(),
                id.datacenter_id(),
                id.machine_id(),
                id.sequence(),
            )?;
        }
    }

    out.flush()?;
    Ok(())
}
