//! Time bars: one bar per symbol per wall-clock interval.

use super::sample_partitions;
use crate::aggregator::aggregate_trades;
use tickbar_core::{ts_to_local, Bar, BarFrame, Every, Result, SamplingConfig, TimestampNs};
use tickbar_ingestion::{Partition, TradeFrame, TradeNormalizer};
use tracing::debug;

/// Bucket start of `ts_ns`, truncated on the local wall clock and reported
/// back in UTC.
#[inline]
fn bucket_of(ts_ns: TimestampNs, every: &Every, offset_ns: i64) -> TimestampNs {
    every.truncate(ts_ns + offset_ns) - offset_ns
}

fn time_partition(partition: &Partition, every: &Every, offset_ns: i64) -> Vec<Bar> {
    partition
        .trades
        .chunk_by(|a, b| bucket_of(a.ts_ns, every, offset_ns) == bucket_of(b.ts_ns, every, offset_ns))
        .filter_map(|trades| {
            let bucket = bucket_of(trades[0].ts_ns, every, offset_ns);
            aggregate_trades(&partition.key.symbol, trades, Some(bucket))
        })
        .collect()
}

/// Sample time bars.
///
/// Trades are grouped by symbol and by the `every` interval they fall in.
/// Bars never cross an interval boundary, so `split_by_date` has no effect
/// here.
pub fn time_bars(frame: &TradeFrame, every: &Every, config: &SamplingConfig) -> Result<BarFrame> {
    config.validate()?;
    let normalized = TradeNormalizer::new(config).normalize(frame, false)?;
    let offset_ns = ts_to_local(0, config.utc_offset_minutes);

    let bars = sample_partitions(&normalized.partitions, config.parallel, |partition| {
        Ok(time_partition(partition, every, offset_ns))
    })?;

    debug!(
        bar_type = "time",
        every = %every,
        partitions = normalized.partitions.len(),
        bars = bars.len(),
        "sampled bars"
    );

    Ok(BarFrame {
        bars,
        volume_kind: normalized.size_kind,
    })
}
