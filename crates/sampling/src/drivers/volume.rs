//! Volume bars: a fixed amount of traded size per bar.

use super::sample_partitions;
use crate::aggregator::aggregate_groups;
use crate::splitter::split_by_volume;
use tickbar_core::{positive_count, BarFrame, Result, SamplingConfig};
use tickbar_ingestion::{TradeFrame, TradeNormalizer};
use tracing::debug;

/// Sample volume bars of `bar_size` units each.
///
/// A trade whose size straddles a boundary is split across consecutive
/// bars; every bar but the last of a partition holds exactly `bar_size`.
pub fn volume_bars(frame: &TradeFrame, bar_size: u64, config: &SamplingConfig) -> Result<BarFrame> {
    let threshold = positive_count(bar_size)? as f64;
    config.validate()?;
    let normalized = TradeNormalizer::new(config).normalize(frame, config.split_by_date)?;

    let bars = sample_partitions(&normalized.partitions, config.parallel, |partition| {
        let rows = split_by_volume(&partition.trades, threshold)?;
        Ok(aggregate_groups(&partition.key.symbol, &rows))
    })?;

    debug!(
        bar_type = "volume",
        bar_size,
        partitions = normalized.partitions.len(),
        bars = bars.len(),
        "sampled bars"
    );

    Ok(BarFrame {
        bars,
        volume_kind: normalized.size_kind,
    })
}
