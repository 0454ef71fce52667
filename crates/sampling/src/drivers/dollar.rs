//! Dollar bars: a fixed amount of traded value (`price * size`) per bar.

use super::sample_partitions;
use crate::aggregator::aggregate_groups;
use crate::splitter::split_by_dollar;
use tickbar_core::{positive_amount, BarFrame, DollarSplit, Result, SamplingConfig, SizeKind};
use tickbar_ingestion::{TradeFrame, TradeNormalizer};
use tracing::debug;

/// Sample dollar bars of `bar_size` traded value each.
///
/// With [`DollarSplit::Proportional`] a straddling trade's size is divided
/// in proportion to the dollar value each bar receives, and every bar but
/// the last of a partition holds exactly `bar_size`. With
/// [`DollarSplit::UnitExpansion`] trades are cut into whole units that are
/// never split, so bars may land slightly under or over `bar_size`.
pub fn dollar_bars(frame: &TradeFrame, bar_size: f64, config: &SamplingConfig) -> Result<BarFrame> {
    let bar_size = positive_amount(bar_size)?;
    config.validate()?;
    let normalized = TradeNormalizer::new(config).normalize(frame, config.split_by_date)?;
    let strategy = config.dollar_split;

    let bars = sample_partitions(&normalized.partitions, config.parallel, |partition| {
        let rows = split_by_dollar(&partition.trades, bar_size, strategy)?;
        Ok(aggregate_groups(&partition.key.symbol, &rows))
    })?;

    debug!(
        bar_type = "dollar",
        bar_size,
        strategy = ?strategy,
        partitions = normalized.partitions.len(),
        bars = bars.len(),
        "sampled bars"
    );

    let volume_kind = match strategy {
        DollarSplit::Proportional => SizeKind::Float,
        DollarSplit::UnitExpansion => normalized.size_kind,
    };
    Ok(BarFrame { bars, volume_kind })
}
