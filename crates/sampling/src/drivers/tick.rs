//! Tick bars: a fixed (or per-row) number of trades per bar.

use super::sample_partitions;
use crate::aggregator::aggregate_labeled;
use crate::assigner::{assign_dynamic_tick_groups, assign_tick_groups};
use tickbar_core::{positive_count, BarFrame, Error, Result, SamplingConfig};
use tickbar_ingestion::{Column, TradeFrame, TradeNormalizer};
use tracing::debug;

/// Sample tick bars of `bar_size` trades each.
///
/// Ticks are atomic, so only the final bar of a partition may hold fewer
/// than `bar_size` trades.
pub fn tick_bars(frame: &TradeFrame, bar_size: u64, config: &SamplingConfig) -> Result<BarFrame> {
    let bar_size = positive_count(bar_size)?;
    config.validate()?;
    let normalized = TradeNormalizer::new(config).normalize(frame, config.split_by_date)?;

    let bars = sample_partitions(&normalized.partitions, config.parallel, |partition| {
        let groups = assign_tick_groups(partition.trades.len(), bar_size)?;
        Ok(aggregate_labeled(
            &partition.key.symbol,
            &partition.trades,
            groups.into_iter().map(Some),
        ))
    })?;

    debug!(
        bar_type = "tick",
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

fn read_thresholds(frame: &TradeFrame, threshold_column: &str) -> Result<Vec<Option<u32>>> {
    let values = match frame.column(threshold_column) {
        Some(Column::Int64(values)) => values,
        Some(other) => {
            return Err(Error::schema(format!(
                "threshold column '{threshold_column}' has unsupported type {}",
                other.dtype()
            )))
        }
        None => return Err(Error::missing_column("threshold", threshold_column)),
    };

    values
        .iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .map(|v| {
                    u32::try_from(v).map_err(|_| {
                        Error::data(format!("row {row}: tick threshold {v} is out of range"))
                    })
                })
                .transpose()
        })
        .collect()
}

/// Sample tick bars whose length is set per trade by `threshold_column`.
///
/// Within each partition a bar closes once its trade count reaches the
/// threshold carried by the trade just added. Trades with a null threshold
/// are left out of every bar.
pub fn dynamic_tick_bars(frame: &TradeFrame, threshold_column: &str, config: &SamplingConfig) -> Result<BarFrame> {
    config.validate()?;
    let thresholds = read_thresholds(frame, threshold_column)?;
    let normalized = TradeNormalizer::new(config).normalize(frame, config.split_by_date)?;

    let bars = sample_partitions(&normalized.partitions, config.parallel, |partition| {
        let partition_thresholds: Vec<Option<u32>> =
            partition.trades.iter().map(|t| thresholds[t.row]).collect();
        Ok(aggregate_labeled(
            &partition.key.symbol,
            &partition.trades,
            assign_dynamic_tick_groups(&partition_thresholds),
        ))
    })?;

    debug!(
        bar_type = "dynamic_tick",
        threshold_column,
        partitions = normalized.partitions.len(),
        bars = bars.len(),
        "sampled bars"
    );

    Ok(BarFrame {
        bars,
        volume_kind: normalized.size_kind,
    })
}
