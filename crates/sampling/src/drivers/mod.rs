//! Bar drivers.
//!
//! Each driver runs normalize -> group (-> split) -> aggregate over every
//! partition and returns the bars of all partitions sorted by end time.
//! Partitions are independent and fan out over rayon when
//! [`SamplingConfig::parallel`] is set.

mod dollar;
mod tick;
mod time;
mod volume;

pub use dollar::dollar_bars;
pub use tick::{dynamic_tick_bars, tick_bars};
pub use time::time_bars;
pub use volume::volume_bars;

use crate::aggregator::sort_bars;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tickbar_core::{Bar, BarFrame, Every, Result, SamplingConfig};
use tickbar_ingestion::{Partition, TradeFrame};

/// Sampling regime together with its threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "bar_size", rename_all = "snake_case")]
pub enum BarSpec {
    /// Fixed wall-clock intervals.
    Time(Every),
    /// Fixed number of trades.
    Tick(u64),
    /// Fixed traded volume.
    Volume(u64),
    /// Fixed traded dollar value.
    Dollar(f64),
}

impl BarSpec {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            BarSpec::Time(_) => "time",
            BarSpec::Tick(_) => "tick",
            BarSpec::Volume(_) => "volume",
            BarSpec::Dollar(_) => "dollar",
        }
    }
}

/// Bar sampler bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct BarSampler {
    config: SamplingConfig,
}

impl BarSampler {
    /// Create a sampler, validating the configuration.
    pub fn new(config: SamplingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The sampler's configuration.
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Sample bars according to `spec`.
    pub fn sample(&self, frame: &TradeFrame, spec: &BarSpec) -> Result<BarFrame> {
        match spec {
            BarSpec::Time(every) => self.time_bars(frame, every),
            BarSpec::Tick(n) => self.tick_bars(frame, *n),
            BarSpec::Volume(v) => self.volume_bars(frame, *v),
            BarSpec::Dollar(d) => self.dollar_bars(frame, *d),
        }
    }

    /// Time bars over `every` intervals.
    pub fn time_bars(&self, frame: &TradeFrame, every: &Every) -> Result<BarFrame> {
        time_bars(frame, every, &self.config)
    }

    /// Tick bars of `bar_size` trades.
    pub fn tick_bars(&self, frame: &TradeFrame, bar_size: u64) -> Result<BarFrame> {
        tick_bars(frame, bar_size, &self.config)
    }

    /// Tick bars whose size is read per trade from `threshold_column`.
    pub fn dynamic_tick_bars(&self, frame: &TradeFrame, threshold_column: &str) -> Result<BarFrame> {
        dynamic_tick_bars(frame, threshold_column, &self.config)
    }

    /// Volume bars of `bar_size` units.
    pub fn volume_bars(&self, frame: &TradeFrame, bar_size: u64) -> Result<BarFrame> {
        volume_bars(frame, bar_size, &self.config)
    }

    /// Dollar bars of `bar_size` traded value.
    pub fn dollar_bars(&self, frame: &TradeFrame, bar_size: f64) -> Result<BarFrame> {
        dollar_bars(frame, bar_size, &self.config)
    }
}

/// Run `per_partition` over every partition and merge the sorted output.
pub(crate) fn sample_partitions<F>(partitions: &[Partition], parallel: bool, per_partition: F) -> Result<Vec<Bar>>
where
    F: Fn(&Partition) -> Result<Vec<Bar>> + Sync + Send,
{
    let chunks: Vec<Vec<Bar>> = if parallel {
        partitions
            .par_iter()
            .map(&per_partition)
            .collect::<Result<Vec<_>>>()?
    } else {
        partitions
            .iter()
            .map(&per_partition)
            .collect::<Result<Vec<_>>>()?
    };

    let mut bars: Vec<Bar> = chunks.into_iter().flatten().collect();
    sort_bars(&mut bars);
    Ok(bars)
}
