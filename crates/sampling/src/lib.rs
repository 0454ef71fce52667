//! Bar sampling for the tickbar system.
//!
//! This crate handles:
//! - Bar-group assignment over a threshold metric (size or dollar value)
//! - Splitting trades that straddle a bar boundary
//! - OHLCV aggregation of grouped trades
//! - Time, tick, volume and dollar bar drivers, parallel across partitions

pub mod aggregator;
pub mod assigner;
pub mod drivers;
pub mod splitter;

pub use aggregator::BarAccumulator;
pub use assigner::{assign_dynamic_tick_groups, assign_groups, assign_tick_groups, GroupAssigner, GroupAssignment};
pub use drivers::{dollar_bars, dynamic_tick_bars, tick_bars, time_bars, volume_bars, BarSampler, BarSpec};
pub use splitter::{split_by_dollar, split_by_volume, SplitTrade};
