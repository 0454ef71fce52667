//! Trade splitting.
//!
//! Materializes group assignments as rows: a trade that spans several groups
//! becomes one row per group, each carrying its share of the trade's size.
//! Price, timestamp and symbol are per-trade attributes and are copied
//! unchanged.

use crate::assigner::{GroupAssignment, GroupAssigner};
use serde::{Deserialize, Serialize};
use tickbar_core::{DollarSplit, Result, Size, TimestampNs, Trade};

/// A trade, or a share of one, assigned to a single group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitTrade {
    /// Index of the source trade within its partition.
    pub trade_index: usize,
    /// Group within the partition.
    pub group_id: usize,
    /// Timestamp of the source trade.
    pub ts_ns: TimestampNs,
    /// Price of the source trade.
    pub price: f64,
    /// Size allocated to this group.
    pub size: Size,
}

/// Split trades into volume groups of `bar_size` units.
pub fn split_by_volume(trades: &[Trade], bar_size: f64) -> Result<Vec<SplitTrade>> {
    let mut assigner = GroupAssigner::exact(bar_size, true)?;
    let mut shares = Vec::new();
    let mut out = Vec::with_capacity(trades.len());

    for (index, trade) in trades.iter().enumerate() {
        shares.clear();
        assigner.push(index, trade.size, &mut shares);
        out.extend(shares.iter().map(|share| SplitTrade {
            trade_index: index,
            group_id: share.group_id,
            ts_ns: trade.ts_ns,
            price: trade.price,
            size: share.amount,
        }));
    }

    Ok(out)
}

/// Split trades into dollar groups of `bar_size` traded value.
pub fn split_by_dollar(trades: &[Trade], bar_size: f64, strategy: DollarSplit) -> Result<Vec<SplitTrade>> {
    match strategy {
        DollarSplit::Proportional => split_by_dollar_proportional(trades, bar_size),
        DollarSplit::UnitExpansion => split_by_dollar_units(trades, bar_size),
    }
}

/// Scale each share's size by its fraction of the trade's dollar value.
///
/// The last share takes whatever size is left so sizes sum exactly to the
/// trade's size.
fn split_by_dollar_proportional(trades: &[Trade], bar_size: f64) -> Result<Vec<SplitTrade>> {
    let mut assigner = GroupAssigner::new(bar_size, true)?;
    let mut shares: Vec<GroupAssignment> = Vec::new();
    let mut out = Vec::with_capacity(trades.len());

    for (index, trade) in trades.iter().enumerate() {
        let dollars = trade.dollar_value();
        shares.clear();
        assigner.push(index, dollars, &mut shares);

        let last = shares.len() - 1;
        let mut allocated = 0.0;
        for (i, share) in shares.iter().enumerate() {
            let size = if i == last {
                trade.size - allocated
            } else {
                trade.size * (share.amount / dollars)
            };
            allocated += size;
            out.push(SplitTrade {
                trade_index: index,
                group_id: share.group_id,
                ts_ns: trade.ts_ns,
                price: trade.price,
                size,
            });
        }
    }

    Ok(out)
}

/// Expand each trade into unit-size rows, keep every unit whole, and
/// coalesce the units of one trade that land in the same group.
///
/// A fractional size leaves a final sub-unit row. Memory stays proportional
/// to the output; time is proportional to total size.
fn split_by_dollar_units(trades: &[Trade], bar_size: f64) -> Result<Vec<SplitTrade>> {
    let mut assigner = GroupAssigner::new(bar_size, false)?;
    let mut shares = Vec::with_capacity(1);
    let mut out: Vec<SplitTrade> = Vec::with_capacity(trades.len());

    for (index, trade) in trades.iter().enumerate() {
        let whole_units = trade.size.trunc() as u64;
        let fraction = trade.size - whole_units as f64;
        let units = std::iter::repeat(1.0)
            .take(whole_units as usize)
            .chain((fraction > 0.0).then_some(fraction));

        for unit in units {
            shares.clear();
            assigner.push(index, trade.price * unit, &mut shares);
            let group_id = shares[0].group_id;

            match out.last_mut() {
                Some(row) if row.trade_index == index && row.group_id == group_id => row.size += unit,
                _ => out.push(SplitTrade {
                    trade_index: index,
                    group_id,
                    ts_ns: trade.ts_ns,
                    price: trade.price,
                    size: unit,
                }),
            }
        }
    }

    Ok(out)
}
