//! Bar-group assignment.
//!
//! Walks a partition's trades in time order, accumulating a threshold metric
//! (size for volume bars, `price * size` for dollar bars) and assigning each
//! trade to one or more consecutive groups. With splitting enabled, a trade
//! that straddles a boundary is divided so that every closed group holds
//! exactly `bar_size`.

use serde::{Deserialize, Serialize};
use tickbar_core::{positive_amount, positive_count, Error, Result};

/// Relative tolerance for treating a group as exactly full.
///
/// A few ulps of `bar_size`: enough to absorb rounding in dollar sums,
/// always far below one unit, so integral volumes stay exact.
const FILL_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// One trade's share of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignment {
    /// Index of the trade in the scanned sequence.
    pub trade_index: usize,
    /// Group the share belongs to.
    pub group_id: usize,
    /// Amount of the trade's metric allocated to this group.
    pub amount: f64,
}

/// Streaming assigner carrying the fill of the open group.
#[derive(Debug, Clone)]
pub struct GroupAssigner {
    bar_size: f64,
    tolerance: f64,
    allow_splits: bool,
    group_id: usize,
    fill: f64,
}

impl GroupAssigner {
    /// Create an assigner for one partition.
    pub fn new(bar_size: f64, allow_splits: bool) -> Result<Self> {
        let bar_size = positive_amount(bar_size)?;
        Ok(Self {
            bar_size,
            tolerance: bar_size * FILL_TOLERANCE,
            allow_splits,
            group_id: 0,
            fill: 0.0,
        })
    }

    /// Create an assigner that closes a group only once its fill reaches
    /// `bar_size`, with no rounding slack. Suited to integral metrics.
    pub fn exact(bar_size: f64, allow_splits: bool) -> Result<Self> {
        let mut assigner = Self::new(bar_size, allow_splits)?;
        assigner.tolerance = 0.0;
        Ok(assigner)
    }

    /// Group the next trade will start in.
    #[inline]
    pub fn current_group(&self) -> usize {
        self.group_id
    }

    /// Metric accumulated in the open group.
    #[inline]
    pub fn fill(&self) -> f64 {
        self.fill
    }

    fn close_if_full(&mut self) {
        if self.bar_size - self.fill <= self.tolerance {
            self.group_id += 1;
            self.fill = 0.0;
        }
    }

    /// Assign one trade's metric, appending its shares to `out`.
    ///
    /// `metric` must be positive. Shares are emitted in group order and sum
    /// to `metric`; no zero-amount share is ever emitted.
    pub fn push(&mut self, trade_index: usize, metric: f64, out: &mut Vec<GroupAssignment>) {
        if !self.allow_splits {
            if self.fill > 0.0 && self.fill + metric > self.bar_size + self.tolerance {
                self.group_id += 1;
                self.fill = 0.0;
            }
            out.push(GroupAssignment {
                trade_index,
                group_id: self.group_id,
                amount: metric,
            });
            self.fill += metric;
            self.close_if_full();
            return;
        }

        let mut allocated = 0.0;
        loop {
            let remaining = metric - allocated;
            let capacity = self.bar_size - self.fill;
            if remaining <= capacity + self.tolerance {
                out.push(GroupAssignment {
                    trade_index,
                    group_id: self.group_id,
                    amount: remaining,
                });
                self.fill += remaining;
                self.close_if_full();
                return;
            }
            out.push(GroupAssignment {
                trade_index,
                group_id: self.group_id,
                amount: capacity,
            });
            allocated += capacity;
            self.group_id += 1;
            self.fill = 0.0;
        }
    }
}

/// Assign groups over a whole partition's metric values.
pub fn assign_groups(metrics: &[f64], bar_size: f64, allow_splits: bool) -> Result<Vec<GroupAssignment>> {
    let mut assigner = GroupAssigner::new(bar_size, allow_splits)?;
    let mut out = Vec::with_capacity(metrics.len());
    for (index, &metric) in metrics.iter().enumerate() {
        if !metric.is_finite() || metric <= 0.0 {
            return Err(Error::data(format!(
                "metric at index {index} must be positive, got {metric}"
            )));
        }
        assigner.push(index, metric, &mut out);
    }
    Ok(out)
}

/// Tick groups: trade ordinal divided by the bar size.
pub fn assign_tick_groups(n_trades: usize, bar_size: u64) -> Result<Vec<usize>> {
    let bar_size = positive_count(bar_size)? as usize;
    Ok((0..n_trades).map(|ordinal| ordinal / bar_size).collect())
}

/// Tick groups driven by a per-row threshold.
///
/// Each non-null row joins the open group and increments its row count; once
/// the count reaches that row's threshold the next row opens a new group.
/// Null thresholds yield no group.
pub fn assign_dynamic_tick_groups(thresholds: &[Option<u32>]) -> Vec<Option<usize>> {
    let mut group_id = 0usize;
    let mut row_count = 0u32;
    thresholds
        .iter()
        .map(|threshold| {
            let threshold = (*threshold)?;
            let group = group_id;
            row_count += 1;
            if row_count >= threshold {
                group_id += 1;
                row_count = 0;
            }
            Some(group)
        })
        .collect()
}
