//! OHLCV aggregation.
//!
//! Reduces the time-ordered rows of one group into a [`Bar`].

use crate::splitter::SplitTrade;
use std::cmp::Ordering;
use tickbar_core::{Bar, TimestampNs, Trade};

/// A bar that's currently being built.
#[derive(Debug, Clone, Default)]
pub struct BarAccumulator {
    start_ns: TimestampNs,
    end_ns: TimestampNs,
    open: Option<f64>,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
    vwap_numerator: f64,
    trade_count: u32,
}

impl BarAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self {
            high: f64::NEG_INFINITY,
            low: f64::INFINITY,
            ..Self::default()
        }
    }

    /// Add one row. Rows must arrive in time order.
    pub fn add(&mut self, ts_ns: TimestampNs, price: f64, size: f64) {
        if self.open.is_none() {
            self.open = Some(price);
            self.start_ns = ts_ns;
        }
        self.end_ns = ts_ns;
        self.high = self.high.max(price);
        self.low = self.low.min(price);
        self.close = price;
        self.volume += size;
        self.vwap_numerator += price * size;
        self.trade_count += 1;
    }

    /// Whether no rows have been added.
    pub fn is_empty(&self) -> bool {
        self.open.is_none()
    }

    fn vwap(&self) -> Option<f64> {
        if self.volume > 0.0 {
            Some(self.vwap_numerator / self.volume)
        } else {
            None
        }
    }

    /// Finish the bar; `None` if no rows were added.
    pub fn to_bar(&self, symbol: &str, bucket: Option<TimestampNs>) -> Option<Bar> {
        let open = self.open?;
        Some(Bar {
            symbol: symbol.to_string(),
            bucket,
            start_ns: self.start_ns,
            end_ns: self.end_ns,
            open,
            high: self.high,
            low: self.low,
            close: self.close,
            vwap: self.vwap(),
            volume: self.volume,
            n_trades: self.trade_count,
        })
    }
}

/// Aggregate whole trades already known to share one group.
pub fn aggregate_trades(symbol: &str, trades: &[Trade], bucket: Option<TimestampNs>) -> Option<Bar> {
    let mut acc = BarAccumulator::new();
    for trade in trades {
        acc.add(trade.ts_ns, trade.price, trade.size);
    }
    acc.to_bar(symbol, bucket)
}

/// Aggregate trades by a per-trade group label, in trade order.
///
/// Labels must be contiguous: once a label is left it does not reappear.
/// Trades labelled `None` are skipped.
pub fn aggregate_labeled<I>(symbol: &str, trades: &[Trade], labels: I) -> Vec<Bar>
where
    I: IntoIterator<Item = Option<usize>>,
{
    let mut bars = Vec::new();
    let mut current = None;
    let mut acc = BarAccumulator::new();
    for (trade, label) in trades.iter().zip(labels) {
        let Some(label) = label else {
            continue;
        };
        if current != Some(label) {
            bars.extend(acc.to_bar(symbol, None));
            acc = BarAccumulator::new();
            current = Some(label);
        }
        acc.add(trade.ts_ns, trade.price, trade.size);
    }
    bars.extend(acc.to_bar(symbol, None));
    bars
}

/// Aggregate split rows into one bar per group, in group order.
///
/// Rows must be ordered by group and, within a group, by time, which is how
/// the splitter emits them.
pub fn aggregate_groups(symbol: &str, rows: &[SplitTrade]) -> Vec<Bar> {
    let mut bars = Vec::new();
    for group in rows.chunk_by(|a, b| a.group_id == b.group_id) {
        let mut acc = BarAccumulator::new();
        for row in group {
            acc.add(row.ts_ns, row.price, row.size);
        }
        bars.extend(acc.to_bar(symbol, None));
    }
    bars
}

/// Sort bars by end timestamp, then symbol, then start timestamp. The sort
/// is stable, so bars of one partition that tie on all three keep their
/// group order.
pub fn sort_bars(bars: &mut [Bar]) {
    bars.sort_by(|a, b| match a.end_ns.cmp(&b.end_ns) {
        Ordering::Equal => a
            .symbol
            .cmp(&b.symbol)
            .then_with(|| a.start_ns.cmp(&b.start_ns)),
        other => other,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn row(group_id: usize, ts_ns: i64, price: f64, size: f64) -> SplitTrade {
        SplitTrade {
            trade_index: 0,
            group_id,
            ts_ns,
            price,
            size,
        }
    }

    #[test]
    fn test_single_trade() {
        let mut acc = BarAccumulator::new();
        acc.add(90_000, 50000.5, 0.1);
        let bar = acc.to_bar("BTCUSDT", None).unwrap();

        assert_eq!(bar.start_ns, 90_000);
        assert_eq!(bar.end_ns, 90_000);
        assert!((bar.open - 50000.5).abs() < 1e-10);
        assert!((bar.close - 50000.5).abs() < 1e-10);
        assert!((bar.volume - 0.1).abs() < 1e-10);
        assert_eq!(bar.n_trades, 1);
    }

    #[test]
    fn test_multiple_trades_same_bar() {
        let mut acc = BarAccumulator::new();
        acc.add(10, 50000.0, 0.1); // Open
        acc.add(20, 50005.0, 0.2); // High
        acc.add(30, 49995.0, 0.1); // Low
        acc.add(50, 50001.0, 0.1); // Close
        let bar = acc.to_bar("BTCUSDT", Some(0)).unwrap();

        assert_eq!(bar.bucket, Some(0));
        assert_eq!((bar.start_ns, bar.end_ns), (10, 50));
        assert!((bar.open - 50000.0).abs() < 1e-10);
        assert!((bar.high - 50005.0).abs() < 1e-10);
        assert!((bar.low - 49995.0).abs() < 1e-10);
        assert!((bar.close - 50001.0).abs() < 1e-10);
        assert!((bar.volume - 0.5).abs() < 1e-10);
        assert_eq!(bar.n_trades, 4);
    }

    #[test]
    fn test_vwap_calculation() {
        // VWAP = (100*50000 + 200*50010) / 300
        let mut acc = BarAccumulator::new();
        acc.add(10, 50000.0, 100.0);
        acc.add(20, 50010.0, 200.0);
        let bar = acc.to_bar("BTCUSDT", None).unwrap();

        let expected_vwap = (100.0 * 50000.0 + 200.0 * 50010.0) / 300.0;
        assert_relative_eq!(bar.vwap.unwrap(), expected_vwap, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_volume_has_no_vwap() {
        let mut acc = BarAccumulator::new();
        acc.add(10, 100.0, 0.0);
        assert_eq!(acc.to_bar("A", None).unwrap().vwap, None);
    }

    #[test]
    fn test_empty_accumulator() {
        let acc = BarAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.to_bar("A", None).is_none());
        assert!(aggregate_trades("A", &[], None).is_none());
    }

    #[test]
    fn test_aggregate_groups() {
        let rows = [
            row(0, 1, 10.0, 3.0),
            row(0, 2, 12.0, 2.0),
            row(1, 2, 12.0, 5.0),
            row(2, 3, 11.0, 1.0),
        ];
        let bars = aggregate_groups("A", &rows);

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].n_trades, 2);
        assert!((bars[0].volume - 5.0).abs() < 1e-10);
        assert!((bars[0].open - 10.0).abs() < 1e-10);
        assert!((bars[0].close - 12.0).abs() < 1e-10);
        // A split trade counts towards every bar it touches.
        assert_eq!(bars[1].n_trades, 1);
        assert!((bars[1].volume - 5.0).abs() < 1e-10);
        assert_eq!(bars[2].start_ns, 3);
    }

    #[test]
    fn test_aggregate_labeled_skips_unlabeled() {
        let trades: Vec<Trade> = (0..4)
            .map(|i| Trade {
                row: i,
                symbol: "A".to_string(),
                ts_ns: i as i64,
                price: 10.0 + i as f64,
                size: 1.0,
            })
            .collect();
        let bars = aggregate_labeled("A", &trades, [Some(0), None, Some(0), Some(1)]);

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].n_trades, 2);
        assert!((bars[0].close - 12.0).abs() < 1e-10);
        assert_eq!(bars[1].start_ns, 3);
    }

    #[test]
    fn test_sort_bars_breaks_end_ties_by_start() {
        let mut late = BarAccumulator::new();
        late.add(5, 1.0, 1.0);
        late.add(9, 1.0, 1.0);
        let mut early = BarAccumulator::new();
        early.add(1, 2.0, 1.0);
        early.add(9, 2.0, 1.0);
        let mut bars: Vec<Bar> = [late, early]
            .iter()
            .filter_map(|acc| acc.to_bar("A", None))
            .collect();

        sort_bars(&mut bars);
        let starts: Vec<i64> = bars.iter().map(|b| b.start_ns).collect();
        assert_eq!(starts, vec![1, 5]);
    }

    #[test]
    fn test_sort_bars_stable_within_symbol() {
        let rows = [row(0, 5, 3.0, 5.0), row(1, 5, 3.0, 3.0)];
        let mut bars = aggregate_groups("B", &rows);
        let mut earlier = aggregate_groups("A", &[row(0, 7, 1.0, 1.0)]);
        let mut also_five = aggregate_groups("A", &[row(0, 5, 1.0, 1.0)]);
        bars.append(&mut earlier);
        bars.append(&mut also_five);

        sort_bars(&mut bars);
        let order: Vec<(&str, i64, f64)> = bars
            .iter()
            .map(|b| (b.symbol.as_str(), b.end_ns, b.volume))
            .collect();
        assert_eq!(order, vec![("A", 5, 1.0), ("B", 5, 5.0), ("B", 5, 3.0), ("A", 7, 1.0)]);
    }
}
