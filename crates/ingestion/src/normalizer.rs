//! Trade normalization.
//!
//! Reads trades out of a [`TradeFrame`], drops rows that cannot be sampled,
//! sorts by timestamp and splits the stream into partitions keyed by symbol
//! and, optionally, calendar date.

use crate::frame::{Column, TradeFrame};
use std::collections::BTreeMap;
use tickbar_core::{
    ts_to_date, ColumnNames, Error, PartitionKey, Result, SamplingConfig, SizeKind, TimestampNs, Trade,
};
use tracing::{debug, warn};

/// Counters collected while normalizing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    /// Rows in the input frame.
    pub input_rows: usize,
    /// Rows dropped because the price was null.
    pub null_price_rows: usize,
    /// Rows dropped because timestamp, size or symbol was null.
    pub incomplete_rows: usize,
    /// Trades kept.
    pub output_rows: usize,
    /// Number of partitions produced.
    pub partitions: usize,
}

/// Time-ordered trades sharing one partition key.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    /// Partition key.
    pub key: PartitionKey,
    /// Trades sorted ascending by timestamp.
    pub trades: Vec<Trade>,
}

/// Output of [`TradeNormalizer::normalize`].
#[derive(Debug, Clone)]
pub struct NormalizedTrades {
    /// Partitions in key order.
    pub partitions: Vec<Partition>,
    /// Numeric type of the input size column.
    pub size_kind: SizeKind,
    /// Row counters.
    pub stats: NormalizeStats,
}

impl NormalizedTrades {
    /// Total number of trades across partitions.
    pub fn trade_count(&self) -> usize {
        self.partitions.iter().map(|p| p.trades.len()).sum()
    }
}

/// Validates, sorts and partitions raw trade rows.
#[derive(Debug, Clone)]
pub struct TradeNormalizer {
    columns: ColumnNames,
    utc_offset_minutes: i32,
}

enum Numbers<'a> {
    Float(&'a [Option<f64>]),
    Int(&'a [Option<i64>]),
}

impl Numbers<'_> {
    #[inline]
    fn get(&self, row: usize) -> Option<f64> {
        match self {
            Numbers::Float(v) => v[row],
            Numbers::Int(v) => v[row].map(|x| x as f64),
        }
    }
}

fn lookup<'a>(frame: &'a TradeFrame, role: &str, name: &str) -> Result<&'a Column> {
    frame
        .column(name)
        .ok_or_else(|| Error::missing_column(role, name))
}

fn wrong_type(role: &str, name: &str, column: &Column) -> Error {
    Error::schema(format!(
        "{role} column '{name}' has unsupported type {}",
        column.dtype()
    ))
}

impl TradeNormalizer {
    /// Create a normalizer from the sampling configuration.
    pub fn new(config: &SamplingConfig) -> Self {
        Self {
            columns: config.columns.clone(),
            utc_offset_minutes: config.utc_offset_minutes,
        }
    }

    /// Read all sampleable trades from the frame, sorted by timestamp.
    ///
    /// Null-price rows are dropped silently and counted. Rows with a null
    /// timestamp, size or symbol are dropped and counted separately. A
    /// non-finite or non-positive price or size is a data error.
    pub fn read_trades(&self, frame: &TradeFrame) -> Result<(Vec<Trade>, SizeKind, NormalizeStats)> {
        let names = &self.columns;

        let timestamps: &[Option<TimestampNs>] = match lookup(frame, "timestamp", &names.timestamp)? {
            Column::Datetime(v) | Column::Int64(v) => v.as_slice(),
            other => return Err(wrong_type("timestamp", &names.timestamp, other)),
        };
        let prices = match lookup(frame, "price", &names.price)? {
            Column::Float64(v) => Numbers::Float(v.as_slice()),
            Column::Int64(v) => Numbers::Int(v.as_slice()),
            other => return Err(wrong_type("price", &names.price, other)),
        };
        let (sizes, size_kind) = match lookup(frame, "size", &names.size)? {
            Column::Float64(v) => (Numbers::Float(v.as_slice()), SizeKind::Float),
            Column::Int64(v) => (Numbers::Int(v.as_slice()), SizeKind::Integer),
            other => return Err(wrong_type("size", &names.size, other)),
        };
        let symbols = match lookup(frame, "symbol", &names.symbol)? {
            Column::Utf8(v) => v,
            other => return Err(wrong_type("symbol", &names.symbol, other)),
        };

        let mut stats = NormalizeStats {
            input_rows: frame.height(),
            ..NormalizeStats::default()
        };
        let mut trades = Vec::with_capacity(frame.height());

        for row in 0..frame.height() {
            let Some(price) = prices.get(row) else {
                stats.null_price_rows += 1;
                continue;
            };
            let (Some(ts_ns), Some(size), Some(symbol)) = (timestamps[row], sizes.get(row), &symbols[row])
            else {
                stats.incomplete_rows += 1;
                continue;
            };
            if !price.is_finite() || price <= 0.0 {
                return Err(Error::data(format!("row {row}: price must be positive, got {price}")));
            }
            if !size.is_finite() || size <= 0.0 {
                return Err(Error::data(format!("row {row}: size must be positive, got {size}")));
            }
            trades.push(Trade {
                row,
                symbol: symbol.clone(),
                ts_ns,
                price,
                size,
            });
        }

        if stats.incomplete_rows > 0 {
            warn!(
                rows = stats.incomplete_rows,
                "dropped trades with null timestamp, size or symbol"
            );
        }

        // Stable: trades sharing a timestamp keep their input order.
        trades.sort_by_key(|t| t.ts_ns);
        stats.output_rows = trades.len();

        Ok((trades, size_kind, stats))
    }

    /// Partition key of a trade.
    #[inline]
    pub fn key_for(&self, trade: &Trade, split_by_date: bool) -> PartitionKey {
        if split_by_date {
            PartitionKey::dated(trade.symbol.clone(), ts_to_date(trade.ts_ns, self.utc_offset_minutes))
        } else {
            PartitionKey::symbol(trade.symbol.clone())
        }
    }

    /// Read, sort and partition the frame.
    pub fn normalize(&self, frame: &TradeFrame, split_by_date: bool) -> Result<NormalizedTrades> {
        let (trades, size_kind, mut stats) = self.read_trades(frame)?;

        let mut grouped: BTreeMap<PartitionKey, Vec<Trade>> = BTreeMap::new();
        for trade in trades {
            let key = self.key_for(&trade, split_by_date);
            grouped.entry(key).or_default().push(trade);
        }

        let partitions: Vec<Partition> = grouped
            .into_iter()
            .map(|(key, trades)| Partition { key, trades })
            .collect();
        stats.partitions = partitions.len();

        debug!(
            input_rows = stats.input_rows,
            null_price_rows = stats.null_price_rows,
            output_rows = stats.output_rows,
            partitions = stats.partitions,
            "normalized trades"
        );

        Ok(NormalizedTrades {
            partitions,
            size_kind,
            stats,
        })
    }
}
