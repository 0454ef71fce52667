//! Core data types for the tickbar system.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp in nanoseconds since Unix epoch (UTC).
pub type TimestampNs = i64;

/// Size/quantity type.
pub type Size = f64;

/// Nanoseconds in one second.
pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Nanoseconds in one minute.
pub const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;

/// Nanoseconds in one calendar day.
pub const NANOS_PER_DAY: i64 = 86_400 * NANOS_PER_SECOND;

/// Shift a UTC timestamp into a local wall clock `offset_minutes` east of UTC.
#[inline]
pub fn ts_to_local(ts_ns: TimestampNs, offset_minutes: i32) -> TimestampNs {
    ts_ns + offset_minutes as i64 * NANOS_PER_MINUTE
}

/// Calendar date of a timestamp as seen `offset_minutes` east of UTC.
#[inline]
pub fn ts_to_date(ts_ns: TimestampNs, offset_minutes: i32) -> NaiveDate {
    DateTime::from_timestamp_nanos(ts_to_local(ts_ns, offset_minutes)).date_naive()
}

/// Convert a nanosecond timestamp to a `DateTime<Utc>`.
#[inline]
pub fn ts_to_datetime(ts_ns: TimestampNs) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(ts_ns)
}

/// A single trade (print) read from the input frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Row position in the source frame.
    pub row: usize,
    /// Instrument symbol.
    pub symbol: String,
    /// Timestamp in nanoseconds.
    pub ts_ns: TimestampNs,
    /// Trade price.
    pub price: f64,
    /// Trade size.
    pub size: Size,
}

impl Trade {
    /// Traded dollar value (`price * size`).
    #[inline]
    pub fn dollar_value(&self) -> f64 {
        self.price * self.size
    }
}

/// Numeric type of the size column in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeKind {
    /// Integral sizes (shares, contracts).
    Integer,
    /// Fractional sizes (e.g. crypto quantities).
    Float,
}

/// Key under which bar sequencing and thresholds are tracked independently.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartitionKey {
    /// Instrument symbol.
    pub symbol: String,
    /// Calendar date, when partitioning by date.
    pub date: Option<NaiveDate>,
}

impl PartitionKey {
    /// Key for a symbol with no date component.
    pub fn symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            date: None,
        }
    }

    /// Key for a symbol on one calendar date.
    pub fn dated(symbol: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            date: Some(date),
        }
    }
}

/// One aggregated OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument symbol.
    pub symbol: String,
    /// Truncated bucket start for time bars.
    pub bucket: Option<TimestampNs>,
    /// Timestamp of the first contributing trade.
    pub start_ns: TimestampNs,
    /// Timestamp of the last contributing trade.
    pub end_ns: TimestampNs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// VWAP, `None` when the bar has zero volume.
    pub vwap: Option<f64>,
    /// Total volume.
    pub volume: Size,
    /// Number of contributing rows (post-split).
    pub n_trades: u32,
}

impl Bar {
    /// Bar start as a `DateTime<Utc>`.
    pub fn start_time(&self) -> DateTime<Utc> {
        ts_to_datetime(self.start_ns)
    }

    /// Bar end as a `DateTime<Utc>`.
    pub fn end_time(&self) -> DateTime<Utc> {
        ts_to_datetime(self.end_ns)
    }

    /// Traded dollar value (`vwap * volume`).
    #[inline]
    pub fn dollar_volume(&self) -> f64 {
        self.vwap.map_or(0.0, |vwap| vwap * self.volume)
    }

    /// High-low range.
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// The sampled output: bars plus the numeric type of their volume column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarFrame {
    /// Bars sorted by end timestamp.
    pub bars: Vec<Bar>,
    /// Whether `volume` holds integral values.
    pub volume_kind: SizeKind,
}

impl BarFrame {
    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Whether no bars were produced.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Volumes as integers, when the volume column is integral.
    pub fn volumes_i64(&self) -> Option<Vec<i64>> {
        match self.volume_kind {
            SizeKind::Integer => Some(self.bars.iter().map(|b| b.volume.round() as i64).collect()),
            SizeKind::Float => None,
        }
    }

    /// Bars for one symbol, in output order.
    pub fn for_symbol<'a>(&'a self, symbol: &'a str) -> impl Iterator<Item = &'a Bar> + 'a {
        self.bars.iter().filter(move |b| b.symbol == symbol)
    }
}
