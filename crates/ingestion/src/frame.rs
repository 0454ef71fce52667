//! In-memory columnar batch of trade rows.
//!
//! `TradeFrame` is the record collection handed to the normalizer. Columns
//! are addressed by name so the caller's schema can be mapped through
//! [`ColumnNames`].

use tickbar_core::{ColumnNames, Error, Result, SizeKind, TimestampNs, Trade};

/// A nullable column of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Strings (symbols).
    Utf8(Vec<Option<String>>),
    /// Timestamps in nanoseconds since the Unix epoch.
    Datetime(Vec<Option<TimestampNs>>),
    /// 64-bit floats.
    Float64(Vec<Option<f64>>),
    /// 64-bit integers.
    Int64(Vec<Option<i64>>),
}

impl Column {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            Column::Utf8(v) => v.len(),
            Column::Datetime(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Int64(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Type name used in schema errors.
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::Utf8(_) => "utf8",
            Column::Datetime(_) => "datetime[ns]",
            Column::Float64(_) => "f64",
            Column::Int64(_) => "i64",
        }
    }
}

/// A batch of equally long, named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeFrame {
    columns: Vec<(String, Column)>,
    height: usize,
}

impl TradeFrame {
    /// Create an empty frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a column. All columns must have the same length.
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self> {
        let name = name.into();
        let others = self.columns.iter().filter(|(n, _)| *n != name).count();
        if others > 0 && column.len() != self.height {
            return Err(Error::data(format!(
                "column '{name}' has {} rows, frame has {}",
                column.len(),
                self.height
            )));
        }
        self.height = column.len();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = column,
            None => self.columns.push((name, column)),
        }
        Ok(self)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, c)| c)
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Build a frame from trades using the given column names.
    pub fn from_trades(columns: &ColumnNames, trades: &[Trade], size_kind: SizeKind) -> Result<Self> {
        let mut builder = TradeFrameBuilder::new(columns.clone(), size_kind);
        for trade in trades {
            builder.push(&trade.symbol, trade.ts_ns, Some(trade.price), trade.size);
        }
        builder.finish()
    }
}

/// Row-at-a-time builder for a [`TradeFrame`].
#[derive(Debug, Clone)]
pub struct TradeFrameBuilder {
    names: ColumnNames,
    size_kind: SizeKind,
    symbols: Vec<Option<String>>,
    timestamps: Vec<Option<TimestampNs>>,
    prices: Vec<Option<f64>>,
    sizes: Vec<Option<f64>>,
}

impl TradeFrameBuilder {
    /// Create a builder writing to the given column names.
    pub fn new(names: ColumnNames, size_kind: SizeKind) -> Self {
        Self {
            names,
            size_kind,
            symbols: Vec::new(),
            timestamps: Vec::new(),
            prices: Vec::new(),
            sizes: Vec::new(),
        }
    }

    /// Append a trade row. `price` may be null.
    pub fn push(&mut self, symbol: &str, ts_ns: TimestampNs, price: Option<f64>, size: f64) -> &mut Self {
        self.push_nullable(Some(symbol), Some(ts_ns), price, Some(size))
    }

    /// Append a row where any field may be null.
    pub fn push_nullable(
        &mut self,
        symbol: Option<&str>,
        ts_ns: Option<TimestampNs>,
        price: Option<f64>,
        size: Option<f64>,
    ) -> &mut Self {
        self.symbols.push(symbol.map(str::to_string));
        self.timestamps.push(ts_ns);
        self.prices.push(price);
        self.sizes.push(size);
        self
    }

    /// Finish the frame.
    pub fn finish(self) -> Result<TradeFrame> {
        let sizes = match self.size_kind {
            SizeKind::Integer => Column::Int64(self.sizes.iter().map(|s| s.map(|v| v as i64)).collect()),
            SizeKind::Float => Column::Float64(self.sizes),
        };
        TradeFrame::new()
            .with_column(self.names.symbol, Column::Utf8(self.symbols))?
            .with_column(self.names.timestamp, Column::Datetime(self.timestamps))?
            .with_column(self.names.price, Column::Float64(self.prices))?
            .with_column(self.names.size, sizes)
    }
}
