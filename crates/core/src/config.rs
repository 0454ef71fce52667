//! Configuration structures for the tickbar system.
//!
//! Configuration is an explicit value handed to the normalizer and the bar
//! drivers at call time.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Logical column names of the trade input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    /// Timestamp column.
    pub timestamp: String,
    /// Price column.
    pub price: String,
    /// Size column.
    pub size: String,
    /// Symbol column.
    pub symbol: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            timestamp: "timestamp".to_string(),
            price: "price".to_string(),
            size: "size".to_string(),
            symbol: "symbol".to_string(),
        }
    }
}

impl ColumnNames {
    fn slot_mut(&mut self, key: &str) -> Option<&mut String> {
        match key.strip_suffix("_column").unwrap_or(key) {
            "timestamp" => Some(&mut self.timestamp),
            "price" => Some(&mut self.price),
            "size" => Some(&mut self.size),
            "symbol" => Some(&mut self.symbol),
            _ => None,
        }
    }

    /// Override one column name. Accepts `price_column` as well as `price`.
    pub fn set(&mut self, key: &str, name: impl Into<String>) -> Result<()> {
        let slot = self
            .slot_mut(key)
            .ok_or_else(|| Error::config(format!("unknown column option '{key}'")))?;
        *slot = name.into();
        Ok(())
    }

    /// Resolve a column option to its current name.
    pub fn get(&self, key: &str) -> Result<&str> {
        match key.strip_suffix("_column").unwrap_or(key) {
            "timestamp" => Ok(self.timestamp.as_str()),
            "price" => Ok(self.price.as_str()),
            "size" => Ok(self.size.as_str()),
            "symbol" => Ok(self.symbol.as_str()),
            _ => Err(Error::config(format!("unknown column option '{key}'"))),
        }
    }

    /// Apply a set of key-value overrides on top of these names.
    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (key, name) in overrides {
            self.set(key.as_ref(), name)?;
        }
        Ok(self)
    }
}

/// How dollar bars divide a trade that straddles a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DollarSplit {
    /// Scale the trade's size by the share of its dollar value in each bar.
    #[default]
    Proportional,
    /// Expand the trade into unit-size rows and keep each unit whole.
    UnitExpansion,
}

/// Sampling configuration shared by all bar drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Column names of the trade input.
    pub columns: ColumnNames,
    /// Whether tick/volume/dollar partitions also key on calendar date.
    pub split_by_date: bool,
    /// Minutes east of UTC used to derive calendar dates and time buckets.
    pub utc_offset_minutes: i32,
    /// Split strategy for dollar bars.
    pub dollar_split: DollarSplit,
    /// Fan partitions out over the rayon thread pool.
    pub parallel: bool,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            columns: ColumnNames::default(),
            split_by_date: true,
            utc_offset_minutes: 0,
            dollar_split: DollarSplit::default(),
            parallel: true,
        }
    }
}

impl SamplingConfig {
    /// Load a configuration from JSON; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(Error::config(format!(
                "utc_offset_minutes must be within one day, got {}",
                self.utc_offset_minutes
            )));
        }
        for (role, name) in [
            ("timestamp", &self.columns.timestamp),
            ("price", &self.columns.price),
            ("size", &self.columns.size),
            ("symbol", &self.columns.symbol),
        ] {
            if name.is_empty() {
                return Err(Error::config(format!("{role} column name is empty")));
            }
        }
        Ok(())
    }

    /// Replace the column names.
    pub fn with_columns(mut self, columns: ColumnNames) -> Self {
        self.columns = columns;
        self
    }

    /// Toggle date partitioning.
    pub fn with_split_by_date(mut self, split_by_date: bool) -> Self {
        self.split_by_date = split_by_date;
        self
    }

    /// Set the local-time offset in minutes east of UTC.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }

    /// Choose the dollar-bar split strategy.
    pub fn with_dollar_split(mut self, dollar_split: DollarSplit) -> Self {
        self.dollar_split = dollar_split;
        self
    }

    /// Toggle parallel partition processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
