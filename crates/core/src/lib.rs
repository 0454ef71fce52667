//! Core types and configuration for the tickbar system.
//!
//! This crate provides shared types used across all other crates:
//! - Market data types (trades, bars, partition keys)
//! - Bar-size grammar for time bars
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod duration;
pub mod error;
pub mod types;

pub use config::{ColumnNames, DollarSplit, SamplingConfig};
pub use duration::{positive_amount, positive_count, Every};
pub use error::{Error, Result};
pub use types::*;
