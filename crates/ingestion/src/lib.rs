//! Data ingestion and normalization for the tickbar system.
//!
//! This crate handles:
//! - The in-memory columnar trade batch (`TradeFrame`)
//! - Column resolution through configured names
//! - Null-price filtering, timestamp sorting and partitioning by
//!   symbol and calendar date

pub mod frame;
pub mod normalizer;

pub use frame::{Column, TradeFrame, TradeFrameBuilder};
pub use normalizer::{NormalizeStats, NormalizedTrades, Partition, TradeNormalizer};
