//! End-to-end bar sampling scenarios.

use chrono::NaiveDate;
use tickbar_core::{ts_to_date, ColumnNames, DollarSplit, Error, Every, SamplingConfig, SizeKind, NANOS_PER_SECOND};
use tickbar_ingestion::{Column, TradeFrame, TradeFrameBuilder};
use tickbar_sampling::{BarSampler, BarSpec};

const T0: i64 = 1_708_300_800 * NANOS_PER_SECOND; // 2024-02-19 00:00:00 UTC
const HOUR: i64 = 3_600 * NANOS_PER_SECOND;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Ten trades of 30 shares for one symbol, five before and five after
/// midnight.
fn two_day_frame() -> TradeFrame {
    let mut builder = TradeFrameBuilder::new(ColumnNames::default(), SizeKind::Integer);
    for i in 0..5 {
        builder.push("AAPL", T0 + 19 * HOUR + i * HOUR / 2, Some(180.0 + i as f64), 30.0);
    }
    for i in 0..5 {
        builder.push("AAPL", T0 + 24 * HOUR + 9 * HOUR + i * HOUR / 2, Some(185.0 - i as f64), 30.0);
    }
    builder.finish().unwrap()
}

#[test]
fn single_trade_volume_split() -> anyhow::Result<()> {
    init_tracing();
    let mut builder = TradeFrameBuilder::new(ColumnNames::default(), SizeKind::Integer);
    builder.push("A", T0, Some(3.0), 8.0);
    let frame = builder.finish()?;

    let out = BarSampler::new(SamplingConfig::default())?.sample(&frame, &BarSpec::Volume(5))?;

    assert_eq!(out.len(), 2);
    let mut volumes = out.volumes_i64().unwrap();
    volumes.sort_unstable();
    assert_eq!(volumes, vec![3, 5]);
    for bar in &out.bars {
        assert_eq!(bar.symbol, "A");
        assert_eq!(bar.n_trades, 1);
        assert_eq!(bar.open, 3.0);
        assert_eq!(bar.high, 3.0);
        assert_eq!(bar.low, 3.0);
        assert_eq!(bar.close, 3.0);
        assert_eq!(bar.vwap, Some(3.0));
    }
    Ok(())
}

#[test]
fn volume_bars_never_cross_midnight() -> anyhow::Result<()> {
    init_tracing();
    let sampler = BarSampler::new(SamplingConfig::default())?;
    // 150 shares per day against a 100 share threshold: the threshold is
    // crossed mid-day and the day's remainder forms its own partial bar.
    let out = sampler.volume_bars(&two_day_frame(), 100)?;

    let dates: Vec<(NaiveDate, NaiveDate)> = out
        .bars
        .iter()
        .map(|b| (ts_to_date(b.start_ns, 0), ts_to_date(b.end_ns, 0)))
        .collect();
    assert!(dates.iter().all(|(start, end)| start == end));
    assert_eq!(out.volumes_i64(), Some(vec![100, 50, 100, 50]));

    let joined = BarSampler::new(SamplingConfig::default().with_split_by_date(false))?
        .volume_bars(&two_day_frame(), 100)?;
    assert_eq!(joined.volumes_i64(), Some(vec![100, 100, 100]));
    assert_ne!(
        ts_to_date(joined.bars[1].start_ns, 0),
        ts_to_date(joined.bars[1].end_ns, 0)
    );
    Ok(())
}

#[test]
fn dollar_bars_never_cross_midnight() -> anyhow::Result<()> {
    init_tracing();
    for strategy in [DollarSplit::Proportional, DollarSplit::UnitExpansion] {
        let config = SamplingConfig::default().with_dollar_split(strategy);
        let out = BarSampler::new(config)?.dollar_bars(&two_day_frame(), 10_000.0)?;
        for bar in &out.bars {
            assert_eq!(ts_to_date(bar.start_ns, 0), ts_to_date(bar.end_ns, 0));
        }
        let total: f64 = out.bars.iter().map(|b| b.dollar_volume()).sum();
        let expected: f64 = (0..5).map(|i| 30.0 * (180.0 + i as f64) + 30.0 * (185.0 - i as f64)).sum();
        assert!((total - expected).abs() < 1e-6, "{strategy:?}: {total} != {expected}");
    }
    Ok(())
}

#[test]
fn custom_column_names() -> anyhow::Result<()> {
    init_tracing();
    let columns = ColumnNames::default().with_overrides([
        ("timestamp_column", "ts_event"),
        ("price_column", "px"),
        ("size_column", "qty"),
        ("symbol_column", "ticker"),
    ])?;
    let mut builder = TradeFrameBuilder::new(columns.clone(), SizeKind::Float);
    builder
        .push("BTC", T0, Some(50_000.0), 0.25)
        .push("BTC", T0 + 1, Some(50_010.0), 0.5);
    let frame = builder.finish()?;

    let config = SamplingConfig::default().with_columns(columns);
    let out = BarSampler::new(config)?.sample(&frame, &BarSpec::Tick(10))?;
    assert_eq!(out.len(), 1);
    assert_eq!(out.volume_kind, SizeKind::Float);
    assert!(out.volumes_i64().is_none());
    assert!((out.bars[0].volume - 0.75).abs() < 1e-12);

    // The default names do not resolve against this frame.
    let err = BarSampler::new(SamplingConfig::default())?
        .sample(&frame, &BarSpec::Tick(10))
        .unwrap_err();
    assert!(matches!(err, Error::Schema(_)));
    Ok(())
}

#[test]
fn integer_timestamps_and_prices_are_accepted() -> anyhow::Result<()> {
    let frame = TradeFrame::new()
        .with_column("symbol", Column::Utf8(vec![Some("A".into()), Some("A".into())]))?
        .with_column("timestamp", Column::Int64(vec![Some(T0), Some(T0 + 1)]))?
        .with_column("price", Column::Int64(vec![Some(10), Some(12)]))?
        .with_column("size", Column::Int64(vec![Some(1), Some(3)]))?;

    let out = BarSampler::default().time_bars(&frame, &Every::parse("1h")?)?;
    assert_eq!(out.len(), 1);
    assert_eq!(out.bars[0].vwap, Some((10.0 + 36.0) / 4.0));
    Ok(())
}

#[test]
fn parallel_and_sequential_agree() -> anyhow::Result<()> {
    let mut builder = TradeFrameBuilder::new(ColumnNames::default(), SizeKind::Integer);
    for i in 0..300i64 {
        let symbol = ["AAPL", "MSFT", "TQQQ"][(i % 3) as usize];
        builder.push(symbol, T0 + i * 7 * 60 * NANOS_PER_SECOND, Some(100.0 + (i % 17) as f64), (1 + i % 40) as f64);
    }
    let frame = builder.finish()?;

    let specs = [
        BarSpec::Time(Every::parse("15m")?),
        BarSpec::Tick(7),
        BarSpec::Volume(250),
        BarSpec::Dollar(12_345.0),
    ];
    let parallel = BarSampler::new(SamplingConfig::default())?;
    let sequential = BarSampler::new(SamplingConfig::default().with_parallel(false))?;
    for spec in &specs {
        let a = parallel.sample(&frame, spec)?;
        let b = sequential.sample(&frame, spec)?;
        assert_eq!(a, b, "{} bars differ", spec.kind());
        assert!(a.bars.windows(2).all(|w| w[0].end_ns <= w[1].end_ns));
    }
    Ok(())
}

#[test]
fn null_prices_are_dropped_not_errors() -> anyhow::Result<()> {
    let mut builder = TradeFrameBuilder::new(ColumnNames::default(), SizeKind::Integer);
    builder
        .push("A", T0, None, 10.0)
        .push("A", T0 + 1, Some(5.0), 10.0)
        .push("A", T0 + 2, None, 10.0);
    let out = BarSampler::default().tick_bars(&builder.finish()?, 100)?;

    assert_eq!(out.len(), 1);
    assert_eq!(out.bars[0].n_trades, 1);
    Ok(())
}

#[test]
fn empty_input_yields_no_bars() -> anyhow::Result<()> {
    let frame = TradeFrameBuilder::new(ColumnNames::default(), SizeKind::Integer).finish()?;
    let sampler = BarSampler::default();
    assert!(sampler.volume_bars(&frame, 100)?.is_empty());
    assert!(sampler.dollar_bars(&frame, 100.0)?.is_empty());
    // Threshold validation happens before any rows are read.
    assert!(matches!(sampler.volume_bars(&frame, 0), Err(Error::Config(_))));
    Ok(())
}
