//! End-to-end scenario tests for the analysis pipeline.
//!
//! Each scenario feeds a synthetic newest-first series through
//! `BreakoutEngine::analyze` and checks the headline outputs: the golden
//! moving-average values, the degenerate flat series, the insufficient-data
//! guard, a strong uptrend breakout, and squeeze detection.

use chrono::{Duration, NaiveDate};
use vela_breakout::stats::{ema, sma};
use vela_breakout::types::TrendDirection;
use vela_breakout::{AnalysisError, BreakoutEngine, Direction, PriceBar};

fn date(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset)
}

/// Chronological (open, high, low, close, volume) rows -> newest-first bars.
fn newest_first(rows: &[(f64, f64, f64, f64, u64)]) -> Vec<PriceBar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(open, high, low, close, volume))| PriceBar {
            date: date(i as i64),
            open,
            high,
            low,
            close,
            volume,
        })
        .rev()
        .collect()
}

fn bars_from_closes(closes: &[f64], volume: u64) -> Vec<PriceBar> {
    let rows: Vec<(f64, f64, f64, f64, u64)> = closes
        .iter()
        .map(|&c| (c * 0.995, c * 1.01, c * 0.99, c, volume))
        .collect();
    newest_first(&rows)
}

// ---- Golden moving averages (30-bar sinusoid) ------------------------------

#[test]
fn sma_and_ema_match_independent_computation() {
    let closes: Vec<f64> = (0..30)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.4).sin())
        .collect();

    // Independent SMA(20): plain mean of the last 20 values.
    let expected_sma: f64 = closes[10..].iter().sum::<f64>() / 20.0;
    assert!((sma(&closes, 20).unwrap() - expected_sma).abs() < 1e-6);

    // Independent EMA(20): SMA seed over the oldest 20 values, then the
    // recurrence walked oldest -> newest.
    let mut expected_ema: f64 = closes[..20].iter().sum::<f64>() / 20.0;
    let k = 2.0 / 21.0;
    for &c in &closes[20..] {
        expected_ema = (c - expected_ema) * k + expected_ema;
    }
    assert!((ema(&closes, 20).unwrap() - expected_ema).abs() < 1e-6);
}

// ---- Insufficient data -----------------------------------------------------

#[test]
fn ten_bars_raise_insufficient_data() {
    let engine = BreakoutEngine::default();
    let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
    let err = engine.analyze(&bars_from_closes(&closes, 50_000)).unwrap_err();
    assert_eq!(
        err,
        AnalysisError::InsufficientData {
            required: 50,
            actual: 10
        }
    );
}

// ---- Degenerate constant series --------------------------------------------

#[test]
fn constant_series_is_neutral_and_patternless() {
    let engine = BreakoutEngine::default();
    // Every bar identical: OHLC all 100, constant volume.
    let rows = vec![(100.0, 100.0, 100.0, 100.0, 40_000u64); 60];
    let result = engine.analyze(&newest_first(&rows)).unwrap();

    assert_eq!(result.signal.direction, Direction::Neutral);
    assert!(result.patterns.matches.iter().all(|m| !m.detected));
    assert!(result.patterns.dominant.is_none());

    let bb = result.indicators.bollinger.unwrap();
    assert_eq!(bb.bandwidth, 0.0);
    assert!(!bb.squeeze.is_squeezing);

    let atr = result.indicators.atr.unwrap();
    assert_eq!(atr.value, 0.0);

    let ma = result.indicators.moving_averages.unwrap();
    assert_eq!(ma.trend, TrendDirection::Neutral);

    // A flat market budgets zero shares.
    assert_eq!(result.stops.position.shares, 0);
}

// ---- Strong uptrend breakout -----------------------------------------------

#[test]
fn uptrend_with_volume_spike_goes_long() {
    let engine = BreakoutEngine::default();

    // 47 bars rising 1% per bar, then 3 breakout bars at +4% on triple
    // volume.
    let mut rows: Vec<(f64, f64, f64, f64, u64)> = Vec::new();
    let mut close = 100.0;
    for _ in 0..47 {
        close *= 1.01;
        rows.push((close * 0.99, close * 1.005, close * 0.985, close, 1_000_000));
    }
    for _ in 0..3 {
        close *= 1.04;
        rows.push((close * 0.962, close * 1.005, close * 0.95, close, 3_000_000));
    }

    let result = engine.analyze(&newest_first(&rows)).unwrap();

    assert_eq!(result.signal.direction, Direction::Long);
    assert!(
        result.signal.probability >= 50.0,
        "probability {}",
        result.signal.probability
    );

    let macd = result.indicators.macd.unwrap();
    assert_eq!(macd.trend, TrendDirection::Bullish);

    // The breakout bars close above the upper band.
    let bb = result.indicators.bollinger.unwrap();
    assert!(
        result.last_close > bb.upper,
        "close {} should exceed upper band {}",
        result.last_close,
        bb.upper
    );

    // Long stops protect from below.
    let stop = result.stops.recommended.unwrap();
    assert!(stop.price < result.last_close);
    assert!(result.stops.position.shares > 0);
}

// ---- Squeeze detection -----------------------------------------------------

#[test]
fn volatility_collapse_reports_squeeze() {
    let engine = BreakoutEngine::default();

    // 25 bars of wide oscillation, then 25 bars at under 20% of that
    // amplitude.
    let closes: Vec<f64> = (0..50)
        .map(|i| {
            let amplitude = if i < 25 { 10.0 } else { 0.8 };
            100.0 + amplitude * (i as f64 * 1.1).sin()
        })
        .collect();

    let result = engine.analyze(&bars_from_closes(&closes, 60_000)).unwrap();
    let bb = result.indicators.bollinger.unwrap();
    assert!(
        bb.squeeze.is_squeezing,
        "expected a squeeze, bandwidth percentile {}",
        bb.squeeze.bandwidth_percentile
    );
    assert!(bb.squeeze.bandwidth_percentile < 50.0);
}

// ---- Result surface --------------------------------------------------------

#[test]
fn result_serializes_with_stable_field_names() {
    let engine = BreakoutEngine::default();
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.35).sin() * 6.0).collect();
    let result = engine.analyze(&bars_from_closes(&closes, 80_000)).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    let signal = &json["signal"];
    for key in ["direction", "probability", "confidence", "timeframe", "signals"] {
        assert!(!signal[key].is_null(), "signal.{key} missing");
    }

    let stops = &json["stops"];
    for key in ["entry", "candidates", "recommended_tier", "recommended", "position"] {
        assert!(stops.get(key).is_some(), "stops.{key} missing");
    }
    let first_candidate = &stops["candidates"][0];
    for key in ["price", "distance", "percentage", "source"] {
        assert!(first_candidate.get(key).is_some(), "candidate.{key} missing");
    }

    // Round-trips through serde.
    let back: vela_breakout::AnalysisResult = serde_json::from_value(json).unwrap();
    assert_eq!(back.bars_analyzed, result.bars_analyzed);
    assert_eq!(back.signal.direction, result.signal.direction);
}

// ---- Caller slice is never mutated -----------------------------------------

#[test]
fn analyze_leaves_input_untouched() {
    let engine = BreakoutEngine::default();
    let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.5).cos() * 3.0).collect();
    let bars = bars_from_closes(&closes, 70_000);
    let copy = bars.clone();
    let _ = engine.analyze(&bars).unwrap();
    assert_eq!(bars, copy);
}
