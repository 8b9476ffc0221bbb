// =============================================================================
// Breakout Analyzer — the engine's single entry point
// =============================================================================
//
// `BreakoutEngine::analyze` takes the caller's newest-first bars and runs
// the full pipeline:
//
//   validate -> indicator snapshot -> pattern scan -> fusion -> stop plan
//
// Every analysis is computed fresh from the input; the engine itself holds
// nothing but its immutable configuration, so one engine can serve any
// number of threads and symbols concurrently.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::breakout::{fuse, BreakoutSignal};
use crate::config::EngineConfig;
use crate::error::AnalysisError;
use crate::indicators::{compute_snapshot, IndicatorSnapshot};
use crate::patterns::{detect_patterns, PatternScan};
use crate::series::{PriceBar, Series};
use crate::stops::{self, StopPlan};
use crate::types::TrendDirection;

/// Everything one analysis produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub bars_analyzed: usize,
    pub first_date: chrono::NaiveDate,
    pub last_date: chrono::NaiveDate,
    pub last_close: f64,
    pub indicators: IndicatorSnapshot,
    pub patterns: PatternScan,
    pub signal: BreakoutSignal,
    pub stops: StopPlan,
}

/// The stateless analysis engine: configuration in, results out.
#[derive(Debug, Clone, Default)]
pub struct BreakoutEngine {
    config: EngineConfig,
}

impl BreakoutEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyze a newest-first series of daily bars.
    ///
    /// # Errors
    /// - [`AnalysisError::InsufficientData`] with fewer than
    ///   `config.min_bars` bars.
    /// - [`AnalysisError::InvalidBar`] when a bar violates the OHLC
    ///   invariants or the dates are out of order.
    pub fn analyze(&self, bars: &[PriceBar]) -> Result<AnalysisResult, AnalysisError> {
        if bars.len() < self.config.min_bars {
            return Err(AnalysisError::InsufficientData {
                required: self.config.min_bars,
                actual: bars.len(),
            });
        }

        let series = Series::from_newest_first(bars)?;

        let snapshot = compute_snapshot(&series, &self.config.indicators);
        let patterns = detect_patterns(&series, &self.config.patterns);

        let last_close = series.latest().close;
        let prev_close = series.bars()[series.len() - 2].close;
        let signal = fuse(&snapshot, &patterns, last_close, prev_close, &self.config.fusion);

        let ma_trend = snapshot
            .moving_averages
            .as_ref()
            .map(|ma| ma.trend)
            .unwrap_or(TrendDirection::Neutral);
        let stops = stops::plan(
            &series,
            snapshot.atr.as_ref(),
            snapshot.fibonacci.as_ref(),
            patterns.dominant.as_ref(),
            signal.direction,
            ma_trend,
            signal.confidence,
            &self.config.stops,
            &self.config.sizing,
        );

        debug!(
            bars = series.len(),
            %signal.direction,
            probability = signal.probability,
            "analysis complete"
        );

        Ok(AnalysisResult {
            bars_analyzed: series.len(),
            first_date: series.bars()[0].date,
            last_date: series.latest().date,
            last_close,
            indicators: snapshot,
            patterns,
            signal,
            stops,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::{Duration, NaiveDate};

    fn bar(offset: i64, close: f64, volume: u64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume,
        }
    }

    /// Chronological closes -> newest-first bars.
    fn newest_first(closes: &[f64]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| bar(i as i64, c, 100_000))
            .rev()
            .collect()
    }

    #[test]
    fn ten_bars_is_insufficient() {
        let engine = BreakoutEngine::default();
        let bars = newest_first(&vec![100.0; 10]);
        let err = engine.analyze(&bars).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                required: 50,
                actual: 10
            }
        );
    }

    #[test]
    fn invalid_bar_is_rejected() {
        let engine = BreakoutEngine::default();
        let mut bars = newest_first(&(0..60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        bars[5].low = bars[5].high + 10.0;
        assert!(matches!(
            engine.analyze(&bars),
            Err(AnalysisError::InvalidBar { index: 5, .. })
        ));
    }

    #[test]
    fn sixty_flat_bars_analyze_cleanly() {
        let engine = BreakoutEngine::default();
        let bars: Vec<PriceBar> = (0..60).map(|i| bar(i, 100.0, 100_000)).rev().collect();
        let result = engine.analyze(&bars).unwrap();
        assert_eq!(result.bars_analyzed, 60);
        assert_eq!(result.signal.direction, Direction::Neutral);
    }

    #[test]
    fn result_dates_span_the_series() {
        let engine = BreakoutEngine::default();
        let bars = newest_first(&(0..60).map(|i| 100.0 + (i as f64 * 0.4).sin()).collect::<Vec<_>>());
        let result = engine.analyze(&bars).unwrap();
        assert_eq!(result.first_date, bars.last().unwrap().date);
        assert_eq!(result.last_date, bars[0].date);
        assert!(result.first_date < result.last_date);
    }

    #[test]
    fn engine_is_reusable_and_deterministic() {
        let engine = BreakoutEngine::default();
        let bars = newest_first(&(0..80).map(|i| 100.0 + (i as f64 * 0.3).sin() * 4.0).collect::<Vec<_>>());
        let a = engine.analyze(&bars).unwrap();
        let b = engine.analyze(&bars).unwrap();
        assert_eq!(a.signal, b.signal);
        assert_eq!(a.stops.recommended, b.stops.recommended);
    }
}
