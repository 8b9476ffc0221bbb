// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running total that adds the bar's volume on an up-close, subtracts it on a
// down-close, and carries through unchanged on a flat close. Momentum is the
// percent change of the running total against its value `lookback` bars
// back, giving a short read on whether volume is flowing in or out.

use serde::{Deserialize, Serialize};

use crate::series::PriceBar;
use crate::types::TrendDirection;

/// OBV running total plus its short-horizon momentum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObvResult {
    pub value: f64,
    /// Percent change against the value `lookback` bars back.
    pub momentum_pct: f64,
    pub trend: TrendDirection,
}

/// Compute OBV over chronological bars.
///
/// Returns `None` when there are fewer than `lookback + 1` bars. A zero
/// reference value (OBV flat at zero `lookback` bars ago) yields momentum 0.
pub fn obv(bars: &[PriceBar], lookback: usize) -> Option<ObvResult> {
    if bars.len() < lookback + 1 {
        return None;
    }

    let mut series = Vec::with_capacity(bars.len());
    let mut total = 0.0_f64;
    series.push(total);

    for pair in bars.windows(2) {
        let volume = pair[1].volume as f64;
        if pair[1].close > pair[0].close {
            total += volume;
        } else if pair[1].close < pair[0].close {
            total -= volume;
        }
        series.push(total);
    }

    let current = *series.last()?;
    let reference = series[series.len() - 1 - lookback];
    let momentum_pct = if reference.abs() > f64::EPSILON {
        (current - reference) / reference.abs() * 100.0
    } else {
        0.0
    };

    let trend = if momentum_pct > 0.0 {
        TrendDirection::Bullish
    } else if momentum_pct < 0.0 {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };

    Some(ObvResult {
        value: current,
        momentum_pct,
        trend,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
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

    #[test]
    fn obv_insufficient_data() {
        let bars: Vec<PriceBar> = (0..5).map(|i| bar(i, 100.0, 1_000)).collect();
        assert!(obv(&bars, 5).is_none());
    }

    #[test]
    fn obv_accumulates_up_closes() {
        let bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 100.0 + i as f64, 1_000)).collect();
        let result = obv(&bars, 5).unwrap();
        // Nine up-closes of 1,000 each.
        assert_eq!(result.value, 9_000.0);
        assert!(result.momentum_pct > 0.0);
        assert_eq!(result.trend, TrendDirection::Bullish);
    }

    #[test]
    fn obv_subtracts_down_closes() {
        let bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 200.0 - i as f64, 1_000)).collect();
        let result = obv(&bars, 5).unwrap();
        assert_eq!(result.value, -9_000.0);
        assert_eq!(result.trend, TrendDirection::Bearish);
    }

    #[test]
    fn obv_flat_closes_are_neutral() {
        let bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 100.0, 1_000)).collect();
        let result = obv(&bars, 5).unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.momentum_pct, 0.0);
        assert_eq!(result.trend, TrendDirection::Neutral);
    }

    #[test]
    fn obv_momentum_measures_five_bars() {
        // Flat for a while, then five up-closes: the reference sits right
        // before the run starts.
        let mut bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 100.0, 1_000)).collect();
        // One up-close to move OBV off zero, establishing a reference.
        bars.push(bar(10, 101.0, 2_000));
        for i in 0..5 {
            bars.push(bar(11 + i, 102.0 + i as f64, 1_000));
        }
        let result = obv(&bars, 5).unwrap();
        // Reference = 2,000 (after the first up-close), current = 7,000.
        assert_eq!(result.value, 7_000.0);
        assert!((result.momentum_pct - 250.0).abs() < 1e-9);
    }
}
