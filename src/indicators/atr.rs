// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing
// =============================================================================
//
// True Range for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is Wilder's smoothed average of TR, seeded with the first TR value:
//   ATR_0 = TR_0
//   ATR_t = (ATR_{t-1} * (period - 1) + TR_t) / period
//
// Risk level from ATR as a percent of the last close:
//   > 3.0 HIGH,  > 1.5 MEDIUM,  else LOW.

use serde::{Deserialize, Serialize};

use crate::series::PriceBar;
use crate::types::RiskLevel;

/// ATR value plus the derived volatility risk read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtrResult {
    pub value: f64,
    /// ATR as a percent of the most recent close.
    pub percent_of_price: f64,
    pub risk: RiskLevel,
}

/// Compute ATR over chronological bars.
///
/// Returns `None` when `period` is zero, there are fewer than `period + 1`
/// bars, or an intermediate value is non-finite.
pub fn atr(bars: &[PriceBar], period: usize) -> Option<AtrResult> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let mut value: Option<f64> = None;
    for pair in bars.windows(2) {
        let high = pair[1].high;
        let low = pair[1].low;
        let prev_close = pair[0].close;

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        value = Some(match value {
            None => tr,
            Some(prev) => (prev * (period as f64 - 1.0) + tr) / period as f64,
        });

        if !value.unwrap_or(f64::NAN).is_finite() {
            return None;
        }
    }

    let value = value?;
    let last_close = bars.last()?.close;
    if last_close <= 0.0 {
        return None;
    }
    let percent_of_price = value / last_close * 100.0;

    let risk = if percent_of_price > 3.0 {
        RiskLevel::High
    } else if percent_of_price > 1.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Some(AtrResult {
        value,
        percent_of_price,
        risk,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar(offset: i64, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset),
            open,
            high,
            low,
            close,
            volume: 100_000,
        }
    }

    #[test]
    fn atr_period_zero() {
        let bars: Vec<PriceBar> = (0..20).map(|i| bar(i, 100.0, 105.0, 95.0, 102.0)).collect();
        assert!(atr(&bars, 0).is_none());
    }

    #[test]
    fn atr_insufficient_data() {
        let bars: Vec<PriceBar> = (0..10).map(|i| bar(i, 100.0, 105.0, 95.0, 102.0)).collect();
        assert!(atr(&bars, 14).is_none());
    }

    #[test]
    fn atr_constant_range_converges() {
        // Every bar spans exactly 10 and closes mid-range: TR is always 10,
        // so the smoothed value stays 10.
        let bars: Vec<PriceBar> = (0..40)
            .map(|i| {
                let base = 100.0;
                bar(i, base, base + 5.0, base - 5.0, base)
            })
            .collect();
        let result = atr(&bars, 14).unwrap();
        assert!((result.value - 10.0).abs() < 1e-9);
        assert_eq!(result.risk, RiskLevel::High);
    }

    #[test]
    fn atr_gap_uses_prev_close() {
        // Gap up: |high - prevClose| dominates the bar's own range.
        let bars = vec![
            bar(0, 100.0, 105.0, 95.0, 95.0),
            bar(1, 110.0, 115.0, 108.0, 112.0),
            bar(2, 112.0, 118.0, 110.0, 115.0),
            bar(3, 115.0, 120.0, 113.0, 118.0),
        ];
        let result = atr(&bars, 3).unwrap();
        // First TR = |115 - 95| = 20, still dominating after two smoothing steps.
        assert!(result.value > 7.0, "ATR should reflect the gap, got {}", result.value);
    }

    #[test]
    fn atr_flat_series_is_zero_low_risk() {
        let bars: Vec<PriceBar> = (0..30).map(|i| bar(i, 100.0, 100.0, 100.0, 100.0)).collect();
        let result = atr(&bars, 14).unwrap();
        assert_eq!(result.value, 0.0);
        assert_eq!(result.percent_of_price, 0.0);
        assert_eq!(result.risk, RiskLevel::Low);
    }

    #[test]
    fn atr_seed_is_first_true_range() {
        // With exactly period + 1 bars the recurrence runs period times
        // starting from the first TR.
        let bars = vec![
            bar(0, 100.0, 102.0, 98.0, 101.0),
            bar(1, 101.0, 104.0, 100.0, 103.0),
            bar(2, 103.0, 106.0, 102.0, 105.0),
        ];
        // TR_1 = max(4, 3, 1) = 4 (seed), TR_2 = max(4, 3, 1) = 4 wrt close 103:
        //   high-low = 4, |106-103| = 3, |102-103| = 1.
        // ATR = (4 * 1 + 4) / 2 = 4.
        let result = atr(&bars, 2).unwrap();
        assert!((result.value - 4.0).abs() < 1e-12);
    }

    #[test]
    fn atr_risk_tiers() {
        // Narrow ranges on a high price: low percent risk.
        let calm: Vec<PriceBar> = (0..30)
            .map(|i| bar(i, 1000.0, 1001.0, 999.0, 1000.0))
            .collect();
        assert_eq!(atr(&calm, 14).unwrap().risk, RiskLevel::Low);

        // Mid-size ranges: medium.
        let mid: Vec<PriceBar> = (0..30)
            .map(|i| bar(i, 100.0, 101.0, 99.0, 100.0))
            .collect();
        assert_eq!(atr(&mid, 14).unwrap().risk, RiskLevel::Medium);
    }
}
