// =============================================================================
// Relative Strength Index (RSI)
// =============================================================================
//
// RSI compares the average gain to the average loss over the most recent
// `period` close-to-close changes:
//
//   RS  = avg_gain / avg_loss
//   RSI = 100 - 100 / (1 + RS)
//
// This is the single-window form: plain averages over the latest window, no
// exponential carry-over from older bars.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.

use serde::{Deserialize, Serialize};

use crate::types::{OscillatorSignal, TrendDirection};

/// RSI value plus its qualitative reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiResult {
    pub value: f64,
    pub signal: OscillatorSignal,
    pub trend: TrendDirection,
}

/// Compute RSI over the most recent `period` deltas of a chronological
/// close series.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` closes => `None`
/// - Average loss of zero => RSI is exactly 100 (all changes in the window
///   were non-negative; the division is never performed).
pub fn rsi(closes: &[f64], period: usize) -> Option<RsiResult> {
    if period == 0 || closes.len() < period + 1 {
        return None;
    }

    let window = &closes[closes.len() - period - 1..];
    let (sum_gain, sum_loss) = window.windows(2).fold((0.0_f64, 0.0_f64), |(g, l), pair| {
        let delta = pair[1] - pair[0];
        if delta > 0.0 {
            (g + delta, l)
        } else {
            (g, l + delta.abs())
        }
    });

    let avg_gain = sum_gain / period as f64;
    let avg_loss = sum_loss / period as f64;

    let value = if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    if !value.is_finite() {
        return None;
    }

    let signal = if value >= 70.0 {
        OscillatorSignal::Overbought
    } else if value <= 30.0 {
        OscillatorSignal::Oversold
    } else {
        OscillatorSignal::Neutral
    };

    let trend = if value > 50.0 {
        TrendDirection::Bullish
    } else if value < 50.0 {
        TrendDirection::Bearish
    } else {
        TrendDirection::Neutral
    };

    Some(RsiResult {
        value,
        signal,
        trend,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_empty_input() {
        assert!(rsi(&[], 14).is_none());
    }

    #[test]
    fn rsi_period_zero() {
        assert!(rsi(&[1.0, 2.0, 3.0], 0).is_none());
    }

    #[test]
    fn rsi_insufficient_data() {
        // Need period + 1 closes; 14 closes only give 13 deltas.
        let closes: Vec<f64> = (1..=14).map(|x| x as f64).collect();
        assert!(rsi(&closes, 14).is_none());
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let result = rsi(&closes, 14).unwrap();
        assert!((result.value - 100.0).abs() < 1e-10);
        assert_eq!(result.signal, OscillatorSignal::Overbought);
        assert_eq!(result.trend, TrendDirection::Bullish);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (1..=30).rev().map(|x| x as f64).collect();
        let result = rsi(&closes, 14).unwrap();
        assert!(result.value.abs() < 1e-10);
        assert_eq!(result.signal, OscillatorSignal::Oversold);
        assert_eq!(result.trend, TrendDirection::Bearish);
    }

    #[test]
    fn rsi_flat_window_is_100() {
        // All deltas zero: every change is non-negative, so the zero-loss
        // sentinel applies.
        let closes = vec![100.0; 30];
        assert!((rsi(&closes, 14).unwrap().value - 100.0).abs() < 1e-10);
    }

    #[test]
    fn rsi_balanced_moves_near_50() {
        // Alternating +1/-1 deltas: equal gains and losses.
        let mut closes = vec![100.0];
        for i in 0..20 {
            let last = *closes.last().unwrap();
            closes.push(if i % 2 == 0 { last + 1.0 } else { last - 1.0 });
        }
        let result = rsi(&closes, 14).unwrap();
        assert!((result.value - 50.0).abs() < 1e-10);
        assert_eq!(result.signal, OscillatorSignal::Neutral);
    }

    #[test]
    fn rsi_range_bound() {
        let closes = vec![
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            44.18, 44.22, 44.57, 43.42, 42.66, 43.13,
        ];
        let result = rsi(&closes, 14).unwrap();
        assert!((0.0..=100.0).contains(&result.value));
    }

    #[test]
    fn rsi_uses_only_latest_window() {
        // A crash far in the past must not affect a recent all-gain window.
        let mut closes = vec![200.0, 100.0, 50.0];
        let mut price = 50.0;
        for _ in 0..15 {
            price += 1.0;
            closes.push(price);
        }
        assert!((rsi(&closes, 14).unwrap().value - 100.0).abs() < 1e-10);
    }
}
