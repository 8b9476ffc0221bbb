// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD line  = EMA_fast(close) - EMA_slow(close)
//   Signal     = EMA_signal(MACD line)
//   Histogram  = MACD line - Signal
//
// Trend is BULLISH iff the histogram is positive, BEARISH otherwise.
// Defaults: fast 12, slow 26, signal 9.

use serde::{Deserialize, Serialize};

use crate::stats::ema_series;
use crate::types::TrendDirection;

/// Most recent MACD line / signal / histogram values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub trend: TrendDirection,
}

/// Compute MACD over a chronological close series.
///
/// Needs at least `slow + signal_period - 1` closes so the signal EMA has a
/// full seed window. Returns `None` otherwise, or when the periods are
/// degenerate (`fast >= slow`, any zero).
pub fn macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> Option<MacdResult> {
    if fast == 0 || slow == 0 || signal_period == 0 || fast >= slow {
        return None;
    }
    if closes.len() < slow + signal_period - 1 {
        return None;
    }

    let fast_series = ema_series(closes, fast);
    let slow_series = ema_series(closes, slow);
    if fast_series.is_empty() || slow_series.is_empty() {
        return None;
    }

    // Both EMA series end at the newest close; align them from the tail so
    // each MACD point subtracts EMAs of the same bar.
    let aligned = slow_series.len().min(fast_series.len());
    let fast_tail = &fast_series[fast_series.len() - aligned..];
    let slow_tail = &slow_series[slow_series.len() - aligned..];

    let macd_line: Vec<f64> = fast_tail
        .iter()
        .zip(slow_tail.iter())
        .map(|(f, s)| f - s)
        .collect();

    let signal_series = ema_series(&macd_line, signal_period);
    let signal = *signal_series.last()?;
    let macd_value = *macd_line.last()?;
    let histogram = macd_value - signal;

    if !macd_value.is_finite() || !signal.is_finite() {
        return None;
    }

    let trend = if histogram > 0.0 {
        TrendDirection::Bullish
    } else {
        TrendDirection::Bearish
    };

    Some(MacdResult {
        macd: macd_value,
        signal,
        histogram,
        trend,
    })
}
