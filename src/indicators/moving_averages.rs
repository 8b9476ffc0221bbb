// =============================================================================
// Moving-Average Trend Stack — EMA20 / SMA50 / SMA200
// =============================================================================
//
// Overall trend:
//   BULLISH iff price > SMA200 and EMA20 > SMA50 > SMA200
//   BEARISH iff price < SMA200 and EMA20 < SMA50 < SMA200
//   else NEUTRAL
//
// Cross detection compares the current bar's relationships against the
// immediately prior bar's: a bullish cross is "was at-or-below, now above".
//
// SMA200 needs more history than the engine's 50-bar minimum guarantees, so
// the long legs are optional; with a short series the trend degrades to the
// price-vs-SMA50 / EMA20-vs-SMA50 comparison.

use serde::{Deserialize, Serialize};

use crate::config::IndicatorConfig;
use crate::stats::{ema, sma};
use crate::types::{CrossEvent, TrendDirection};

/// Trend stack values and cross events for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageResult {
    pub ema20: f64,
    pub sma50: f64,
    pub sma200: Option<f64>,
    pub ema20_sma50_cross: CrossEvent,
    pub ema20_sma200_cross: CrossEvent,
    pub sma50_sma200_cross: CrossEvent,
    pub trend: TrendDirection,
}

/// Compute the trend stack over a chronological close series.
///
/// Returns `None` when there is not enough history for EMA20 and SMA50.
pub fn moving_averages(closes: &[f64], cfg: &IndicatorConfig) -> Option<MovingAverageResult> {
    let price = *closes.last()?;

    let ema20 = ema(closes, cfg.trend_ema)?;
    let sma50 = sma(closes, cfg.trend_sma_mid)?;
    let sma200 = sma(closes, cfg.trend_sma_long);

    // Prior-bar values for cross detection; with the bare minimum of
    // history the previous stack may be unavailable.
    let prev = &closes[..closes.len() - 1];
    let prev_ema20 = ema(prev, cfg.trend_ema);
    let prev_sma50 = sma(prev, cfg.trend_sma_mid);
    let prev_sma200 = sma(prev, cfg.trend_sma_long);

    let ema20_sma50_cross = cross(prev_ema20, prev_sma50, Some(ema20), Some(sma50));
    let ema20_sma200_cross = cross(prev_ema20, prev_sma200, Some(ema20), sma200);
    let sma50_sma200_cross = cross(prev_sma50, prev_sma200, Some(sma50), sma200);

    let trend = match sma200 {
        Some(sma200) => {
            if price > sma200 && ema20 > sma50 && sma50 > sma200 {
                TrendDirection::Bullish
            } else if price < sma200 && ema20 < sma50 && sma50 < sma200 {
                TrendDirection::Bearish
            } else {
                TrendDirection::Neutral
            }
        }
        None => {
            if price > sma50 && ema20 > sma50 {
                TrendDirection::Bullish
            } else if price < sma50 && ema20 < sma50 {
                TrendDirection::Bearish
            } else {
                TrendDirection::Neutral
            }
        }
    };

    Some(MovingAverageResult {
        ema20,
        sma50,
        sma200,
        ema20_sma50_cross,
        ema20_sma200_cross,
        sma50_sma200_cross,
        trend,
    })
}

/// Detect a cross between two averages given their prior and current values.
fn cross(
    prev_a: Option<f64>,
    prev_b: Option<f64>,
    now_a: Option<f64>,
    now_b: Option<f64>,
) -> CrossEvent {
    match (prev_a, prev_b, now_a, now_b) {
        (Some(pa), Some(pb), Some(na), Some(nb)) => {
            if pa <= pb && na > nb {
                CrossEvent::Bullish
            } else if pa >= pb && na < nb {
                CrossEvent::Bearish
            } else {
                CrossEvent::None
            }
        }
        _ => CrossEvent::None,
    }
}
