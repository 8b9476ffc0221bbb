// =============================================================================
// Bollinger Bands with Squeeze Detection
// =============================================================================
//
// Bands around a 20-period SMA at +/- 2 population standard deviations:
//
//   middle    = SMA(close, period)
//   upper     = middle + mult * sigma
//   lower     = middle - mult * sigma
//   bandwidth = (upper - lower) / middle * 100
//
// Squeeze: current bandwidth below half of its trailing-20 average. The
// percentile (current / average * 100) grades intensity: < 20 STRONG,
// < 40 MODERATE.
//
// Volatility state compares the current bandwidth against its trailing
// 50-window average: > 1.5x HIGH, < 0.5x LOW, else NORMAL.

use serde::{Deserialize, Serialize};

use crate::config::IndicatorConfig;
use crate::stats::{sma, std_dev};
use crate::types::{SqueezeIntensity, VolatilityState};

/// Squeeze read for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SqueezeInfo {
    pub is_squeezing: bool,
    pub intensity: SqueezeIntensity,
    /// Current bandwidth as a percent of its trailing average.
    pub bandwidth_percentile: f64,
}

/// Bollinger band values for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerResult {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub bandwidth: f64,
    pub squeeze: SqueezeInfo,
    pub volatility: VolatilityState,
}

/// Minimum number of trailing bandwidth samples before the volatility state
/// is classified; with less history the state stays NORMAL.
const MIN_VOLATILITY_SAMPLES: usize = 5;

/// Compute Bollinger Bands plus squeeze and volatility reads over a
/// chronological close series.
///
/// Returns `None` when there are fewer than `period` closes or the window
/// mean is degenerate.
pub fn bollinger(closes: &[f64], cfg: &IndicatorConfig) -> Option<BollingerResult> {
    let period = cfg.bollinger_period;
    if period == 0 || closes.len() < period {
        return None;
    }

    let history = bandwidth_history(closes, period, cfg.bollinger_std_mult);
    let &current_bandwidth = history.last()?;

    let window = &closes[closes.len() - period..];
    let middle = sma(closes, period)?;
    if middle <= 0.0 {
        return None;
    }
    let sigma = std_dev(window, middle);
    let upper = middle + cfg.bollinger_std_mult * sigma;
    let lower = middle - cfg.bollinger_std_mult * sigma;

    let squeeze = squeeze_info(&history, cfg.squeeze_baseline);
    let volatility = volatility_state(&history, cfg.volatility_baseline);

    Some(BollingerResult {
        upper,
        middle,
        lower,
        bandwidth: current_bandwidth,
        squeeze,
        volatility,
    })
}

/// Bandwidth of every `period`-sized window, oldest window first. The last
/// entry is the current bandwidth.
fn bandwidth_history(closes: &[f64], period: usize, mult: f64) -> Vec<f64> {
    closes
        .windows(period)
        .map(|window| {
            let mean = window.iter().sum::<f64>() / period as f64;
            if mean <= 0.0 {
                return 0.0;
            }
            let sigma = std_dev(window, mean);
            2.0 * mult * sigma / mean * 100.0
        })
        .collect()
}

/// Compare the current bandwidth against the trailing-average baseline.
fn squeeze_info(history: &[f64], baseline: usize) -> SqueezeInfo {
    let current = *history.last().unwrap_or(&0.0);
    let window = &history[history.len().saturating_sub(baseline)..];
    let average = window.iter().sum::<f64>() / window.len().max(1) as f64;

    if average <= f64::EPSILON {
        // Flat history: nothing to squeeze against.
        return SqueezeInfo {
            is_squeezing: false,
            intensity: SqueezeIntensity::None,
            bandwidth_percentile: 100.0,
        };
    }

    let percentile = current / average * 100.0;
    let intensity = if percentile < 20.0 {
        SqueezeIntensity::Strong
    } else if percentile < 40.0 {
        SqueezeIntensity::Moderate
    } else {
        SqueezeIntensity::None
    };

    SqueezeInfo {
        is_squeezing: current < 0.5 * average,
        intensity,
        bandwidth_percentile: percentile,
    }
}

/// Classify the current bandwidth against its long trailing average.
fn volatility_state(history: &[f64], baseline: usize) -> VolatilityState {
    let current = *history.last().unwrap_or(&0.0);
    let window = &history[history.len().saturating_sub(baseline)..];
    if window.len() < MIN_VOLATILITY_SAMPLES {
        return VolatilityState::Normal;
    }
    let average = window.iter().sum::<f64>() / window.len() as f64;
    if average <= f64::EPSILON {
        return VolatilityState::Normal;
    }
    if current > 1.5 * average {
        VolatilityState::High
    } else if current < 0.5 * average {
        VolatilityState::Low
    } else {
        VolatilityState::Normal
    }
}
