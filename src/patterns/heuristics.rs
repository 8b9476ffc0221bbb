// =============================================================================
// Pattern Sub-Heuristics — trend, consolidation, convergence, pivots
// =============================================================================
//
// The building blocks every chart-formation detector is assembled from.
// Each returns a small struct with a `valid` flag plus the raw scores the
// detectors blend into a confidence; none of them can fail — degenerate
// input simply comes back invalid.

use crate::stats::{linear_regression, Regression};
use crate::types::TrendDirection;

/// A fitted directional move (the "pole" of a flag or pennant).
#[derive(Debug, Clone, Copy)]
pub struct TrendSegment {
    pub fit: Regression,
    /// Fraction of bar-over-bar returns whose sign matches the expected
    /// direction.
    pub strength: f64,
    pub valid: bool,
}

/// Fit a trend segment and test it against the expected direction.
///
/// Valid when the regression slope points the expected way and more than
/// `strength_min` of the returns agree with it.
pub fn trend_segment(closes: &[f64], expected: TrendDirection, strength_min: f64) -> TrendSegment {
    if closes.len() < 2 || expected == TrendDirection::Neutral {
        return TrendSegment {
            fit: linear_regression(closes),
            strength: 0.0,
            valid: false,
        };
    }

    let fit = linear_regression(closes);
    let matches = closes
        .windows(2)
        .filter(|pair| {
            let delta = pair[1] - pair[0];
            match expected {
                TrendDirection::Bullish => delta > 0.0,
                TrendDirection::Bearish => delta < 0.0,
                TrendDirection::Neutral => false,
            }
        })
        .count();
    let strength = matches as f64 / (closes.len() - 1) as f64;

    let slope_ok = match expected {
        TrendDirection::Bullish => fit.slope > 0.0,
        TrendDirection::Bearish => fit.slope < 0.0,
        TrendDirection::Neutral => false,
    };

    TrendSegment {
        fit,
        strength,
        valid: slope_ok && strength > strength_min,
    }
}

/// A sideways range tight enough to count as consolidation.
#[derive(Debug, Clone, Copy)]
pub struct Consolidation {
    /// (max - min) / min over the segment.
    pub range_fraction: f64,
    /// 1 at zero range, 0 at the deviation limit.
    pub quality: f64,
    pub valid: bool,
}

/// Test a segment for consolidation within `max_deviation`.
pub fn consolidation(closes: &[f64], max_deviation: f64) -> Consolidation {
    if closes.is_empty() || max_deviation <= 0.0 {
        return Consolidation {
            range_fraction: f64::INFINITY,
            quality: 0.0,
            valid: false,
        };
    }

    let max = closes.iter().fold(f64::MIN, |a, &b| a.max(b));
    let min = closes.iter().fold(f64::MAX, |a, &b| a.min(b));
    if min <= 0.0 {
        return Consolidation {
            range_fraction: f64::INFINITY,
            quality: 0.0,
            valid: false,
        };
    }

    let range_fraction = (max - min) / min;
    let valid = range_fraction <= max_deviation;
    let quality = if valid {
        (1.0 - range_fraction / max_deviation).clamp(0.0, 1.0)
    } else {
        0.0
    };

    Consolidation {
        range_fraction,
        quality,
        valid,
    }
}

/// Separate trendline fits over the highs and the lows of a segment.
#[derive(Debug, Clone, Copy)]
pub struct Convergence {
    pub high_fit: Regression,
    pub low_fit: Regression,
    /// True when the high line falls while the low line rises.
    pub converging: bool,
    /// Mean R² of the two fits.
    pub quality: f64,
    /// Bars past the end of the segment where the two lines meet.
    pub apex_bars: Option<f64>,
}

/// Fit the upper and lower trendlines of a segment.
pub fn convergence(highs: &[f64], lows: &[f64]) -> Convergence {
    let high_fit = linear_regression(highs);
    let low_fit = linear_regression(lows);
    let converging = high_fit.slope < 0.0 && low_fit.slope > 0.0;
    let quality = (high_fit.r_squared + low_fit.r_squared) / 2.0;

    let n = highs.len().min(lows.len());
    let apex_bars = if (high_fit.slope - low_fit.slope).abs() > f64::EPSILON && n > 0 {
        let x = (low_fit.intercept - high_fit.intercept) / (high_fit.slope - low_fit.slope);
        let beyond = x - (n as f64 - 1.0);
        if beyond.is_finite() {
            Some(beyond)
        } else {
            None
        }
    } else {
        None
    };

    Convergence {
        high_fit,
        low_fit,
        converging,
        quality,
        apex_bars,
    }
}

/// Indices of strict local maxima (`v[i-1] < v[i] > v[i+1]`).
pub fn local_peaks(values: &[f64]) -> Vec<usize> {
    (1..values.len().saturating_sub(1))
        .filter(|&i| values[i] > values[i - 1] && values[i] > values[i + 1])
        .collect()
}

/// Indices of strict local minima.
pub fn local_troughs(values: &[f64]) -> Vec<usize> {
    (1..values.len().saturating_sub(1))
        .filter(|&i| values[i] < values[i - 1] && values[i] < values[i + 1])
        .collect()
}
