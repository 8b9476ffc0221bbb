// =============================================================================
// Triangle Detection
// =============================================================================
//
// Fits separate trendlines to the window's highs and lows and classifies
// the formation by slope signs (slopes are normalised by the mean price so
// "flat" means the same thing at $5 and $500):
//
//   falling top + rising bottom  => symmetric
//   flat top    + rising bottom  => ascending
//   falling top + flat bottom    => descending
//   rising top  + falling bottom => expanding
//
// Confidence blends fit quality (mean R² of the two lines) with the range
// contraction between the older and newer halves of the window (expansion
// for the expanding variant).

use crate::config::PatternConfig;
use crate::patterns::heuristics::convergence;
use crate::patterns::{PatternKind, PatternMatch, TriangleKind};
use crate::series::PriceBar;
use crate::types::TrendDirection;

const WEIGHT_FIT: f64 = 0.6;
const WEIGHT_CONTRACTION: f64 = 0.4;

/// Detect a triangle over the whole window.
pub fn detect_triangle(window: &[PriceBar], cfg: &PatternConfig) -> PatternMatch {
    if window.len() < cfg.min_bars {
        return PatternMatch::missed(PatternKind::Triangle);
    }

    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    let conv = convergence(&highs, &lows);

    let mean_price =
        window.iter().map(|b| b.close).sum::<f64>() / window.len() as f64;
    if mean_price <= 0.0 {
        return PatternMatch::missed(PatternKind::Triangle);
    }

    let top = slope_class(conv.high_fit.slope, mean_price, cfg.flat_slope_epsilon);
    let bottom = slope_class(conv.low_fit.slope, mean_price, cfg.flat_slope_epsilon);

    let kind = match (top, bottom) {
        (SlopeClass::Falling, SlopeClass::Rising) => TriangleKind::Symmetric,
        (SlopeClass::Flat, SlopeClass::Rising) => TriangleKind::Ascending,
        (SlopeClass::Falling, SlopeClass::Flat) => TriangleKind::Descending,
        (SlopeClass::Rising, SlopeClass::Falling) => TriangleKind::Expanding,
        _ => return PatternMatch::missed(PatternKind::Triangle),
    };

    let shape = match kind {
        TriangleKind::Expanding => expansion(&highs, &lows),
        _ => contraction(&highs, &lows),
    };

    let confidence = 100.0 * (WEIGHT_FIT * conv.quality + WEIGHT_CONTRACTION * shape);

    let direction = match kind {
        TriangleKind::Ascending => TrendDirection::Bullish,
        TriangleKind::Descending => TrendDirection::Bearish,
        TriangleKind::Symmetric | TriangleKind::Expanding => TrendDirection::Neutral,
    };

    PatternMatch {
        kind: PatternKind::Triangle,
        detected: true,
        confidence: confidence.clamp(0.0, 100.0),
        start_index: 0,
        end_index: window.len() - 1,
        direction,
        triangle: Some(kind),
        neckline: None,
        apex_bars: conv.apex_bars,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SlopeClass {
    Rising,
    Falling,
    Flat,
}

fn slope_class(slope: f64, mean_price: f64, flat_epsilon: f64) -> SlopeClass {
    let normalised = slope / mean_price;
    if normalised > flat_epsilon {
        SlopeClass::Rising
    } else if normalised < -flat_epsilon {
        SlopeClass::Falling
    } else {
        SlopeClass::Flat
    }
}

/// How much the high-low envelope narrowed from the older half to the newer
/// half, 0..1.
fn contraction(highs: &[f64], lows: &[f64]) -> f64 {
    let (older, newer) = half_ranges(highs, lows);
    if older <= f64::EPSILON {
        return 0.0;
    }
    (1.0 - newer / older).clamp(0.0, 1.0)
}

/// The mirror measure for expanding formations.
fn expansion(highs: &[f64], lows: &[f64]) -> f64 {
    let (older, newer) = half_ranges(highs, lows);
    if newer <= f64::EPSILON {
        return 0.0;
    }
    (1.0 - older / newer).clamp(0.0, 1.0)
}

fn half_ranges(highs: &[f64], lows: &[f64]) -> (f64, f64) {
    let mid = highs.len() / 2;
    let range = |h: &[f64], l: &[f64]| {
        let max = h.iter().fold(f64::MIN, |a, &b| a.max(b));
        let min = l.iter().fold(f64::MAX, |a, &b| a.min(b));
        max - min
    };
    (
        range(&highs[..mid], &lows[..mid]),
        range(&highs[mid..], &lows[mid..]),
    )
}
