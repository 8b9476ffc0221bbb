// =============================================================================
// Flag and Pennant Detection
// =============================================================================
//
// Both formations split the window into a pole (the oldest bars, a sharp
// directional move) and a resting phase:
//
//   bull/bear flag — pole + tight sideways consolidation
//   pennant        — pole + converging high/low trendlines
//
// Confidence is a fixed-weight blend of pole strength, resting-phase
// quality, and volume contraction (volume drying up while the formation
// builds is the classic confirmation).

use crate::config::PatternConfig;
use crate::patterns::heuristics::{consolidation, convergence, trend_segment};
use crate::patterns::{PatternKind, PatternMatch};
use crate::series::PriceBar;
use crate::types::TrendDirection;

// Confidence weight tables.
const FLAG_WEIGHT_TREND: f64 = 0.45;
const FLAG_WEIGHT_CONSOLIDATION: f64 = 0.35;
const FLAG_WEIGHT_VOLUME: f64 = 0.20;

const PENNANT_WEIGHT_TREND: f64 = 0.40;
const PENNANT_WEIGHT_CONVERGENCE: f64 = 0.40;
const PENNANT_WEIGHT_VOLUME: f64 = 0.20;

/// Volume score when the resting phase does not contract.
const VOLUME_MISS_SCORE: f64 = 0.3;

/// Detect a bull flag: upward pole followed by consolidation.
pub fn detect_bull_flag(window: &[PriceBar], cfg: &PatternConfig) -> PatternMatch {
    detect_flag(window, cfg, TrendDirection::Bullish, PatternKind::BullFlag)
}

/// Detect a bear flag: downward pole followed by consolidation.
pub fn detect_bear_flag(window: &[PriceBar], cfg: &PatternConfig) -> PatternMatch {
    detect_flag(window, cfg, TrendDirection::Bearish, PatternKind::BearFlag)
}

fn detect_flag(
    window: &[PriceBar],
    cfg: &PatternConfig,
    direction: TrendDirection,
    kind: PatternKind,
) -> PatternMatch {
    let Some((pole, rest)) = split_pole(window, cfg) else {
        return PatternMatch::missed(kind);
    };

    let pole_closes: Vec<f64> = pole.iter().map(|b| b.close).collect();
    let rest_closes: Vec<f64> = rest.iter().map(|b| b.close).collect();

    let trend = trend_segment(&pole_closes, direction, cfg.trend_strength_min);
    if !trend.valid {
        return PatternMatch::missed(kind);
    }

    let cons = consolidation(&rest_closes, cfg.price_deviation);
    if !cons.valid {
        return PatternMatch::missed(kind);
    }

    let confidence = 100.0
        * (FLAG_WEIGHT_TREND * trend.strength
            + FLAG_WEIGHT_CONSOLIDATION * cons.quality
            + FLAG_WEIGHT_VOLUME * volume_score(pole, rest));

    PatternMatch {
        kind,
        detected: true,
        confidence: confidence.clamp(0.0, 100.0),
        start_index: 0,
        end_index: window.len() - 1,
        direction,
        triangle: None,
        neckline: None,
        apex_bars: None,
    }
}

/// Detect a pennant: pole in either direction followed by converging
/// trendlines. The pennant leans the way its pole pointed.
pub fn detect_pennant(window: &[PriceBar], cfg: &PatternConfig) -> PatternMatch {
    let Some((pole, rest)) = split_pole(window, cfg) else {
        return PatternMatch::missed(PatternKind::Pennant);
    };

    let pole_closes: Vec<f64> = pole.iter().map(|b| b.close).collect();

    let (trend, direction) = {
        let up = trend_segment(&pole_closes, TrendDirection::Bullish, cfg.trend_strength_min);
        if up.valid {
            (up, TrendDirection::Bullish)
        } else {
            let down =
                trend_segment(&pole_closes, TrendDirection::Bearish, cfg.trend_strength_min);
            if down.valid {
                (down, TrendDirection::Bearish)
            } else {
                return PatternMatch::missed(PatternKind::Pennant);
            }
        }
    };

    let highs: Vec<f64> = rest.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = rest.iter().map(|b| b.low).collect();
    let conv = convergence(&highs, &lows);
    if !conv.converging {
        return PatternMatch::missed(PatternKind::Pennant);
    }

    let confidence = 100.0
        * (PENNANT_WEIGHT_TREND * trend.strength
            + PENNANT_WEIGHT_CONVERGENCE * conv.quality
            + PENNANT_WEIGHT_VOLUME * volume_score(pole, rest));

    PatternMatch {
        kind: PatternKind::Pennant,
        detected: true,
        confidence: confidence.clamp(0.0, 100.0),
        start_index: 0,
        end_index: window.len() - 1,
        direction,
        triangle: None,
        neckline: None,
        apex_bars: conv.apex_bars,
    }
}

/// Split the window into pole (oldest `pole_fraction`) and resting phase.
///
/// `None` when either side would be too thin to fit.
fn split_pole<'a>(
    window: &'a [PriceBar],
    cfg: &PatternConfig,
) -> Option<(&'a [PriceBar], &'a [PriceBar])> {
    let pole_len = ((window.len() as f64 * cfg.pole_fraction) as usize).max(2);
    if window.len() < pole_len + 3 {
        return None;
    }
    Some((&window[..pole_len], &window[pole_len..]))
}

/// 1.0 when volume contracts from pole to resting phase, a reduced score
/// otherwise.
fn volume_score(pole: &[PriceBar], rest: &[PriceBar]) -> f64 {
    let pole_avg = pole.iter().map(|b| b.volume as f64).sum::<f64>() / pole.len() as f64;
    let rest_avg = rest.iter().map(|b| b.volume as f64).sum::<f64>() / rest.len() as f64;
    if rest_avg < pole_avg {
        1.0
    } else {
        VOLUME_MISS_SCORE
    }
}
