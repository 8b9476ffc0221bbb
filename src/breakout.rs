// =============================================================================
// Breakout Fusion Engine — weighted vote aggregation
// =============================================================================
//
// A pure function of the indicator snapshot and the pattern scan. Five
// sources each cast a directional vote in [-1, +1]:
//
//   technical  — close vs the Bollinger bands (+1 above upper, -1 below lower)
//   momentum   — MACD histogram sign
//   volume     — tier magnitude (1.0 STRONG / 0.5 MODERATE / 0 WEAK),
//                signed by the latest close-over-close move
//   pattern    — the dominant formation's lean; a symmetric triangle defers
//                to the moving-average trend
//   fibonacci  — nearest level type (+1 support, -1 resistance)
//
// The fixed weight table (0.25 / 0.20 / 0.15 / 0.25 / 0.15) turns the votes
// into a weighted sum; |sum| > 0.2 picks a direction, probability is the
// clamped |sum| x 100, and confidence is probability scaled by the dominant
// pattern's quality. These constants are an inherited empirical scoring
// rule, not calibrated statistics — change them only with new evidence.
//
// A missing or non-finite upstream value never aborts the fusion: the
// source votes neutral and is listed in `degraded`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::FusionConfig;
use crate::indicators::fibonacci::LevelRole;
use crate::indicators::IndicatorSnapshot;
use crate::patterns::{PatternKind, PatternScan, TriangleKind};
use crate::types::{Direction, Timeframe, TrendDirection, VolumeStrength};

/// Qualitative per-source verdicts, reported alongside the fused numbers so
/// a reader can see why the engine leaned the way it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    pub bollinger: Direction,
    pub macd: TrendDirection,
    pub volume: VolumeStrength,
    pub pattern: Option<PatternKind>,
    pub pattern_direction: TrendDirection,
    pub fibonacci: Option<LevelRole>,
    /// Sources that voted neutral because their input was missing or
    /// non-finite.
    pub degraded: Vec<String>,
}

/// The fused breakout signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutSignal {
    pub direction: Direction,
    /// 0-100, derived score (weighted vote sum), not a statistical estimate.
    pub probability: f64,
    /// 0-100, probability scaled by dominant-pattern quality.
    pub confidence: f64,
    pub timeframe: Timeframe,
    /// The raw weighted vote sum in roughly [-1, +1].
    pub weighted_score: f64,
    pub signals: SignalBreakdown,
}

/// Fuse the indicator snapshot and pattern scan into one signal.
///
/// `last_close` and `prev_close` are the two most recent closes, used to
/// sign the volume vote.
pub fn fuse(
    snapshot: &IndicatorSnapshot,
    patterns: &PatternScan,
    last_close: f64,
    prev_close: f64,
    cfg: &FusionConfig,
) -> BreakoutSignal {
    debug_assert!(
        (cfg.weight_sum() - 1.0).abs() < 1e-9,
        "fusion weights must sum to 1.0"
    );

    let mut degraded: Vec<String> = Vec::new();

    // --- Technical: close vs Bollinger bands ------------------------------
    let (bollinger_vote, bollinger_verdict) = match &snapshot.bollinger {
        Some(bb) if bb.upper.is_finite() && bb.lower.is_finite() => {
            if last_close > bb.upper {
                (1.0, Direction::Long)
            } else if last_close < bb.lower {
                (-1.0, Direction::Short)
            } else {
                (0.0, Direction::Neutral)
            }
        }
        _ => {
            degraded.push("bollinger".to_string());
            (0.0, Direction::Neutral)
        }
    };

    // --- Momentum: MACD histogram sign ------------------------------------
    let (macd_vote, macd_verdict) = match &snapshot.macd {
        Some(macd) if macd.histogram.is_finite() => {
            if macd.histogram > 0.0 {
                (1.0, TrendDirection::Bullish)
            } else if macd.histogram < 0.0 {
                (-1.0, TrendDirection::Bearish)
            } else {
                (0.0, TrendDirection::Neutral)
            }
        }
        _ => {
            degraded.push("macd".to_string());
            (0.0, TrendDirection::Neutral)
        }
    };

    // --- Volume: tier magnitude, signed by the latest move ----------------
    let (volume_vote, volume_verdict) = match &snapshot.volume {
        Some(vol) => {
            let magnitude = match vol.strength {
                VolumeStrength::Strong => 1.0,
                VolumeStrength::Moderate => 0.5,
                VolumeStrength::Weak => 0.0,
            };
            let sign = if last_close > prev_close {
                1.0
            } else if last_close < prev_close {
                -1.0
            } else {
                0.0
            };
            (magnitude * sign, vol.strength)
        }
        None => {
            degraded.push("volume".to_string());
            (0.0, VolumeStrength::Weak)
        }
    };

    // --- Moving-average trend (consumed by pattern deferral + timeframe) --
    let ma_trend = snapshot
        .moving_averages
        .as_ref()
        .map(|ma| ma.trend)
        .unwrap_or(TrendDirection::Neutral);

    // --- Pattern: dominant formation's lean -------------------------------
    let (pattern_vote, pattern_kind, pattern_direction) = match &patterns.dominant {
        Some(dominant) => {
            let vote = match dominant.kind {
                PatternKind::BullFlag => 1.0,
                PatternKind::BearFlag => -1.0,
                PatternKind::Pennant => trend_vote(dominant.direction),
                PatternKind::Triangle => match dominant.triangle {
                    Some(TriangleKind::Ascending) => 1.0,
                    Some(TriangleKind::Descending) => -1.0,
                    Some(TriangleKind::Symmetric) => trend_vote(ma_trend),
                    Some(TriangleKind::Expanding) | None => 0.0,
                },
                PatternKind::HeadAndShoulders => -1.0,
            };
            (vote, Some(dominant.kind), dominant.direction)
        }
        None => (0.0, None, TrendDirection::Neutral),
    };

    // --- Fibonacci: nearest level type ------------------------------------
    let (fib_vote, fib_verdict) = match &snapshot.fibonacci {
        Some(fib) => match fib.nearest_role {
            LevelRole::Support => (1.0, Some(LevelRole::Support)),
            LevelRole::Resistance => (-1.0, Some(LevelRole::Resistance)),
        },
        None => {
            degraded.push("fibonacci".to_string());
            (0.0, None)
        }
    };

    // --- Weighted sum ------------------------------------------------------
    let weighted_score = cfg.weight_technical * bollinger_vote
        + cfg.weight_momentum * macd_vote
        + cfg.weight_volume * volume_vote
        + cfg.weight_pattern * pattern_vote
        + cfg.weight_fibonacci * fib_vote;

    let direction = if weighted_score > cfg.direction_threshold {
        Direction::Long
    } else if weighted_score < -cfg.direction_threshold {
        Direction::Short
    } else {
        Direction::Neutral
    };

    let probability = (weighted_score.abs() * 100.0)
        .clamp(cfg.probability_floor, cfg.probability_cap);

    // Pattern quality scales confidence: 50 is neutral, above amplifies,
    // below dampens.
    let confidence = match &patterns.dominant {
        Some(dominant) => {
            let factor = 1.0 + (dominant.confidence - 50.0) / 100.0;
            (probability * factor).clamp(cfg.probability_floor, cfg.probability_cap)
        }
        None => probability,
    };

    let volume_strong = volume_verdict == VolumeStrength::Strong;
    let timeframe = if volume_strong {
        Timeframe::Short
    } else if ma_trend != TrendDirection::Neutral || macd_vote != 0.0 {
        Timeframe::Medium
    } else {
        Timeframe::Long
    };

    debug!(
        score = weighted_score,
        %direction,
        probability,
        confidence,
        "breakout fusion"
    );

    BreakoutSignal {
        direction,
        probability,
        confidence,
        timeframe,
        weighted_score,
        signals: SignalBreakdown {
            bollinger: bollinger_verdict,
            macd: macd_verdict,
            volume: volume_verdict,
            pattern: pattern_kind,
            pattern_direction,
            fibonacci: fib_verdict,
            degraded,
        },
    }
}

fn trend_vote(trend: TrendDirection) -> f64 {
    match trend {
        TrendDirection::Bullish => 1.0,
        TrendDirection::Bearish => -1.0,
        TrendDirection::Neutral => 0.0,
    }
}
