// =============================================================================
// Stop-Loss Candidate Methodologies
// =============================================================================
//
// Each function proposes candidate stop prices for one methodology. All of
// them are direction-aware: long stops sit below the entry, short stops
// above. Pattern stops use an ATR multiplier keyed by formation type and
// only fire above a confidence gate; the trailing stop's activation and
// step distances scale with volatility and pattern confidence.

use crate::config::StopConfig;
use crate::indicators::atr::AtrResult;
use crate::indicators::fibonacci::FibonacciResult;
use crate::patterns::{PatternKind, PatternMatch};
use crate::series::Series;
use crate::stops::{StopLevel, StopMethod, TrailingParams};
use crate::types::Direction;

/// Trailing activation widens by this factor in high volatility and
/// tightens by it in low volatility.
const TRAIL_VOLATILITY_FACTOR: f64 = 1.25;

/// Trailing step tightens by this factor under a confident pattern.
const TRAIL_CONFIDENT_STEP_FACTOR: f64 = 0.75;

/// Pattern confidence at which the trailing step tightens.
const TRAIL_CONFIDENT_PATTERN: f64 = 70.0;

/// The three ATR-multiple stops (tight / normal / wide).
pub fn atr_candidates(
    entry: f64,
    atr_value: f64,
    side: Direction,
    cfg: &StopConfig,
) -> Vec<StopLevel> {
    [
        (cfg.atr_tight_mult, StopMethod::AtrTight),
        (cfg.atr_normal_mult, StopMethod::AtrNormal),
        (cfg.atr_wide_mult, StopMethod::AtrWide),
    ]
    .into_iter()
    .map(|(mult, method)| StopLevel::new(entry, offset(entry, mult * atr_value, side), method))
    .collect()
}

/// Time-window stops: lowest low (highest high for shorts) over each
/// configured window.
pub fn time_candidates(
    series: &Series,
    entry: f64,
    side: Direction,
    cfg: &StopConfig,
) -> Vec<StopLevel> {
    cfg.time_windows
        .iter()
        .filter(|&&bars| bars > 0 && bars <= series.len())
        .map(|&bars| {
            let window = series.tail(bars);
            let price = match side {
                Direction::Short => window.iter().map(|b| b.high).fold(f64::MIN, f64::max),
                _ => window.iter().map(|b| b.low).fold(f64::MAX, f64::min),
            };
            StopLevel::new(entry, price, StopMethod::TimeBased { bars })
        })
        .collect()
}

/// Support/resistance stop: the nearest Fibonacci level on the protective
/// side of the entry, buffered by `support_buffer_pct`. Falls back to the
/// 20-bar extreme when no level sits on that side.
pub fn support_candidate(
    series: &Series,
    entry: f64,
    side: Direction,
    fib: Option<&FibonacciResult>,
    cfg: &StopConfig,
) -> Option<StopLevel> {
    let buffer = cfg.support_buffer_pct / 100.0;

    let level = match side {
        Direction::Short => {
            let resistance = fib.and_then(|f| {
                f.levels
                    .iter()
                    .map(|l| l.price)
                    .filter(|&p| p > entry)
                    .min_by(|a, b| a.partial_cmp(b).expect("finite levels"))
            });
            let level = resistance.or_else(|| {
                let window = series.tail(20);
                Some(window.iter().map(|b| b.high).fold(f64::MIN, f64::max))
            })?;
            level * (1.0 + buffer)
        }
        _ => {
            let support = fib.and_then(|f| {
                f.levels
                    .iter()
                    .map(|l| l.price)
                    .filter(|&p| p < entry)
                    .max_by(|a, b| a.partial_cmp(b).expect("finite levels"))
            });
            let level = support.or_else(|| {
                let window = series.tail(20);
                Some(window.iter().map(|b| b.low).fold(f64::MAX, f64::min))
            })?;
            level * (1.0 - buffer)
        }
    };

    Some(StopLevel::new(entry, level, StopMethod::SupportResistance))
}

/// Pattern-specific stop: ATR multiplier keyed by the dominant formation,
/// gated on its confidence.
pub fn pattern_candidate(
    entry: f64,
    atr: Option<&AtrResult>,
    side: Direction,
    dominant: Option<&PatternMatch>,
    cfg: &StopConfig,
) -> Option<StopLevel> {
    let atr = atr?;
    let pattern = dominant?;
    if pattern.confidence < cfg.pattern_confidence_gate {
        return None;
    }

    let mult = match pattern.kind {
        PatternKind::BullFlag | PatternKind::BearFlag => cfg.flag_stop_mult,
        PatternKind::Pennant => cfg.pennant_stop_mult,
        PatternKind::Triangle => cfg.triangle_stop_mult,
        PatternKind::HeadAndShoulders => cfg.head_shoulders_stop_mult,
    };

    Some(StopLevel::new(
        entry,
        offset(entry, mult * atr.value, side),
        StopMethod::Pattern,
    ))
}

/// Trailing stop: initial level one activation-distance away, plus the
/// parameters the caller needs to maintain the trail.
pub fn trailing_candidate(
    entry: f64,
    atr: &AtrResult,
    side: Direction,
    dominant: Option<&PatternMatch>,
    cfg: &StopConfig,
) -> (StopLevel, TrailingParams) {
    let volatility_factor = if atr.percent_of_price >= cfg.high_volatility_pct {
        TRAIL_VOLATILITY_FACTOR
    } else if atr.percent_of_price <= cfg.low_volatility_pct {
        1.0 / TRAIL_VOLATILITY_FACTOR
    } else {
        1.0
    };

    let confident = dominant
        .map(|p| p.confidence >= TRAIL_CONFIDENT_PATTERN)
        .unwrap_or(false);
    let step_factor = if confident {
        TRAIL_CONFIDENT_STEP_FACTOR
    } else {
        1.0
    };

    let activation_distance = cfg.trail_activation_atr * atr.value * volatility_factor;
    let step_distance = cfg.trail_step_atr * atr.value * step_factor;

    let level = StopLevel::new(
        entry,
        offset(entry, activation_distance, side),
        StopMethod::Trailing,
    );

    (
        level,
        TrailingParams {
            activation_distance,
            step_distance,
        },
    )
}

/// Place a stop `distance` away on the protective side of the entry.
fn offset(entry: f64, distance: f64, side: Direction) -> f64 {
    match side {
        Direction::Short => entry + distance,
        _ => entry - distance,
    }
}
