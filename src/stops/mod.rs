// =============================================================================
// Stop-Loss Layer — candidate methodologies, tiers, and the recommended stop
// =============================================================================
//
// Five independent methodologies each propose candidate stop prices (ATR
// multiples, time-window extremes, buffered support/resistance, a
// pattern-keyed multiplier table, and a trailing stop). Candidates are
// consolidated into three tiers:
//
//   conservative — tight ATR, 5-bar extreme, support/resistance
//   moderate     — normal ATR, 10-bar extreme, pattern stop
//   aggressive   — wide ATR, 20-bar extreme, trailing base
//
// Each tier resolves to the candidate that gives the position the most room
// (lowest price for longs, highest for shorts). One tier is recommended by
// a priority rule: a high-confidence pattern or high volatility forces
// conservative, low volatility allows aggressive, otherwise moderate.

pub mod candidates;
pub mod sizing;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{SizingConfig, StopConfig};
use crate::indicators::atr::AtrResult;
use crate::indicators::fibonacci::FibonacciResult;
use crate::patterns::PatternMatch;
use crate::series::Series;
use crate::types::{Direction, TrendDirection};

/// Which methodology produced a stop level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopMethod {
    AtrTight,
    AtrNormal,
    AtrWide,
    TimeBased { bars: usize },
    SupportResistance,
    Pattern,
    Trailing,
}

impl std::fmt::Display for StopMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AtrTight => write!(f, "ATR_TIGHT"),
            Self::AtrNormal => write!(f, "ATR_NORMAL"),
            Self::AtrWide => write!(f, "ATR_WIDE"),
            Self::TimeBased { bars } => write!(f, "TIME_{bars}"),
            Self::SupportResistance => write!(f, "SUPPORT_RESISTANCE"),
            Self::Pattern => write!(f, "PATTERN"),
            Self::Trailing => write!(f, "TRAILING"),
        }
    }
}

/// One candidate stop level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopLevel {
    pub price: f64,
    /// Absolute distance from the entry price.
    pub distance: f64,
    /// Distance as a percent of the entry price.
    pub percentage: f64,
    pub source: StopMethod,
}

impl StopLevel {
    pub(crate) fn new(entry: f64, price: f64, source: StopMethod) -> Self {
        let distance = (entry - price).abs();
        Self {
            price,
            distance,
            percentage: if entry > 0.0 {
                distance / entry * 100.0
            } else {
                0.0
            },
            source,
        }
    }
}

/// Risk appetite tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopTier {
    Conservative,
    Moderate,
    Aggressive,
}

impl std::fmt::Display for StopTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Conservative => write!(f, "CONSERVATIVE"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::Aggressive => write!(f, "AGGRESSIVE"),
        }
    }
}

/// Trailing-stop parameters derived from volatility and pattern confidence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailingParams {
    /// Favourable movement required before the trail activates.
    pub activation_distance: f64,
    /// Distance the stop follows price by once active.
    pub step_distance: f64,
}

/// The consolidated stop plan for one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPlan {
    /// The side the stops protect (never NEUTRAL; see `plan`).
    pub side: Direction,
    pub entry: f64,
    pub candidates: Vec<StopLevel>,
    pub conservative: Option<StopLevel>,
    pub moderate: Option<StopLevel>,
    pub aggressive: Option<StopLevel>,
    pub recommended_tier: StopTier,
    pub recommended: Option<StopLevel>,
    pub trailing: Option<TrailingParams>,
    pub position: sizing::PositionSize,
}

/// Build the stop plan for the current analysis.
///
/// A NEUTRAL signal falls back to the moving-average trend for its side,
/// and to the long side when that is also neutral, so a plan is always
/// produced.
#[allow(clippy::too_many_arguments)]
pub fn plan(
    series: &Series,
    atr: Option<&AtrResult>,
    fib: Option<&FibonacciResult>,
    dominant: Option<&PatternMatch>,
    signal_direction: Direction,
    ma_trend: TrendDirection,
    signal_confidence: f64,
    cfg: &StopConfig,
    sizing_cfg: &SizingConfig,
) -> StopPlan {
    let side = match signal_direction {
        Direction::Long | Direction::Short => signal_direction,
        Direction::Neutral => match ma_trend {
            TrendDirection::Bearish => Direction::Short,
            TrendDirection::Bullish | TrendDirection::Neutral => Direction::Long,
        },
    };
    let entry = series.latest().close;

    let mut all: Vec<StopLevel> = Vec::new();
    if let Some(atr) = atr {
        all.extend(candidates::atr_candidates(entry, atr.value, side, cfg));
    }
    all.extend(candidates::time_candidates(series, entry, side, cfg));
    if let Some(level) = candidates::support_candidate(series, entry, side, fib, cfg) {
        all.push(level);
    }
    if let Some(level) = candidates::pattern_candidate(entry, atr, side, dominant, cfg) {
        all.push(level);
    }

    let trailing = atr.map(|atr| {
        let (level, params) = candidates::trailing_candidate(entry, atr, side, dominant, cfg);
        all.push(level);
        params
    });

    let conservative = tier_level(&all, StopTier::Conservative, side, cfg);
    let moderate = tier_level(&all, StopTier::Moderate, side, cfg);
    let aggressive = tier_level(&all, StopTier::Aggressive, side, cfg);

    let recommended_tier = select_tier(atr, dominant, cfg);
    let recommended = match recommended_tier {
        StopTier::Conservative => conservative,
        StopTier::Moderate => moderate,
        StopTier::Aggressive => aggressive,
    }
    .or(moderate)
    .or(conservative)
    .or(aggressive);

    let position = sizing::position_size(entry, recommended, signal_confidence, sizing_cfg);

    debug!(
        %side,
        entry,
        tier = %recommended_tier,
        candidates = all.len(),
        "stop plan"
    );

    StopPlan {
        side,
        entry,
        candidates: all,
        conservative,
        moderate,
        aggressive,
        recommended_tier,
        recommended,
        trailing,
        position,
    }
}

/// Tier membership of each methodology.
fn tier_of(method: StopMethod, cfg: &StopConfig) -> StopTier {
    match method {
        StopMethod::AtrTight | StopMethod::SupportResistance => StopTier::Conservative,
        StopMethod::AtrNormal | StopMethod::Pattern => StopTier::Moderate,
        StopMethod::AtrWide | StopMethod::Trailing => StopTier::Aggressive,
        StopMethod::TimeBased { bars } => {
            if bars <= cfg.time_windows[0] {
                StopTier::Conservative
            } else if bars <= cfg.time_windows[1] {
                StopTier::Moderate
            } else {
                StopTier::Aggressive
            }
        }
    }
}

/// Resolve a tier to the candidate giving the position the most room.
fn tier_level(
    all: &[StopLevel],
    tier: StopTier,
    side: Direction,
    cfg: &StopConfig,
) -> Option<StopLevel> {
    let members = all.iter().filter(|l| tier_of(l.source, cfg) == tier);
    match side {
        Direction::Short => members.max_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .expect("finite stop prices")
        }),
        _ => members.min_by(|a, b| {
            a.price
                .partial_cmp(&b.price)
                .expect("finite stop prices")
        }),
    }
    .copied()
}

/// Pattern confidence (0-100) above which the tier rule turns conservative.
const CONFIDENT_PATTERN: f64 = 70.0;

/// Priority rule for the recommended tier.
fn select_tier(
    atr: Option<&AtrResult>,
    dominant: Option<&PatternMatch>,
    cfg: &StopConfig,
) -> StopTier {
    if let Some(pattern) = dominant {
        if pattern.confidence > CONFIDENT_PATTERN {
            return StopTier::Conservative;
        }
    }
    if let Some(atr) = atr {
        if atr.percent_of_price >= cfg.high_volatility_pct {
            return StopTier::Conservative;
        }
        if atr.percent_of_price <= cfg.low_volatility_pct {
            return StopTier::Aggressive;
        }
    }
    StopTier::Moderate
}
