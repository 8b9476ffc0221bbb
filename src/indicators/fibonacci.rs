// =============================================================================
// Fibonacci Retracement Levels
// =============================================================================
//
// Levels sit at the classic fractions of the high-low range, measured down
// from the series high:
//
//   level(r) = high - r * (high - low),   r in {0.236, 0.382, 0.5, 0.618, 0.786}
//
// The level nearest the current close is tagged as support when price sits
// on or above it, resistance when price sits below it.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// The retracement fractions, shallowest first.
pub const RATIOS: [f64; 5] = [0.236, 0.382, 0.5, 0.618, 0.786];

/// Whether the nearest level sits below (support) or above (resistance) the
/// current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelRole {
    Support,
    Resistance,
}

impl std::fmt::Display for LevelRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Support => write!(f, "SUPPORT"),
            Self::Resistance => write!(f, "RESISTANCE"),
        }
    }
}

/// One retracement level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Full retracement ladder plus the level nearest the current close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciResult {
    pub high: f64,
    pub low: f64,
    pub levels: Vec<FibLevel>,
    pub nearest: FibLevel,
    pub nearest_role: LevelRole,
}

/// Compute retracement levels over the whole series range.
///
/// Returns `None` only for an empty series; a flat series (high == low)
/// collapses every level onto the price, which is still a valid answer.
pub fn fibonacci(series: &Series) -> Option<FibonacciResult> {
    if series.is_empty() {
        return None;
    }

    let high = series
        .bars()
        .iter()
        .map(|b| b.high)
        .fold(f64::MIN, f64::max);
    let low = series.bars().iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let range = high - low;
    let close = series.latest().close;

    let levels: Vec<FibLevel> = RATIOS
        .iter()
        .map(|&ratio| FibLevel {
            ratio,
            price: high - ratio * range,
        })
        .collect();

    let nearest = *levels
        .iter()
        .min_by(|a, b| {
            let da = (a.price - close).abs();
            let db = (b.price - close).abs();
            da.partial_cmp(&db).expect("finite distances")
        })
        .expect("levels is never empty");

    let nearest_role = if close >= nearest.price {
        LevelRole::Support
    } else {
        LevelRole::Resistance
    };

    Some(FibonacciResult {
        high,
        low,
        levels,
        nearest,
        nearest_role,
    })
}
