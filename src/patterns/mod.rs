// =============================================================================
// Pattern Recognition Engine
// =============================================================================
//
// Detects chart formations over a bounded lookback window (min 5, max 30
// bars by default). Every detector runs on every call and reports a
// `PatternMatch` whether or not it fired; among the fired ones the single
// highest-confidence match becomes dominant, with ties broken by the fixed
// enumeration order bull flag, bear flag, pennant, triangle,
// head-and-shoulders.
//
// Detection never fails: a window too short to scan, or a series with no
// usable pivots, simply comes back `detected: false` for every kind.

pub mod flags;
pub mod head_shoulders;
pub mod heuristics;
pub mod triangles;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PatternConfig;
use crate::series::Series;
use crate::types::TrendDirection;

/// The chart formations this engine recognises, in dominance tie-break
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    BullFlag,
    BearFlag,
    Pennant,
    Triangle,
    HeadAndShoulders,
}

impl std::fmt::Display for PatternKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BullFlag => write!(f, "BULL_FLAG"),
            Self::BearFlag => write!(f, "BEAR_FLAG"),
            Self::Pennant => write!(f, "PENNANT"),
            Self::Triangle => write!(f, "TRIANGLE"),
            Self::HeadAndShoulders => write!(f, "HEAD_AND_SHOULDERS"),
        }
    }
}

/// Triangle sub-type, classified from the upper/lower trendline slopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriangleKind {
    Symmetric,
    Ascending,
    Descending,
    Expanding,
}

impl std::fmt::Display for TriangleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Symmetric => write!(f, "SYMMETRIC"),
            Self::Ascending => write!(f, "ASCENDING"),
            Self::Descending => write!(f, "DESCENDING"),
            Self::Expanding => write!(f, "EXPANDING"),
        }
    }
}

/// Fitted neckline of a head-and-shoulders formation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neckline {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// One detector's verdict over the current window.
///
/// Indices are chronological offsets into the detection window (0 = oldest
/// bar of the window).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub detected: bool,
    /// 0-100.
    pub confidence: f64,
    pub start_index: usize,
    pub end_index: usize,
    /// The direction the formation leans toward once it resolves.
    pub direction: TrendDirection,
    pub triangle: Option<TriangleKind>,
    pub neckline: Option<Neckline>,
    /// Bars past the window end where converging trendlines meet.
    pub apex_bars: Option<f64>,
}

impl PatternMatch {
    /// The "nothing found" verdict for a detector.
    pub fn missed(kind: PatternKind) -> Self {
        Self {
            kind,
            detected: false,
            confidence: 0.0,
            start_index: 0,
            end_index: 0,
            direction: TrendDirection::Neutral,
            triangle: None,
            neckline: None,
            apex_bars: None,
        }
    }
}

/// All detector verdicts plus the dominant match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternScan {
    pub matches: Vec<PatternMatch>,
    pub dominant: Option<PatternMatch>,
}

impl PatternScan {
    fn empty() -> Self {
        Self {
            matches: vec![
                PatternMatch::missed(PatternKind::BullFlag),
                PatternMatch::missed(PatternKind::BearFlag),
                PatternMatch::missed(PatternKind::Pennant),
                PatternMatch::missed(PatternKind::Triangle),
                PatternMatch::missed(PatternKind::HeadAndShoulders),
            ],
            dominant: None,
        }
    }
}

/// Scan the most recent bars of a series for chart formations.
pub fn detect_patterns(series: &Series, cfg: &PatternConfig) -> PatternScan {
    let window = series.tail(cfg.max_bars);
    if window.len() < cfg.min_bars {
        debug!(
            bars = window.len(),
            min = cfg.min_bars,
            "pattern scan skipped: window too short"
        );
        return PatternScan::empty();
    }

    let matches = vec![
        flags::detect_bull_flag(window, cfg),
        flags::detect_bear_flag(window, cfg),
        flags::detect_pennant(window, cfg),
        triangles::detect_triangle(window, cfg),
        head_shoulders::detect_head_and_shoulders(window, cfg),
    ];

    // Highest confidence wins; strict comparison keeps the first of a tie.
    let mut dominant: Option<PatternMatch> = None;
    for m in matches.iter().filter(|m| m.detected) {
        let better = match &dominant {
            Some(current) => m.confidence > current.confidence,
            None => true,
        };
        if better {
            dominant = Some(*m);
        }
    }

    if let Some(d) = &dominant {
        debug!(kind = %d.kind, confidence = d.confidence, "dominant pattern");
    }

    PatternScan { matches, dominant }
}
