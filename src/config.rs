// =============================================================================
// Engine Configuration — immutable records of every tunable constant
// =============================================================================
//
// Central configuration hub for the breakout engine. Every period, weight,
// and threshold lives here so that nothing is baked into an expression deep
// inside an indicator.
//
// The records are plain immutable values: construct one (or deserialize it),
// hand it to `BreakoutEngine`, and it never changes for the lifetime of the
// engine. The fusion weights and tier thresholds are empirical constants
// inherited from the original scoring rule — they are exposed as fields so
// callers can tune them, but the defaults must be kept for
// behavior-compatible scoring.

use serde::{Deserialize, Serialize};

/// Top-level configuration for a [`crate::BreakoutEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Minimum number of bars `analyze()` accepts before failing fast.
    pub min_bars: usize,
    pub indicators: IndicatorConfig,
    pub patterns: PatternConfig,
    pub fusion: FusionConfig,
    pub stops: StopConfig,
    pub sizing: SizingConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_bars: 50,
            indicators: IndicatorConfig::default(),
            patterns: PatternConfig::default(),
            fusion: FusionConfig::default(),
            stops: StopConfig::default(),
            sizing: SizingConfig::default(),
        }
    }
}

/// Periods and thresholds for the indicator library.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_std_mult: f64,
    /// Trailing window of bandwidth values averaged for squeeze detection.
    pub squeeze_baseline: usize,
    /// Trailing window of bandwidth values averaged for the volatility state.
    pub volatility_baseline: usize,
    pub atr_period: usize,
    pub mfi_period: usize,
    /// Share volume above which MFI extremes are read as institutional flow.
    pub institutional_volume: u64,
    /// Fast EMA of the trend stack.
    pub trend_ema: usize,
    /// Mid SMA of the trend stack.
    pub trend_sma_mid: usize,
    /// Long SMA of the trend stack.
    pub trend_sma_long: usize,
    /// Bars back against which OBV momentum is measured.
    pub obv_momentum_lookback: usize,
    /// Baseline period for the relative-volume ratio.
    pub volume_baseline: usize,
    /// Relative-volume percent at or above which the tier is STRONG.
    pub volume_strong_pct: f64,
    /// Relative-volume percent at or above which the tier is MODERATE.
    pub volume_moderate_pct: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_std_mult: 2.0,
            squeeze_baseline: 20,
            volatility_baseline: 50,
            atr_period: 14,
            mfi_period: 14,
            institutional_volume: 1_000_000,
            trend_ema: 20,
            trend_sma_mid: 50,
            trend_sma_long: 200,
            obv_momentum_lookback: 5,
            volume_baseline: 20,
            volume_strong_pct: 150.0,
            volume_moderate_pct: 120.0,
        }
    }
}

/// Pattern-recognition window bounds and validity thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Fewer bars than this and every pattern reports `detected: false`.
    pub min_bars: usize,
    /// Detection window is capped at this many most-recent bars.
    pub max_bars: usize,
    /// Maximum (max-min)/min range for a valid consolidation.
    pub price_deviation: f64,
    /// Minimum fraction of same-sign returns for a valid pole trend.
    pub trend_strength_min: f64,
    /// Fraction of the window (oldest bars) that forms the flag pole.
    pub pole_fraction: f64,
    /// Normalised slope magnitude below which a trendline counts as flat.
    pub flat_slope_epsilon: f64,
    /// Peaks must be at least `window_len / peak_spacing_divisor` bars apart.
    pub peak_spacing_divisor: usize,
    /// Head must exceed the shoulder average by this fraction.
    pub head_prominence_min: f64,
    /// Minimum min/max ratio between the two shoulder heights.
    pub shoulder_symmetry_min: f64,
    /// Minimum R-squared of the fitted neckline.
    pub neckline_r2_min: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            min_bars: 5,
            max_bars: 30,
            price_deviation: 0.02,
            trend_strength_min: 0.7,
            pole_fraction: 0.3,
            flat_slope_epsilon: 0.001,
            peak_spacing_divisor: 10,
            head_prominence_min: 0.10,
            shoulder_symmetry_min: 0.8,
            neckline_r2_min: 0.7,
        }
    }
}

/// Weights and thresholds of the breakout fusion rule.
///
/// The five weights must sum to 1.0; `BreakoutEngine::fuse` debug-asserts it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionConfig {
    /// Bollinger band-position vote (the "technical" component).
    pub weight_technical: f64,
    /// MACD histogram vote (the "momentum" component).
    pub weight_momentum: f64,
    pub weight_volume: f64,
    pub weight_pattern: f64,
    pub weight_fibonacci: f64,
    /// |weighted sum| above this flips NEUTRAL into LONG/SHORT.
    pub direction_threshold: f64,
    pub probability_floor: f64,
    pub probability_cap: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weight_technical: 0.25,
            weight_momentum: 0.20,
            weight_volume: 0.15,
            weight_pattern: 0.25,
            weight_fibonacci: 0.15,
            direction_threshold: 0.2,
            probability_floor: 5.0,
            probability_cap: 95.0,
        }
    }
}

impl FusionConfig {
    /// Sum of the five vote weights. 1.0 for behavior-compatible scoring.
    pub fn weight_sum(&self) -> f64 {
        self.weight_technical
            + self.weight_momentum
            + self.weight_volume
            + self.weight_pattern
            + self.weight_fibonacci
    }
}

/// Stop-loss methodology parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StopConfig {
    pub atr_tight_mult: f64,
    pub atr_normal_mult: f64,
    pub atr_wide_mult: f64,
    /// Lowest-low / highest-high lookbacks for the time-based stops.
    pub time_windows: [usize; 3],
    /// Buffer applied beyond the support/resistance level, in percent.
    pub support_buffer_pct: f64,
    /// Pattern stops only apply at or above this confidence (0-100).
    pub pattern_confidence_gate: f64,
    pub flag_stop_mult: f64,
    pub pennant_stop_mult: f64,
    pub triangle_stop_mult: f64,
    pub head_shoulders_stop_mult: f64,
    /// Trailing stop activates after this many ATRs of favourable movement.
    pub trail_activation_atr: f64,
    /// Trailing stop follows price at steps of this many ATRs.
    pub trail_step_atr: f64,
    /// ATR as a percent of price at or above which volatility is "high".
    pub high_volatility_pct: f64,
    /// ATR as a percent of price at or below which volatility is "low".
    pub low_volatility_pct: f64,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            atr_tight_mult: 1.5,
            atr_normal_mult: 2.0,
            atr_wide_mult: 3.0,
            time_windows: [5, 10, 20],
            support_buffer_pct: 0.5,
            pattern_confidence_gate: 60.0,
            flag_stop_mult: 1.5,
            pennant_stop_mult: 1.8,
            triangle_stop_mult: 2.0,
            head_shoulders_stop_mult: 2.5,
            trail_activation_atr: 1.5,
            trail_step_atr: 0.5,
            high_volatility_pct: 3.0,
            low_volatility_pct: 1.0,
        }
    }
}

/// Position-sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Account capital the risk budget is measured against.
    pub capital: f64,
    /// Percent of capital risked per position.
    pub risk_pct: f64,
    /// Signal confidence at or above which the HIGH tier applies.
    pub high_tier_min: f64,
    /// Signal confidence at or above which the MEDIUM tier applies.
    pub medium_tier_min: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            capital: 10_000.0,
            risk_pct: 2.0,
            high_tier_min: 75.0,
            medium_tier_min: 50.0,
        }
    }
}
