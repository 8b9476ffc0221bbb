// =============================================================================
// Position Sizing — risk budget over stop distance, scaled by confidence
// =============================================================================
//
//   base shares = floor(capital * riskPercent / |entry - stop|)
//   shares      = floor(base * tier multiplier)
//
// Tier multipliers: HIGH 1.0, MEDIUM 0.75, LOW 0.5. A degenerate stop
// distance sizes to zero shares rather than dividing by zero.

use serde::{Deserialize, Serialize};

use crate::config::SizingConfig;
use crate::stops::StopLevel;
use crate::types::ConfidenceTier;

/// The sized position for one analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSize {
    pub tier: ConfidenceTier,
    pub shares: u64,
    /// Loss per share if the recommended stop is hit.
    pub risk_per_share: f64,
    /// Total loss if the recommended stop is hit.
    pub capital_at_risk: f64,
}

/// Map a signal confidence (0-100) to its sizing tier.
pub fn confidence_tier(confidence: f64, cfg: &SizingConfig) -> ConfidenceTier {
    if confidence >= cfg.high_tier_min {
        ConfidenceTier::High
    } else if confidence >= cfg.medium_tier_min {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    }
}

/// Size a position against the recommended stop.
///
/// With no stop (or a stop at the entry price) the position sizes to zero —
/// an unbounded risk per share cannot be budgeted.
pub fn position_size(
    entry: f64,
    stop: Option<StopLevel>,
    confidence: f64,
    cfg: &SizingConfig,
) -> PositionSize {
    let tier = confidence_tier(confidence, cfg);

    let risk_per_share = stop.map(|s| (entry - s.price).abs()).unwrap_or(0.0);
    if risk_per_share <= f64::EPSILON || cfg.capital <= 0.0 || cfg.risk_pct <= 0.0 {
        return PositionSize {
            tier,
            shares: 0,
            risk_per_share,
            capital_at_risk: 0.0,
        };
    }

    let budget = cfg.capital * cfg.risk_pct / 100.0;
    let base = (budget / risk_per_share).floor();
    let shares = (base * tier.multiplier()).floor() as u64;

    PositionSize {
        tier,
        shares,
        risk_per_share,
        capital_at_risk: shares as f64 * risk_per_share,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::stops::StopMethod;

    fn stop(entry: f64, price: f64) -> StopLevel {
        StopLevel::new(entry, price, StopMethod::AtrNormal)
    }

    fn cfg() -> SizingConfig {
        SizingConfig::default()
    }

    #[test]
    fn tier_thresholds() {
        let cfg = cfg();
        assert_eq!(confidence_tier(80.0, &cfg), ConfidenceTier::High);
        assert_eq!(confidence_tier(75.0, &cfg), ConfidenceTier::High);
        assert_eq!(confidence_tier(60.0, &cfg), ConfidenceTier::Medium);
        assert_eq!(confidence_tier(49.9, &cfg), ConfidenceTier::Low);
    }

    #[test]
    fn high_confidence_full_size() {
        // Budget 200 (2% of 10k), risk 2/share => 100 shares.
        let size = position_size(100.0, Some(stop(100.0, 98.0)), 80.0, &cfg());
        assert_eq!(size.tier, ConfidenceTier::High);
        assert_eq!(size.shares, 100);
        assert!((size.capital_at_risk - 200.0).abs() < 1e-9);
    }

    #[test]
    fn medium_confidence_scales_to_three_quarters() {
        let size = position_size(100.0, Some(stop(100.0, 98.0)), 60.0, &cfg());
        assert_eq!(size.shares, 75);
    }

    #[test]
    fn low_confidence_scales_to_half() {
        let size = position_size(100.0, Some(stop(100.0, 98.0)), 30.0, &cfg());
        assert_eq!(size.shares, 50);
    }

    #[test]
    fn floors_fractional_shares() {
        // Budget 200, risk 3/share => 66.67 -> 66 base, 49.5 -> 49 at MEDIUM.
        let size = position_size(100.0, Some(stop(100.0, 97.0)), 60.0, &cfg());
        assert_eq!(size.shares, 49);
    }

    #[test]
    fn zero_distance_sizes_to_zero() {
        let size = position_size(100.0, Some(stop(100.0, 100.0)), 80.0, &cfg());
        assert_eq!(size.shares, 0);
        assert_eq!(size.capital_at_risk, 0.0);
    }

    #[test]
    fn missing_stop_sizes_to_zero() {
        let size = position_size(100.0, None, 80.0, &cfg());
        assert_eq!(size.shares, 0);
    }
}
