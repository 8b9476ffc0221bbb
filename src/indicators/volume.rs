// =============================================================================
// Relative Volume — current bar against its 20-day baseline
// =============================================================================
//
// ratio = current volume / mean(volume over the prior `period` bars) * 100
//
// Tiers:  >= 150% STRONG,  >= 120% MODERATE,  else WEAK. The tier feeds the
// fusion engine's volume vote and the SHORT-timeframe heuristic.

use serde::{Deserialize, Serialize};

use crate::config::IndicatorConfig;
use crate::series::PriceBar;
use crate::types::VolumeStrength;

/// Relative-volume read for the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeResult {
    pub current: f64,
    /// Mean volume over the baseline bars preceding the current one.
    pub average: f64,
    /// Current volume as a percent of the average.
    pub ratio_pct: f64,
    pub strength: VolumeStrength,
}

/// Compute the relative-volume ratio over chronological bars.
///
/// The baseline excludes the current bar, so a spike is measured against
/// normal history. Returns `None` with fewer than `volume_baseline + 1`
/// bars or a zero baseline.
pub fn relative_volume(bars: &[PriceBar], cfg: &IndicatorConfig) -> Option<VolumeResult> {
    let period = cfg.volume_baseline;
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let current = bars.last()?.volume as f64;
    let baseline = &bars[bars.len() - 1 - period..bars.len() - 1];
    let average = baseline.iter().map(|b| b.volume as f64).sum::<f64>() / period as f64;

    if average <= 0.0 {
        return None;
    }

    let ratio_pct = current / average * 100.0;
    let strength = if ratio_pct >= cfg.volume_strong_pct {
        VolumeStrength::Strong
    } else if ratio_pct >= cfg.volume_moderate_pct {
        VolumeStrength::Moderate
    } else {
        VolumeStrength::Weak
    };

    Some(VolumeResult {
        current,
        average,
        ratio_pct,
        strength,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar(offset: i64, volume: u64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.0,
            volume,
        }
    }

    fn cfg() -> IndicatorConfig {
        IndicatorConfig::default()
    }

    #[test]
    fn insufficient_data() {
        let bars: Vec<PriceBar> = (0..20).map(|i| bar(i, 1_000)).collect();
        assert!(relative_volume(&bars, &cfg()).is_none());
    }

    #[test]
    fn steady_volume_is_weak() {
        let bars: Vec<PriceBar> = (0..25).map(|i| bar(i, 1_000)).collect();
        let result = relative_volume(&bars, &cfg()).unwrap();
        assert!((result.ratio_pct - 100.0).abs() < 1e-9);
        assert_eq!(result.strength, VolumeStrength::Weak);
    }

    #[test]
    fn double_volume_is_strong() {
        let mut bars: Vec<PriceBar> = (0..24).map(|i| bar(i, 1_000)).collect();
        bars.push(bar(24, 2_000));
        let result = relative_volume(&bars, &cfg()).unwrap();
        assert!((result.ratio_pct - 200.0).abs() < 1e-9);
        assert_eq!(result.strength, VolumeStrength::Strong);
    }

    #[test]
    fn moderate_tier_between_thresholds() {
        let mut bars: Vec<PriceBar> = (0..24).map(|i| bar(i, 1_000)).collect();
        bars.push(bar(24, 1_300));
        let result = relative_volume(&bars, &cfg()).unwrap();
        assert_eq!(result.strength, VolumeStrength::Moderate);
    }

    #[test]
    fn exactly_150_pct_is_strong() {
        let mut bars: Vec<PriceBar> = (0..24).map(|i| bar(i, 1_000)).collect();
        bars.push(bar(24, 1_500));
        let result = relative_volume(&bars, &cfg()).unwrap();
        assert_eq!(result.strength, VolumeStrength::Strong);
    }

    #[test]
    fn zero_baseline_is_none() {
        let mut bars: Vec<PriceBar> = (0..24).map(|i| bar(i, 0)).collect();
        bars.push(bar(24, 5_000));
        assert!(relative_volume(&bars, &cfg()).is_none());
    }
}
