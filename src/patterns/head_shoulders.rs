// =============================================================================
// Head-and-Shoulders Detection
// =============================================================================
//
// Pipeline:
//   1. Find strict local peaks in the window's closes, then keep the three
//      highest that are spaced at least `window_len / 10` bars apart.
//   2. The middle peak must be the head and exceed the shoulder average by
//      the prominence threshold; the shoulders must be within 20% of each
//      other (symmetry >= 0.8).
//   3. Fit the neckline through the trough closes between the outer
//      shoulders; the fit must reach R² 0.7 (a perfectly level neckline
//      counts as a perfect fit).
//   4. Volume confirmation: volume strictly decreasing left shoulder ->
//      head -> right shoulder.
//
// Failing any precondition reports `detected: false`; the detector never
// errors.

use crate::config::PatternConfig;
use crate::patterns::heuristics::{local_peaks, local_troughs};
use crate::patterns::{Neckline, PatternKind, PatternMatch};
use crate::series::PriceBar;
use crate::stats::linear_regression_xy;
use crate::types::TrendDirection;

// Confidence weight table.
const WEIGHT_PROMINENCE: f64 = 0.30;
const WEIGHT_SYMMETRY: f64 = 0.25;
const WEIGHT_NECKLINE: f64 = 0.25;
const WEIGHT_VOLUME: f64 = 0.20;

/// Volume score when the shoulder->head->shoulder sequence does not
/// contract.
const VOLUME_MISS_SCORE: f64 = 0.3;

/// Detect a head-and-shoulders top over the window.
pub fn detect_head_and_shoulders(window: &[PriceBar], cfg: &PatternConfig) -> PatternMatch {
    let missed = || PatternMatch::missed(PatternKind::HeadAndShoulders);

    if window.len() < cfg.min_bars {
        return missed();
    }

    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let peaks = local_peaks(&closes);
    if peaks.len() < 3 {
        return missed();
    }

    let min_spacing = (window.len() / cfg.peak_spacing_divisor).max(1);
    let Some([left, head, right]) = pick_three_peaks(&closes, &peaks, min_spacing) else {
        return missed();
    };

    let left_height = closes[left];
    let head_height = closes[head];
    let right_height = closes[right];

    // The head must be the tallest of the three, by construction of the
    // greedy pick; reject outright if it is not the middle peak.
    if head_height <= left_height || head_height <= right_height {
        return missed();
    }

    let shoulder_avg = (left_height + right_height) / 2.0;
    let prominence = head_height / shoulder_avg - 1.0;
    if prominence <= cfg.head_prominence_min {
        return missed();
    }

    let symmetry = left_height.min(right_height) / left_height.max(right_height);
    if symmetry < cfg.shoulder_symmetry_min {
        return missed();
    }

    let Some(neckline) = fit_neckline(&closes, left, right) else {
        return missed();
    };
    if neckline.r_squared <= cfg.neckline_r2_min {
        return missed();
    }

    let volume_ok = window[left].volume > window[head].volume
        && window[head].volume > window[right].volume;
    let volume_score = if volume_ok { 1.0 } else { VOLUME_MISS_SCORE };

    // Prominence maps to a full score at twice the minimum threshold.
    let prominence_score = (prominence / (2.0 * cfg.head_prominence_min)).clamp(0.0, 1.0);

    let confidence = 100.0
        * (WEIGHT_PROMINENCE * prominence_score
            + WEIGHT_SYMMETRY * symmetry
            + WEIGHT_NECKLINE * neckline.r_squared
            + WEIGHT_VOLUME * volume_score);

    PatternMatch {
        kind: PatternKind::HeadAndShoulders,
        detected: true,
        confidence: confidence.clamp(0.0, 100.0),
        start_index: left,
        end_index: right,
        direction: TrendDirection::Bearish,
        triangle: None,
        neckline: Some(neckline),
        apex_bars: None,
    }
}

/// Greedily keep the highest peaks that respect the spacing rule, then
/// return them in chronological order once three are found.
fn pick_three_peaks(closes: &[f64], peaks: &[usize], min_spacing: usize) -> Option<[usize; 3]> {
    let mut by_height: Vec<usize> = peaks.to_vec();
    by_height.sort_by(|&a, &b| {
        closes[b]
            .partial_cmp(&closes[a])
            .expect("finite closes")
            .then(a.cmp(&b))
    });

    let mut chosen: Vec<usize> = Vec::with_capacity(3);
    for &idx in &by_height {
        if chosen
            .iter()
            .all(|&c| idx.abs_diff(c) >= min_spacing)
        {
            chosen.push(idx);
            if chosen.len() == 3 {
                break;
            }
        }
    }

    if chosen.len() < 3 {
        return None;
    }
    chosen.sort_unstable();
    Some([chosen[0], chosen[1], chosen[2]])
}

/// Fit a line through the trough closes strictly between the outer
/// shoulders.
fn fit_neckline(closes: &[f64], left: usize, right: usize) -> Option<Neckline> {
    let troughs: Vec<usize> = local_troughs(closes)
        .into_iter()
        .filter(|&i| i > left && i < right)
        .collect();
    if troughs.len() < 2 {
        return None;
    }

    let xs: Vec<f64> = troughs.iter().map(|&i| i as f64).collect();
    let ys: Vec<f64> = troughs.iter().map(|&i| closes[i]).collect();

    // A level neckline defeats the R² formula (zero variance to explain),
    // but it is the textbook-perfect case.
    let spread = ys.iter().fold(f64::MIN, |a, &b| a.max(b))
        - ys.iter().fold(f64::MAX, |a, &b| a.min(b));
    let mean = ys.iter().sum::<f64>() / ys.len() as f64;
    if mean > 0.0 && spread / mean < 1e-9 {
        return Some(Neckline {
            slope: 0.0,
            intercept: mean,
            r_squared: 1.0,
        });
    }

    let fit = linear_regression_xy(&xs, &ys);
    Some(Neckline {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn bar(offset: i64, close: f64, volume: u64) -> PriceBar {
        PriceBar {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(offset),
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume,
        }
    }

    /// A clean 30-bar head-and-shoulders: shoulders at ~110, head at 125,
    /// neckline near 100, volume fading left to right.
    fn hs_window() -> Vec<PriceBar> {
        let closes = [
            100.0, 102.0, 104.0, 107.0, 110.0, 107.0, 104.0, 101.0, 100.0, 103.0, 109.0, 116.0,
            122.0, 125.0, 122.0, 116.0, 109.0, 103.0, 100.0, 101.0, 104.0, 107.0, 109.5, 107.0,
            104.0, 101.0, 99.5, 99.0, 98.5, 98.0,
        ];
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let volume = if i == 4 {
                    90_000
                } else if i == 13 {
                    60_000
                } else if i == 22 {
                    30_000
                } else {
                    20_000
                };
                bar(i as i64, c, volume)
            })
            .collect()
    }

    #[test]
    fn detects_clean_formation() {
        let m = detect_head_and_shoulders(&hs_window(), &PatternConfig::default());
        assert!(m.detected);
        assert_eq!(m.direction, TrendDirection::Bearish);
        assert_eq!(m.start_index, 4);
        assert_eq!(m.end_index, 22);
        assert!(m.confidence > 60.0, "confidence {}", m.confidence);
        let neckline = m.neckline.unwrap();
        assert!(neckline.r_squared > 0.7);
    }

    #[test]
    fn volume_fade_raises_confidence() {
        let fading = detect_head_and_shoulders(&hs_window(), &PatternConfig::default());

        let mut flat_volume = hs_window();
        for b in flat_volume.iter_mut() {
            b.volume = 50_000;
        }
        let flat = detect_head_and_shoulders(&flat_volume, &PatternConfig::default());

        assert!(flat.detected);
        assert!(fading.confidence > flat.confidence);
    }

    #[test]
    fn rejects_flat_head() {
        // Three peaks of nearly equal height: no prominence.
        let mut window = hs_window();
        for b in window.iter_mut() {
            if b.close > 111.0 {
                b.close = 111.0;
                b.high = 111.5;
                b.low = 110.5;
            }
        }
        assert!(!detect_head_and_shoulders(&window, &PatternConfig::default()).detected);
    }

    #[test]
    fn rejects_lopsided_shoulders() {
        let mut window = hs_window();
        // Crush the right shoulder well below 80% of the left.
        for b in window.iter_mut().skip(19) {
            if b.close > 85.0 {
                b.close *= 0.78;
                b.high = b.close + 0.5;
                b.low = b.close - 0.5;
            }
        }
        assert!(!detect_head_and_shoulders(&window, &PatternConfig::default()).detected);
    }

    #[test]
    fn monotone_series_has_no_peaks() {
        let window: Vec<PriceBar> = (0..30).map(|i| bar(i, 100.0 + i as f64, 10_000)).collect();
        assert!(!detect_head_and_shoulders(&window, &PatternConfig::default()).detected);
    }

    #[test]
    fn short_window_is_missed() {
        let window: Vec<PriceBar> = (0..4).map(|i| bar(i, 100.0, 10_000)).collect();
        assert!(!detect_head_and_shoulders(&window, &PatternConfig::default()).detected);
    }
}
