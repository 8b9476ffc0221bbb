// =============================================================================
// Money Flow Index (MFI) — volume-weighted RSI analog
// =============================================================================
//
//   typical price = (H + L + C) / 3
//   money flow    = typical price * volume
//
// Over the most recent `period` transitions, money flow is positive when the
// typical price rose against the prior bar and negative when it fell:
//
//   MFI = 100 - 100 / (1 + posFlow / negFlow)
//
// Thresholds:  > 80 OVERBOUGHT,  < 20 OVERSOLD.
//
// Institutional read: MFI > 60 with heavy absolute volume is ACCUMULATION,
// MFI < 40 with heavy volume is DISTRIBUTION.

use serde::{Deserialize, Serialize};

use crate::series::PriceBar;
use crate::types::{InstitutionalActivity, OscillatorSignal};

/// MFI value plus its qualitative reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MfiResult {
    pub value: f64,
    pub signal: OscillatorSignal,
    pub activity: InstitutionalActivity,
}

/// Compute MFI over the most recent `period` transitions of chronological
/// bars.
///
/// # Edge cases
/// - `period == 0` or fewer than `period + 1` bars => `None`
/// - Zero negative flow => MFI is 100 (all flow was inbound).
/// - Zero flow both ways (flat typical price) => neutral 50 sentinel.
pub fn mfi(bars: &[PriceBar], period: usize, institutional_volume: u64) -> Option<MfiResult> {
    if period == 0 || bars.len() < period + 1 {
        return None;
    }

    let window = &bars[bars.len() - period - 1..];
    let mut positive_flow = 0.0_f64;
    let mut negative_flow = 0.0_f64;

    for pair in window.windows(2) {
        let prev_typical = typical_price(&pair[0]);
        let typical = typical_price(&pair[1]);
        let flow = typical * pair[1].volume as f64;

        if typical > prev_typical {
            positive_flow += flow;
        } else if typical < prev_typical {
            negative_flow += flow;
        }
        // Unchanged typical price contributes to neither side.
    }

    let value = if positive_flow == 0.0 && negative_flow == 0.0 {
        50.0
    } else if negative_flow == 0.0 {
        100.0
    } else {
        let ratio = positive_flow / negative_flow;
        100.0 - 100.0 / (1.0 + ratio)
    };

    if !value.is_finite() {
        return None;
    }

    let signal = if value > 80.0 {
        OscillatorSignal::Overbought
    } else if value < 20.0 {
        OscillatorSignal::Oversold
    } else {
        OscillatorSignal::Neutral
    };

    let heavy_volume = bars.last()?.volume > institutional_volume;
    let activity = if value > 60.0 && heavy_volume {
        InstitutionalActivity::Accumulation
    } else if value < 40.0 && heavy_volume {
        InstitutionalActivity::Distribution
    } else {
        InstitutionalActivity::Neutral
    };

    Some(MfiResult {
        value,
        signal,
        activity,
    })
}

fn typical_price(bar: &PriceBar) -> f64 {
    (bar.high + bar.low + bar.close) / 3.0
}
