// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators consumed by the
// breakout fusion engine. Every public function returns `Option<T>` so
// callers are forced to handle insufficient-data and numerical-edge-case
// scenarios; `None` is always a degraded input, never a crash.
//
// Indicators are recomputed in full from the series on every call. There is
// no incremental update and no cross-call cache — callers that want caching
// wrap the engine.

pub mod atr;
pub mod bollinger;
pub mod fibonacci;
pub mod macd;
pub mod mfi;
pub mod moving_averages;
pub mod obv;
pub mod rsi;
pub mod volume;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::IndicatorConfig;
use crate::series::Series;

/// One full indicator pass over a series.
///
/// Fields are `Option`al: with the 50-bar minimum everything except the
/// long moving averages is normally present, but a degenerate series may
/// knock out individual indicators without aborting the analysis — the
/// fusion layer substitutes neutral votes for missing entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: Option<rsi::RsiResult>,
    pub macd: Option<macd::MacdResult>,
    pub bollinger: Option<bollinger::BollingerResult>,
    pub atr: Option<atr::AtrResult>,
    pub mfi: Option<mfi::MfiResult>,
    pub fibonacci: Option<fibonacci::FibonacciResult>,
    pub moving_averages: Option<moving_averages::MovingAverageResult>,
    pub obv: Option<obv::ObvResult>,
    pub volume: Option<volume::VolumeResult>,
}

/// Run every indicator over the series.
pub fn compute_snapshot(series: &Series, cfg: &IndicatorConfig) -> IndicatorSnapshot {
    let closes = series.closes();

    let snapshot = IndicatorSnapshot {
        rsi: rsi::rsi(&closes, cfg.rsi_period),
        macd: macd::macd(&closes, cfg.macd_fast, cfg.macd_slow, cfg.macd_signal),
        bollinger: bollinger::bollinger(&closes, cfg),
        atr: atr::atr(series.bars(), cfg.atr_period),
        mfi: mfi::mfi(series.bars(), cfg.mfi_period, cfg.institutional_volume),
        fibonacci: fibonacci::fibonacci(series),
        moving_averages: moving_averages::moving_averages(&closes, cfg),
        obv: obv::obv(series.bars(), cfg.obv_momentum_lookback),
        volume: volume::relative_volume(series.bars(), cfg),
    };

    for (name, missing) in [
        ("rsi", snapshot.rsi.is_none()),
        ("macd", snapshot.macd.is_none()),
        ("bollinger", snapshot.bollinger.is_none()),
        ("atr", snapshot.atr.is_none()),
        ("mfi", snapshot.mfi.is_none()),
        ("fibonacci", snapshot.fibonacci.is_none()),
        ("moving_averages", snapshot.moving_averages.is_none()),
        ("obv", snapshot.obv.is_none()),
        ("volume", snapshot.volume.is_none()),
    ] {
        if missing {
            debug!(indicator = name, bars = series.len(), "indicator unavailable");
        }
    }

    snapshot
}
