// =============================================================================
// Vela Breakout Engine — Library Root
// =============================================================================
//
// A pure, deterministic technical-analysis engine for daily OHLCV series.
// Given a newest-first slice of price bars, it computes a full indicator
// snapshot, scans for chart formations, fuses both into a single weighted
// breakout signal (direction / probability / confidence / timeframe), and
// derives a tiered stop-loss plan with position sizing.
//
// The engine performs no I/O and holds no state between calls: data fetching,
// caching, and presentation belong to the embedding application. Analyses for
// different symbols are independent and may run on any number of threads.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
pub mod analyzer;
pub mod breakout;
pub mod config;
pub mod error;
pub mod indicators;
pub mod patterns;
pub mod series;
pub mod stats;
pub mod stops;
pub mod types;

pub use crate::analyzer::{AnalysisResult, BreakoutEngine};
pub use crate::breakout::BreakoutSignal;
pub use crate::config::EngineConfig;
pub use crate::error::AnalysisError;
pub use crate::series::{PriceBar, Series};
pub use crate::types::{Direction, Timeframe, TrendDirection};
