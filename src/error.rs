// =============================================================================
// Error taxonomy for the breakout engine
// =============================================================================
//
// Only two conditions are fatal to an analysis call: a series too short for
// the required lookback, and a bar that violates the OHLC invariants.
//
// Degenerate numerics inside the indicator layer (zero average loss in RSI,
// zero variance in a trendline fit) are handled locally with documented
// sentinel values and never surface as errors. Likewise, the absence of a
// chart pattern is a normal outcome, not an error.

use thiserror::Error;

/// Fatal analysis failures. Everything else degrades gracefully.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The series is shorter than the longest required lookback.
    #[error("insufficient data: need at least {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A bar violates the OHLC ordering or positivity invariants.
    #[error("invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: String },
}
