// =============================================================================
// Price Series — validated OHLCV bars and the ingestion boundary
// =============================================================================
//
// Callers supply daily bars **newest-first** (index 0 = most recent session),
// which is the convention of the upstream market-data layer. Reversed or
// corrupted ordering silently poisons every EMA and regression downstream, so
// the conversion to the engine's internal chronological (oldest-first) order
// happens exactly once, here, on a copy. The caller's slice is never mutated.
//
// Invariants enforced per bar:  low <= open <= high,  low <= close <= high,
// strictly positive finite prices. Dates must be strictly descending in the
// caller's newest-first slice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// One daily trading session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl PriceBar {
    /// Check the OHLC ordering and positivity invariants.
    ///
    /// Returns a human-readable reason on the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(format!("{name} is not finite"));
            }
            if value <= 0.0 {
                return Err(format!("{name} must be positive, got {value}"));
            }
        }
        if self.low > self.high {
            return Err(format!("low {} exceeds high {}", self.low, self.high));
        }
        if self.open < self.low || self.open > self.high {
            return Err(format!(
                "open {} outside [low {}, high {}]",
                self.open, self.low, self.high
            ));
        }
        if self.close < self.low || self.close > self.high {
            return Err(format!(
                "close {} outside [low {}, high {}]",
                self.close, self.low, self.high
            ));
        }
        Ok(())
    }
}

/// A validated, chronologically ordered (oldest-first) series of bars.
///
/// All indicator and pattern math in this crate runs over `Series`, so the
/// newest-first/oldest-first question is settled once at construction and
/// never revisited.
#[derive(Debug, Clone)]
pub struct Series {
    bars: Vec<PriceBar>,
}

impl Series {
    /// Build a series from the caller's newest-first slice.
    ///
    /// Validates every bar and the date ordering, then reverses onto a fresh
    /// buffer. Indices in errors refer to the caller's newest-first slice.
    pub fn from_newest_first(bars: &[PriceBar]) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }

        for (index, bar) in bars.iter().enumerate() {
            bar.validate()
                .map_err(|reason| AnalysisError::InvalidBar { index, reason })?;
        }

        // Newest-first input means dates must be strictly descending.
        for (index, pair) in bars.windows(2).enumerate() {
            if pair[1].date >= pair[0].date {
                return Err(AnalysisError::InvalidBar {
                    index: index + 1,
                    reason: format!(
                        "date {} is not older than preceding bar's {}",
                        pair[1].date, pair[0].date
                    ),
                });
            }
        }

        let mut chronological = bars.to_vec();
        chronological.reverse();
        Ok(Self {
            bars: chronological,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars, oldest first.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// The most recent bar.
    pub fn latest(&self) -> &PriceBar {
        // Non-empty by construction.
        self.bars.last().expect("series is never empty")
    }

    /// Closing prices, oldest first.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High prices, oldest first.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Low prices, oldest first.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Volumes as floats, oldest first.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// The most recent `count` bars (all bars when the series is shorter),
    /// oldest first.
    pub fn tail(&self, count: usize) -> &[PriceBar] {
        let start = self.bars.len().saturating_sub(count);
        &self.bars[start..]
    }
}
