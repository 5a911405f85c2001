use common::{IndicatorError, MacdValues, Result};

use super::ema::calculate_ema;
use super::round_to;

/// Fast EMA minus slow EMA at the end of `closes`
fn macd_line(closes: &[f64], fast_period: usize, slow_period: usize) -> Result<f64> {
    Ok(calculate_ema(closes, fast_period)? - calculate_ema(closes, slow_period)?)
}

/// MACD line value for every prefix of `closes` long enough to seed the slow EMA.
///
/// Each point recomputes both EMAs over its own prefix, so this is quadratic in
/// the series length. Swapping in a carried-state EMA changes cost only.
pub fn macd_series(closes: &[f64], fast_period: usize, slow_period: usize) -> Result<Vec<f64>> {
    (slow_period..=closes.len())
        .map(|end| macd_line(&closes[..end], fast_period, slow_period))
        .collect()
}

/// Calculate MACD line, signal line and histogram at the last close
///
/// # Arguments
/// * `closes` - Slice of closing prices
/// * `fast_period` / `slow_period` - EMA periods, fast must be shorter
/// * `signal_period` - EMA period applied to the MACD line series
pub fn calculate_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Result<MacdValues> {
    validate_periods(fast_period, slow_period, signal_period)?;
    IndicatorError::require_bars(slow_period + signal_period, closes.len())?;

    let macd = macd_line(closes, fast_period, slow_period)?;
    let series = macd_series(closes, fast_period, slow_period)?;
    let signal = calculate_ema(&series, signal_period)?;

    Ok(MacdValues {
        macd: round_to(macd, 6),
        signal: round_to(signal, 6),
        histogram: round_to(macd - signal, 6),
    })
}

pub fn validate_periods(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<()> {
    if fast_period == 0 || signal_period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "MACD periods must be at least 1 (fast={}, signal={})",
            fast_period, signal_period
        )));
    }
    if fast_period >= slow_period {
        return Err(IndicatorError::InvalidParameter(format!(
            "MACD fast period ({}) must be less than slow period ({})",
            fast_period, slow_period
        )));
    }
    Ok(())
}
