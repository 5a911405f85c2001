use common::{Bar, IndicatorError, Result};

use super::round_to;

/// Calculate Average True Range with Wilder's smoothing
///
/// # Arguments
/// * `bars` - Ascending bars
/// * `period` - ATR period (typically 14)
///
/// # Returns
/// ATR at the last bar, rounded to 6 decimals
pub fn calculate_atr(bars: &[Bar], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "ATR period must be at least 1".to_string(),
        ));
    }
    IndicatorError::require_bars(period + 1, bars.len())?;

    let true_ranges: Vec<f64> = bars
        .windows(2)
        .map(|pair| true_range(pair[1].high, pair[1].low, pair[0].close))
        .collect();

    // Initial ATR is the SMA of the first `period` true ranges
    let mut atr = true_ranges[..period].iter().sum::<f64>() / period as f64;

    // Wilder's Smoothing for subsequent values
    let n = period as f64;
    for tr in &true_ranges[period..] {
        atr = (atr * (n - 1.0) + tr) / n;
    }

    Ok(round_to(atr, 6))
}

/// Calculate True Range for a single bar
pub fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}
