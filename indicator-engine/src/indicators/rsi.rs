use common::{IndicatorError, Result, RsiSignal};

use super::round_to;

/// Calculate RSI using Wilder's Smoothing
///
/// # Arguments
/// * `closes` - Slice of closing prices
/// * `period` - RSI period (typically 14)
///
/// # Returns
/// RSI at the last close, rounded to 2 decimals. A window without losses is 100.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "RSI period must be at least 1".to_string(),
        ));
    }
    IndicatorError::require_bars(period + 1, closes.len())?;

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    // Initial averages over the first `period` deltas
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for delta in &deltas[..period] {
        avg_gain += delta.max(0.0);
        avg_loss += (-delta).max(0.0);
    }
    let n = period as f64;
    avg_gain /= n;
    avg_loss /= n;

    for delta in &deltas[period..] {
        avg_gain = (avg_gain * (n - 1.0) + delta.max(0.0)) / n;
        avg_loss = (avg_loss * (n - 1.0) + (-delta).max(0.0)) / n;
    }

    if avg_loss == 0.0 {
        return Ok(100.0);
    }

    let rs = avg_gain / avg_loss;
    Ok(round_to(100.0 - 100.0 / (1.0 + rs), 2))
}

/// RSI value together with its overbought/oversold label
pub fn calculate_rsi_with_signal(closes: &[f64], period: usize) -> Result<(f64, RsiSignal)> {
    let rsi = calculate_rsi(closes, period)?;
    Ok((rsi, RsiSignal::classify(rsi)))
}
