pub mod atr;
pub mod ema;
pub mod extremes;
pub mod macd;
pub mod pivot_points;
pub mod rsi;

pub use atr::{calculate_atr, true_range};
pub use ema::calculate_ema;
pub use extremes::scan_extremes;
pub use macd::{calculate_macd, macd_series};
pub use pivot_points::{calculate_pivot_points, floor_pivots};
pub use rsi::{calculate_rsi, calculate_rsi_with_signal};

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Close prices of a bar slice
pub fn closes(bars: &[common::Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
