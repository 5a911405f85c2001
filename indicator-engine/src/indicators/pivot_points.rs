use common::{Bar, IndicatorError, PivotLevels, Result};

use super::round_to;

/// Floor-trader pivot levels from one completed bar's high, low and close
pub fn floor_pivots(high: f64, low: f64, close: f64) -> PivotLevels {
    let pp = (high + low + close) / 3.0;
    let range = high - low;

    PivotLevels {
        pp: round_to(pp, 6),
        r1: round_to(2.0 * pp - low, 6),
        r2: round_to(pp + range, 6),
        r3: round_to(high + 2.0 * (pp - low), 6),
        s1: round_to(2.0 * pp - high, 6),
        s2: round_to(pp - range, 6),
        s3: round_to(low - 2.0 * (high - pp), 6),
    }
}

/// Pivot levels from the second-to-last bar.
///
/// The last bar may still be forming, so the previous one is the latest completed period.
/// Returns the levels and the bar they were derived from.
pub fn calculate_pivot_points(bars: &[Bar]) -> Result<(PivotLevels, &Bar)> {
    IndicatorError::require_bars(2, bars.len())?;
    let source = &bars[bars.len() - 2];
    Ok((floor_pivots(source.high, source.low, source.close), source))
}
