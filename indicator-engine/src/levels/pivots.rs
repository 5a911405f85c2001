use common::{Bar, PivotPoint, PivotSet};

/// Find local highs and lows over a symmetric window.
///
/// Bar `i` (with `window <= i < n - window`) is a pivot high when no bar within
/// `window` positions on either side has a larger high; equal highs do not
/// disqualify it. Pivot lows mirror this with lows. Both lists come back in
/// ascending index order.
pub fn detect_pivots(bars: &[Bar], window: usize) -> PivotSet {
    let mut pivots = PivotSet::default();
    let n = bars.len();
    if window == 0 || n <= 2 * window {
        return pivots;
    }

    for i in window..n - window {
        let bar = &bars[i];
        let neighbours = bars[i - window..=i + window]
            .iter()
            .enumerate()
            .filter(|(offset, _)| *offset != window)
            .map(|(_, b)| b);

        let mut is_high = true;
        let mut is_low = true;
        for other in neighbours {
            if other.high > bar.high {
                is_high = false;
            }
            if other.low < bar.low {
                is_low = false;
            }
            if !is_high && !is_low {
                break;
            }
        }

        if is_high {
            pivots.highs.push(PivotPoint {
                index: i,
                price: bar.high,
                timestamp: bar.timestamp,
            });
        }
        if is_low {
            pivots.lows.push(PivotPoint {
                index: i,
                price: bar.low,
                timestamp: bar.timestamp,
            });
        }
    }

    pivots
}
