use common::{Bar, Extremes, IndicatorError, Result};

/// Highest high and lowest low in one pass.
///
/// Ties keep the earliest bar: a later bar must strictly exceed the running extreme to replace it.
pub fn scan_extremes(bars: &[Bar]) -> Result<Extremes> {
    let first = bars
        .first()
        .ok_or_else(|| IndicatorError::NoData("empty bar sequence".to_string()))?;

    let mut extremes = Extremes {
        high: first.high,
        high_date: first.timestamp,
        low: first.low,
        low_date: first.timestamp,
    };

    for bar in &bars[1..] {
        if bar.high > extremes.high {
            extremes.high = bar.high;
            extremes.high_date = bar.timestamp;
        }
        if bar.low < extremes.low {
            extremes.low = bar.low;
            extremes.low_date = bar.timestamp;
        }
    }

    Ok(extremes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::bars_from_hlc;

    #[test]
    fn test_scan_finds_extremes() {
        let bars = bars_from_hlc(&[10.0, 15.0, 12.0], &[8.0, 9.0, 5.0], &[9.0, 14.0, 6.0]);
        let ex = scan_extremes(&bars).unwrap();
        assert_eq!(ex.high, 15.0);
        assert_eq!(ex.high_date, bars[1].timestamp);
        assert_eq!(ex.low, 5.0);
        assert_eq!(ex.low_date, bars[2].timestamp);
    }

    #[test]
    fn test_tie_keeps_first_occurrence() {
        let bars = bars_from_hlc(&[20.0, 18.0, 20.0], &[5.0, 7.0, 5.0], &[10.0, 10.0, 10.0]);
        let ex = scan_extremes(&bars).unwrap();
        assert_eq!(ex.high_date, bars[0].timestamp);
        assert_eq!(ex.low_date, bars[0].timestamp);
    }

    #[test]
    fn test_single_bar() {
        let bars = bars_from_hlc(&[3.0], &[1.0], &[2.0]);
        let ex = scan_extremes(&bars).unwrap();
        assert_eq!((ex.high, ex.low), (3.0, 1.0));
    }

    #[test]
    fn test_empty_is_no_data() {
        assert!(matches!(scan_extremes(&[]), Err(IndicatorError::NoData(_))));
    }
}
