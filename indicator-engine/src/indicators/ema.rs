use common::{IndicatorError, Result};

/// Calculate Exponential Moving Average, seeded with the SMA of the first `period` values
///
/// # Arguments
/// * `values` - Ordered series
/// * `period` - EMA period
///
/// # Returns
/// The EMA value at the last element of the series
pub fn calculate_ema(values: &[f64], period: usize) -> Result<f64> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "EMA period must be at least 1".to_string(),
        ));
    }
    IndicatorError::require_bars(period, values.len())?;

    let multiplier = 2.0 / (period as f64 + 1.0);

    // Use SMA as initial seed
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;

    for value in &values[period..] {
        ema = (value - ema) * multiplier + ema;
    }

    Ok(ema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn test_ema_seed_only() {
        let prices = vec![1.0, 2.0, 3.0];
        // SMA of first 3 = (1+2+3)/3 = 2
        assert_eq!(calculate_ema(&prices, 3).unwrap(), 2.0);
    }

    #[test]
    fn test_ema_after_seed() {
        let prices = vec![2.0, 4.0, 6.0, 8.0];
        // seed = 4, multiplier = 0.5, EMA = (8 - 4) * 0.5 + 4 = 6
        assert_eq!(calculate_ema(&prices, 3).unwrap(), 6.0);
    }

    #[test]
    fn test_ema_trends_towards_price() {
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0, 15.0];
        let ema = calculate_ema(&prices, 3).unwrap();
        assert!(ema > 11.0 && ema < 15.0);
    }

    #[test]
    fn test_ema_insufficient_data() {
        let err = calculate_ema(&[1.0, 2.0], 3).unwrap_err();
        assert!(matches!(
            err,
            IndicatorError::InsufficientData {
                required: 3,
                actual: 2
            }
        ));
    }

    #[test]
    fn test_ema_zero_period() {
        assert!(matches!(
            calculate_ema(&[1.0], 0),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_ema_period_one_is_last_value() {
        assert_eq!(calculate_ema(&[3.0, 9.0, 4.5], 1).unwrap(), 4.5);
    }

    proptest! {
        #[test]
        fn prop_constant_series_yields_constant(
            price in 0.01f64..10_000.0,
            period in 1usize..50,
            extra in 0usize..50,
        ) {
            let series = vec![price; period + extra];
            let ema = calculate_ema(&series, period).unwrap();
            assert_abs_diff_eq!(ema, price, epsilon = 1e-6);
        }
    }
}
