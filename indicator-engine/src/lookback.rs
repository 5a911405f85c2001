use chrono::{DateTime, Duration, Utc};
use common::{IndicatorError, Interval, LookbackConfig, Result};

/// Regular session length used to convert intraday bar counts into days
const SESSION_MINUTES: f64 = 390.0;
/// Hourly bars in one regular session (the last one is partial)
const HOURLY_BARS_PER_SESSION: f64 = 7.0;

/// Calendar days of history to request so that `bars_needed` bars come back.
///
/// The safety multiplier absorbs weekends, holidays and short sessions.
/// Sub-hour intervals are capped, since providers keep only recent intraday history.
pub fn lookback_days(interval: Interval, bars_needed: usize, cfg: &LookbackConfig) -> i64 {
    let padded = bars_needed as f64 * cfg.safety_multiplier;

    let days = match interval {
        Interval::Minute1 | Interval::Minute5 | Interval::Minute15 | Interval::Minute30 => {
            let per_session = SESSION_MINUTES / interval.minutes() as f64;
            let days = ((padded / per_session).ceil() as i64).saturating_add(1);
            days.min(cfg.intraday_cap_days)
        }
        Interval::Hour1 => ((padded / HOURLY_BARS_PER_SESSION).ceil() as i64).saturating_add(2),
        Interval::Day1 => padded.ceil() as i64,
        Interval::Week1 => (padded.ceil() as i64).saturating_mul(7),
        Interval::Month1 => (padded.ceil() as i64).saturating_mul(31),
    };

    days.max(cfg.min_days)
}

/// `end` moved back by `days` calendar days.
///
/// Fails with `InvalidParameter` when the start would fall outside the representable date range.
pub fn window_start(end: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    Duration::try_days(days)
        .and_then(|span| end.checked_sub_signed(span))
        .ok_or_else(|| {
            IndicatorError::InvalidParameter(format!(
                "lookback of {} days reaches outside the supported date range",
                days
            ))
        })
}

/// `(start, end)` range to hand the provider for a request ending at `as_of`
pub fn fetch_window(
    as_of: DateTime<Utc>,
    interval: Interval,
    bars_needed: usize,
    cfg: &LookbackConfig,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let days = lookback_days(interval, bars_needed, cfg);
    Ok((window_start(as_of, days)?, as_of))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_daily_doubles_bar_count() {
        let cfg = LookbackConfig::default();
        assert_eq!(lookback_days(Interval::Day1, 15, &cfg), 30);
        assert_eq!(lookback_days(Interval::Day1, 35, &cfg), 70);
    }

    #[test]
    fn test_intraday_is_capped() {
        let cfg = LookbackConfig::default();
        assert_eq!(lookback_days(Interval::Minute1, 5000, &cfg), 7);
        assert_eq!(lookback_days(Interval::Minute30, 500, &cfg), 7);
    }

    #[test]
    fn test_small_intraday_request_hits_floor() {
        let cfg = LookbackConfig::default();
        // 15 one-minute bars fit in a single session
        assert_eq!(lookback_days(Interval::Minute1, 15, &cfg), cfg.min_days);
    }

    #[test]
    fn test_cap_below_floor_uses_floor() {
        let cfg = LookbackConfig {
            intraday_cap_days: 2,
            min_days: 3,
            ..Default::default()
        };
        assert_eq!(lookback_days(Interval::Minute5, 10_000, &cfg), 3);
    }

    #[test]
    fn test_hourly() {
        let cfg = LookbackConfig::default();
        // 15 bars * 2 / 7 = 4.29 -> 5, plus 2
        assert_eq!(lookback_days(Interval::Hour1, 15, &cfg), 7);
    }

    #[test]
    fn test_weekly_and_monthly_scale_by_calendar() {
        let cfg = LookbackConfig::default();
        assert_eq!(lookback_days(Interval::Week1, 10, &cfg), 140);
        assert_eq!(lookback_days(Interval::Month1, 10, &cfg), 620);
    }

    #[test]
    fn test_window_ends_at_as_of() {
        let as_of = Utc::now();
        let (start, end) =
            fetch_window(as_of, Interval::Day1, 15, &LookbackConfig::default()).unwrap();
        assert_eq!(end, as_of);
        assert_eq!(end - start, Duration::days(30));
    }

    #[test]
    fn test_huge_requests_saturate() {
        let cfg = LookbackConfig::default();
        assert_eq!(lookback_days(Interval::Month1, usize::MAX, &cfg), i64::MAX);
        assert_eq!(lookback_days(Interval::Hour1, usize::MAX, &cfg), i64::MAX);
        assert_eq!(lookback_days(Interval::Minute1, usize::MAX, &cfg), 7);
    }

    #[test]
    fn test_window_past_calendar_is_rejected() {
        let as_of = Utc::now();
        let err = fetch_window(as_of, Interval::Month1, 5_000_000, &LookbackConfig::default())
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));

        assert!(window_start(as_of, 1_000_000_000).is_err());
        assert!(window_start(as_of, i64::MAX).is_err());
        assert_eq!(window_start(as_of, 0).unwrap(), as_of);
    }
}
