//! Async entry points: fetch history once, compute, wrap the result.
//!
//! Each call validates its parameters, sizes the request with the lookback
//! heuristic, awaits the provider exactly once and then runs the pure algorithm
//! on the materialised bars. Nothing is cached between calls.

use chrono::{DateTime, Utc};
use common::{
    AtrResult, Bar, EmaResult, ExtremesResult, ExtremesWindow, IndicatorConfig, IndicatorError,
    Interval, LevelKind, MacdResult, PivotPointsResult, Result, RsiResult, SupportResistanceResult,
    TrendlineResult,
};
use tracing::{debug, info, warn};

use crate::data::{is_ascending, normalize_bars};
use crate::indicators::{
    calculate_atr, calculate_ema, calculate_macd, calculate_pivot_points, calculate_rsi_with_signal,
    closes, macd, scan_extremes,
};
use crate::levels::{cluster_zones, detect_pivots, nearest_levels, pair_trendlines};
use crate::lookback::{fetch_window, window_start};
use crate::provider::BarProvider;

const FIFTY_TWO_WEEK_DAYS: i64 = 365;

pub struct IndicatorService<P> {
    provider: P,
    config: IndicatorConfig,
    as_of: Option<DateTime<Utc>>,
}

impl<P: BarProvider> IndicatorService<P> {
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, IndicatorConfig::default())
    }

    pub fn with_config(provider: P, config: IndicatorConfig) -> Self {
        Self {
            provider,
            config,
            as_of: None,
        }
    }

    /// Pin the request end time instead of using the wall clock
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    fn now(&self) -> DateTime<Utc> {
        self.as_of.unwrap_or_else(Utc::now)
    }

    async fn fetch(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>> {
        debug!(%symbol, %interval, %start, %end, "fetching bars");
        let bars = self.provider.fetch_bars(symbol, start, end, interval).await?;
        debug!(%symbol, %interval, count = bars.len(), "bars received");

        if is_ascending(&bars) {
            return Ok(bars);
        }
        warn!(%symbol, %interval, "provider returned unordered bars, re-sorting");
        Ok(normalize_bars(bars))
    }

    async fn fetch_for(&self, symbol: &str, interval: Interval, bars_needed: usize) -> Result<Vec<Bar>> {
        let (start, end) = fetch_window(self.now(), interval, bars_needed, &self.config.lookback)?;
        self.fetch(symbol, start, end, interval).await
    }

    async fn fetch_days(&self, symbol: &str, interval: Interval, days: i64) -> Result<Vec<Bar>> {
        let end = self.now();
        let start = window_start(end, days)?;
        self.fetch(symbol, start, end, interval).await
    }

    pub async fn atr(&self, symbol: &str, interval: Interval, period: usize) -> Result<AtrResult> {
        require_period("ATR", period)?;
        let bars = self.fetch_for(symbol, interval, period + 1).await?;
        let value = calculate_atr(&bars, period)?;
        info!(%symbol, %interval, period, value, "ATR computed");

        Ok(AtrResult {
            symbol: symbol.to_string(),
            interval,
            period,
            value,
            computed_at: Utc::now(),
        })
    }

    pub async fn ema(&self, symbol: &str, interval: Interval, period: usize) -> Result<EmaResult> {
        let mut results = self.ema_multi(symbol, interval, &[period]).await?;
        results.pop().ok_or_else(|| {
            IndicatorError::NoData(format!("{} {}", symbol, interval))
        })
    }

    /// Several EMA periods from a single fetch sized for the longest one
    pub async fn ema_multi(
        &self,
        symbol: &str,
        interval: Interval,
        periods: &[usize],
    ) -> Result<Vec<EmaResult>> {
        if periods.is_empty() {
            return Err(IndicatorError::InvalidParameter(
                "at least one EMA period is required".to_string(),
            ));
        }
        for period in periods {
            require_period("EMA", *period)?;
        }
        let longest = periods.iter().copied().max().unwrap_or(1);

        let bars = self.fetch_for(symbol, interval, longest).await?;
        IndicatorError::require_bars(longest, bars.len())?;
        let series = closes(&bars);

        let computed_at = Utc::now();
        let results = periods
            .iter()
            .map(|&period| {
                Ok(EmaResult {
                    symbol: symbol.to_string(),
                    interval,
                    period,
                    value: calculate_ema(&series, period)?,
                    computed_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        info!(%symbol, %interval, periods = ?periods, "EMA computed");
        Ok(results)
    }

    pub async fn rsi(&self, symbol: &str, interval: Interval, period: usize) -> Result<RsiResult> {
        require_period("RSI", period)?;
        let bars = self.fetch_for(symbol, interval, period + 1).await?;
        let (value, signal) = calculate_rsi_with_signal(&closes(&bars), period)?;
        info!(%symbol, %interval, period, value, ?signal, "RSI computed");

        Ok(RsiResult {
            symbol: symbol.to_string(),
            interval,
            period,
            value,
            signal,
            computed_at: Utc::now(),
        })
    }

    pub async fn macd(
        &self,
        symbol: &str,
        interval: Interval,
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> Result<MacdResult> {
        macd::validate_periods(fast_period, slow_period, signal_period)?;
        let bars = self
            .fetch_for(symbol, interval, slow_period + signal_period)
            .await?;
        let values = calculate_macd(&closes(&bars), fast_period, slow_period, signal_period)?;
        info!(%symbol, %interval, macd = values.macd, signal = values.signal, "MACD computed");

        Ok(MacdResult {
            symbol: symbol.to_string(),
            interval,
            fast_period,
            slow_period,
            signal_period,
            macd: values.macd,
            signal: values.signal,
            histogram: values.histogram,
            computed_at: Utc::now(),
        })
    }

    pub async fn pivot_points(&self, symbol: &str, interval: Interval) -> Result<PivotPointsResult> {
        let bars = self.fetch_for(symbol, interval, 2).await?;
        let (levels, source) = calculate_pivot_points(&bars)?;
        info!(%symbol, %interval, pp = levels.pp, "pivot points computed");

        Ok(PivotPointsResult {
            symbol: symbol.to_string(),
            interval,
            levels,
            source_date: source.timestamp,
            computed_at: Utc::now(),
        })
    }

    pub async fn support_resistance(
        &self,
        symbol: &str,
        interval: Interval,
        lookback_days: i64,
        tolerance: f64,
    ) -> Result<SupportResistanceResult> {
        require_levels_interval("support/resistance", interval)?;
        require_lookback(lookback_days)?;
        if !(tolerance > 0.0 && tolerance < 1.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "tolerance must be in (0, 1), got {}",
                tolerance
            )));
        }

        let window = self.config.pivot_window;
        let bars = self.fetch_days(symbol, interval, lookback_days).await?;
        IndicatorError::require_bars(2 * window + 1, bars.len())?;

        let pivots = detect_pivots(&bars, window);
        let zones = cluster_zones(&pivots.highs, &pivots.lows, tolerance, bars.len());
        let current_price = bars.last().map(|b| b.close).unwrap_or_default();
        let (nearest_support, nearest_resistance) = nearest_levels(&zones, current_price);
        info!(
            %symbol,
            %interval,
            pivot_highs = pivots.highs.len(),
            pivot_lows = pivots.lows.len(),
            zones = zones.len(),
            "support/resistance computed"
        );

        Ok(SupportResistanceResult {
            symbol: symbol.to_string(),
            interval,
            zones,
            current_price,
            nearest_support,
            nearest_resistance,
            bars_analyzed: bars.len(),
            computed_at: Utc::now(),
        })
    }

    pub async fn trendlines(
        &self,
        symbol: &str,
        interval: Interval,
        lookback_days: i64,
        max_lines: usize,
    ) -> Result<TrendlineResult> {
        require_levels_interval("trendlines", interval)?;
        require_lookback(lookback_days)?;
        require_period("max trendlines", max_lines)?;

        let window = self.config.pivot_window;
        let bars = self.fetch_days(symbol, interval, lookback_days).await?;
        IndicatorError::require_bars(2 * window + 1, bars.len())?;

        let pivots = detect_pivots(&bars, window);
        let total = bars.len();
        let support = pair_trendlines(&pivots.lows, LevelKind::Support, total, max_lines);
        let resistance = pair_trendlines(&pivots.highs, LevelKind::Resistance, total, max_lines);
        info!(
            %symbol,
            %interval,
            support = support.len(),
            resistance = resistance.len(),
            "trendlines computed"
        );

        Ok(TrendlineResult {
            symbol: symbol.to_string(),
            interval,
            support,
            resistance,
            current_price: bars.last().map(|b| b.close).unwrap_or_default(),
            bars_analyzed: total,
            computed_at: Utc::now(),
        })
    }

    /// Highest high and lowest low over all available daily history
    pub async fn all_time_extremes(&self, symbol: &str) -> Result<ExtremesResult> {
        let end = self.now();
        let epoch = DateTime::from_timestamp(0, 0).unwrap_or(DateTime::<Utc>::MIN_UTC);
        let bars = self.fetch(symbol, epoch, end, Interval::Day1).await?;
        self.extremes(symbol, &bars, ExtremesWindow::AllTime)
    }

    /// Highest high and lowest low over the trailing 365 days
    pub async fn fifty_two_week_extremes(&self, symbol: &str) -> Result<ExtremesResult> {
        let bars = self
            .fetch_days(symbol, Interval::Day1, FIFTY_TWO_WEEK_DAYS)
            .await?;
        self.extremes(symbol, &bars, ExtremesWindow::FiftyTwoWeek)
    }

    fn extremes(&self, symbol: &str, bars: &[Bar], window: ExtremesWindow) -> Result<ExtremesResult> {
        if bars.is_empty() {
            return Err(IndicatorError::NoData(format!(
                "{} {}",
                symbol,
                Interval::Day1
            )));
        }
        let extremes = scan_extremes(bars)?;
        info!(%symbol, ?window, high = extremes.high, low = extremes.low, "extremes computed");

        Ok(ExtremesResult {
            symbol: symbol.to_string(),
            interval: Interval::Day1,
            window,
            extremes,
            computed_at: Utc::now(),
        })
    }
}

fn require_period(name: &str, period: usize) -> Result<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} period must be at least 1",
            name
        )));
    }
    Ok(())
}

fn require_lookback(days: i64) -> Result<()> {
    if days <= 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "lookback must be a positive number of days, got {}",
            days
        )));
    }
    Ok(())
}

/// Structural levels are only defined on daily and hourly bars
fn require_levels_interval(what: &str, interval: Interval) -> Result<()> {
    match interval {
        Interval::Day1 | Interval::Hour1 => Ok(()),
        other => Err(IndicatorError::InvalidParameter(format!(
            "{} supports only 1d and 1h intervals, got {}",
            what, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::generate_bars_ending;
    use crate::data::MemoryBarProvider;
    use chrono::TimeZone;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 0, 0, 0).unwrap()
    }

    fn service(bars: usize) -> IndicatorService<MemoryBarProvider> {
        let provider = MemoryBarProvider::new().with_series(
            "TEST",
            Interval::Day1,
            generate_bars_ending(bars, 100.0, 11, as_of(), Interval::Day1),
        );
        IndicatorService::new(provider).with_as_of(as_of())
    }

    #[tokio::test]
    async fn test_atr_result_carries_request() {
        let result = service(60).atr("TEST", Interval::Day1, 14).await.unwrap();
        assert_eq!(result.symbol, "TEST");
        assert_eq!(result.interval, Interval::Day1);
        assert_eq!(result.period, 14);
        assert!(result.value > 0.0);
    }

    #[tokio::test]
    async fn test_ema_multi_matches_single_calls() {
        let svc = service(120);
        let multi = svc.ema_multi("TEST", Interval::Day1, &[5, 20, 50]).await.unwrap();
        assert_eq!(multi.len(), 3);
        // The single call for the longest period requests the same window
        let single = svc.ema("TEST", Interval::Day1, 50).await.unwrap();
        assert_eq!(multi[2].value, single.value);
    }

    #[tokio::test]
    async fn test_zero_period_rejected_before_fetch() {
        // No series registered: a fetch would fail with NotFound
        let svc = IndicatorService::new(MemoryBarProvider::new());
        let err = svc.rsi("NONE", Interval::Day1, 0).await.unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_levels_reject_weekly_interval() {
        let svc = service(200);
        let err = svc
            .support_resistance("TEST", Interval::Week1, 180, 0.005)
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));

        let err = svc
            .trendlines("TEST", Interval::Minute5, 180, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_macd_rejects_inverted_periods() {
        let err = service(100)
            .macd("TEST", Interval::Day1, 26, 12, 9)
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_windows_are_rejected() {
        let svc = service(60);
        let err = svc
            .support_resistance("TEST", Interval::Day1, 1_000_000_000, 0.005)
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));

        let err = svc
            .trendlines("TEST", Interval::Day1, i64::MAX, 5)
            .await
            .unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));

        let err = svc.atr("TEST", Interval::Month1, 5_000_000).await.unwrap_err();
        assert!(matches!(err, IndicatorError::InvalidParameter(_)));
    }

    #[test]
    fn test_require_levels_interval() {
        assert!(require_levels_interval("x", Interval::Day1).is_ok());
        assert!(require_levels_interval("x", Interval::Hour1).is_ok());
        assert!(require_levels_interval("x", Interval::Month1).is_err());
    }
}
