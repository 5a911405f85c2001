//! Source of bar history for the indicator service.
//!
//! Implementations fetch bars for a symbol and interval within a date range and
//! hand them back in ascending timestamp order, with missing OHLCV fields already
//! set to zero. Failures are reported as [`ProviderError`] and reach the caller
//! untouched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Bar, Interval, ProviderError};

#[async_trait]
pub trait BarProvider: Send + Sync {
    async fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError>;
}

#[async_trait]
impl<P: BarProvider + ?Sized> BarProvider for Arc<P> {
    async fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError> {
        (**self).fetch_bars(symbol, start, end, interval).await
    }
}

#[async_trait]
impl<P: BarProvider + ?Sized> BarProvider for Box<P> {
    async fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError> {
        (**self).fetch_bars(symbol, start, end, interval).await
    }
}
