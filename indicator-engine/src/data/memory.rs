use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{Bar, Interval, ProviderError};

use super::{filter_range, normalize_bars};
use crate::provider::BarProvider;

/// In-memory series keyed by symbol and interval
#[derive(Debug, Clone, Default)]
pub struct MemoryBarProvider {
    series: HashMap<(String, Interval), Vec<Bar>>,
}

impl MemoryBarProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, symbol: &str, interval: Interval, bars: Vec<Bar>) -> Self {
        self.insert(symbol, interval, bars);
        self
    }

    pub fn insert(&mut self, symbol: &str, interval: Interval, bars: Vec<Bar>) {
        self.series
            .insert((symbol.to_uppercase(), interval), normalize_bars(bars));
    }
}

#[async_trait]
impl BarProvider for MemoryBarProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError> {
        let bars = self
            .series
            .get(&(symbol.to_uppercase(), interval))
            .ok_or_else(|| ProviderError::NotFound(format!("{} {}", symbol, interval)))?;
        Ok(filter_range(bars.clone(), start, end))
    }
}
