use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::IndicatorError;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjusted_close: Option<f64>,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close: None,
        }
    }

    /// High minus low for this bar alone
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// Bar interval accepted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "1d")]
    Day1,
    #[serde(rename = "1wk")]
    Week1,
    #[serde(rename = "1mo")]
    Month1,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Minute1 => "1m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Day1 => "1d",
            Interval::Week1 => "1wk",
            Interval::Month1 => "1mo",
        }
    }

    /// Approximate bar length in minutes (trading-session agnostic)
    pub fn minutes(&self) -> u32 {
        match self {
            Interval::Minute1 => 1,
            Interval::Minute5 => 5,
            Interval::Minute15 => 15,
            Interval::Minute30 => 30,
            Interval::Hour1 => 60,
            Interval::Day1 => 60 * 24,
            Interval::Week1 => 60 * 24 * 7,
            Interval::Month1 => 60 * 24 * 31,
        }
    }

    /// Sub-hour intervals
    pub fn is_intraday(&self) -> bool {
        self.minutes() < 60
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = IndicatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" => Ok(Interval::Minute1),
            "5m" => Ok(Interval::Minute5),
            "15m" => Ok(Interval::Minute15),
            "30m" => Ok(Interval::Minute30),
            "1h" | "60m" => Ok(Interval::Hour1),
            "1d" => Ok(Interval::Day1),
            "1wk" => Ok(Interval::Week1),
            "1mo" => Ok(Interval::Month1),
            other => Err(IndicatorError::InvalidParameter(format!(
                "unsupported interval: {}",
                other
            ))),
        }
    }
}

/// RSI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RsiSignal {
    Overbought,
    Oversold,
    Neutral,
}

impl RsiSignal {
    pub const OVERBOUGHT: f64 = 70.0;
    pub const OVERSOLD: f64 = 30.0;

    pub fn classify(rsi: f64) -> Self {
        if rsi >= Self::OVERBOUGHT {
            RsiSignal::Overbought
        } else if rsi <= Self::OVERSOLD {
            RsiSignal::Oversold
        } else {
            RsiSignal::Neutral
        }
    }
}

/// Which side of price a level or line sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelKind {
    Support,
    Resistance,
}

/// Local price extremum found by the pivot detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotPoint {
    pub index: usize,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    pub highs: Vec<PivotPoint>,
    pub lows: Vec<PivotPoint>,
}

/// Clustered price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub level: f64,
    pub support_count: u32,
    pub resistance_count: u32,
    pub total_touches: u32,
    pub strength: f64,
    /// Largest bar index among the touches merged into this zone
    pub last_touch_index: usize,
}

/// Line through exactly two same-type pivots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    pub kind: LevelKind,
    pub point1: PivotPoint,
    pub point2: PivotPoint,
    pub slope: f64,
    pub intercept: f64,
    pub strength: f64,
}

impl Trendline {
    /// Project the line to a bar index
    pub fn price_at(&self, index: usize) -> f64 {
        self.slope * index as f64 + self.intercept
    }
}

/// Floor-trader pivot levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotLevels {
    pub pp: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValues {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

/// Highest high and lowest low with the date each was first reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extremes {
    pub high: f64,
    pub high_date: DateTime<Utc>,
    pub low: f64,
    pub low_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtremesWindow {
    AllTime,
    FiftyTwoWeek,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AtrResult {
    pub symbol: String,
    pub interval: Interval,
    pub period: usize,
    pub value: f64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmaResult {
    pub symbol: String,
    pub interval: Interval,
    pub period: usize,
    pub value: f64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RsiResult {
    pub symbol: String,
    pub interval: Interval,
    pub period: usize,
    pub value: f64,
    pub signal: RsiSignal,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdResult {
    pub symbol: String,
    pub interval: Interval,
    pub fast_period: usize,
    pub slow_period: usize,
    pub signal_period: usize,
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotPointsResult {
    pub symbol: String,
    pub interval: Interval,
    pub levels: PivotLevels,
    /// Timestamp of the completed bar the levels come from
    pub source_date: DateTime<Utc>,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportResistanceResult {
    pub symbol: String,
    pub interval: Interval,
    pub zones: Vec<Zone>,
    pub current_price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_support: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_resistance: Option<f64>,
    pub bars_analyzed: usize,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendlineResult {
    pub symbol: String,
    pub interval: Interval,
    pub support: Vec<Trendline>,
    pub resistance: Vec<Trendline>,
    pub current_price: f64,
    pub bars_analyzed: usize,
    pub computed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtremesResult {
    pub symbol: String,
    pub interval: Interval,
    pub window: ExtremesWindow,
    pub extremes: Extremes,
    pub computed_at: DateTime<Utc>,
}
