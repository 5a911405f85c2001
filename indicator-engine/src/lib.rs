pub mod data;
pub mod indicators;
pub mod levels;
pub mod lookback;
pub mod provider;
pub mod service;

pub use data::{FileBarProvider, MemoryBarProvider};
pub use provider::BarProvider;
pub use service::IndicatorService;

// Re-export common types
pub use common::{
    AtrResult, Bar, EmaResult, Extremes, ExtremesResult, ExtremesWindow, IndicatorConfig,
    IndicatorError, Interval, LevelKind, LookbackConfig, MacdResult, MacdValues, PivotLevels,
    PivotPoint, PivotPointsResult, PivotSet, ProviderError, Result, RsiResult, RsiSignal,
    SupportResistanceResult, Trendline, TrendlineResult, Zone,
};
