pub mod config;
pub mod error;
pub mod types;

pub use config::{
    IndicatorConfig, LookbackConfig, DEFAULT_MACD_PERIODS, DEFAULT_MAX_TRENDLINES,
    DEFAULT_PIVOT_WINDOW, DEFAULT_ZONE_TOLERANCE,
};
pub use error::{IndicatorError, ProviderError, Result};
pub use types::*;
