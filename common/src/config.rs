use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{IndicatorError, Result};

/// Fast, slow and signal periods of the classic MACD
pub const DEFAULT_MACD_PERIODS: (usize, usize, usize) = (12, 26, 9);
/// Bars on each side a pivot must dominate
pub const DEFAULT_PIVOT_WINDOW: usize = 5;
/// Relative distance within which a touch joins an existing zone
pub const DEFAULT_ZONE_TOLERANCE: f64 = 0.005;
pub const DEFAULT_MAX_TRENDLINES: usize = 5;

/// How much calendar history to request per indicator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookbackConfig {
    /// Extra history over the bare bar count (weekends, holidays, short sessions)
    pub safety_multiplier: f64,
    /// Upper bound on the window for sub-hour intervals
    pub intraday_cap_days: i64,
    /// Floor on every window
    pub min_days: i64,
}

impl Default for LookbackConfig {
    fn default() -> Self {
        Self {
            safety_multiplier: 2.0,
            intraday_cap_days: 7,
            min_days: 5,
        }
    }
}

/// Default parameters for the indicator service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub atr_period: usize,
    pub rsi_period: usize,
    pub ema_period: usize,
    // MACD
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    // Structural levels
    pub pivot_window: usize,
    pub zone_tolerance: f64,
    pub max_trendlines: usize,
    pub levels_lookback_days: i64,
    pub lookback: LookbackConfig,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            rsi_period: 14,
            ema_period: 20,
            macd_fast: DEFAULT_MACD_PERIODS.0,
            macd_slow: DEFAULT_MACD_PERIODS.1,
            macd_signal: DEFAULT_MACD_PERIODS.2,
            pivot_window: DEFAULT_PIVOT_WINDOW,
            zone_tolerance: DEFAULT_ZONE_TOLERANCE,
            max_trendlines: DEFAULT_MAX_TRENDLINES,
            levels_lookback_days: 180,
            lookback: LookbackConfig::default(),
        }
    }
}

impl IndicatorConfig {
    /// Load from a TOML file; omitted keys keep their defaults
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            IndicatorError::InvalidParameter(format!(
                "cannot read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)
            .map_err(|e| IndicatorError::InvalidParameter(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let periods = [
            ("atr_period", self.atr_period),
            ("rsi_period", self.rsi_period),
            ("ema_period", self.ema_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("pivot_window", self.pivot_window),
            ("max_trendlines", self.max_trendlines),
        ];
        if let Some((name, _)) = periods.iter().find(|(_, v)| *v == 0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "{} must be at least 1",
                name
            )));
        }
        if self.macd_fast >= self.macd_slow {
            return Err(IndicatorError::InvalidParameter(format!(
                "macd_fast ({}) must be less than macd_slow ({})",
                self.macd_fast, self.macd_slow
            )));
        }
        if !(self.zone_tolerance > 0.0 && self.zone_tolerance < 1.0) {
            return Err(IndicatorError::InvalidParameter(format!(
                "zone_tolerance must be in (0, 1), got {}",
                self.zone_tolerance
            )));
        }
        if self.levels_lookback_days <= 0 {
            return Err(IndicatorError::InvalidParameter(
                "levels_lookback_days must be positive".to_string(),
            ));
        }
        if self.lookback.safety_multiplier < 1.0 || self.lookback.intraday_cap_days <= 0 {
            return Err(IndicatorError::InvalidParameter(
                "lookback safety_multiplier must be >= 1 and intraday_cap_days positive"
                    .to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_macd(mut self, fast: usize, slow: usize, signal: usize) -> Self {
        self.macd_fast = fast;
        self.macd_slow = slow;
        self.macd_signal = signal;
        self
    }

    pub fn with_zone_tolerance(mut self, tolerance: f64) -> Self {
        self.zone_tolerance = tolerance;
        self
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_is_valid() {
        assert!(IndicatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_defaults_come_from_shared_constants() {
        let config = IndicatorConfig::default();
        assert_eq!(
            (config.macd_fast, config.macd_slow, config.macd_signal),
            DEFAULT_MACD_PERIODS
        );
        assert_eq!(config.pivot_window, DEFAULT_PIVOT_WINDOW);
        assert_eq!(config.zone_tolerance, DEFAULT_ZONE_TOLERANCE);
        assert_eq!(config.max_trendlines, DEFAULT_MAX_TRENDLINES);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = IndicatorConfig::from_toml_str(
            r#"
            rsi_period = 7
            zone_tolerance = 0.01

            [lookback]
            intraday_cap_days = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.rsi_period, 7);
        assert_eq!(config.zone_tolerance, 0.01);
        assert_eq!(config.atr_period, 14);
        assert_eq!(config.lookback.intraday_cap_days, 3);
        assert_eq!(config.lookback.safety_multiplier, 2.0);
    }

    #[test]
    fn test_rejects_inverted_macd() {
        let config = IndicatorConfig::default().with_macd(26, 12, 9);
        assert!(matches!(
            config.validate(),
            Err(IndicatorError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_zero_period() {
        let err = IndicatorConfig::from_toml_str("atr_period = 0").unwrap_err();
        assert!(err.to_string().contains("atr_period"));
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        let config = IndicatorConfig::default().with_zone_tolerance(1.5);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_trendlines = 3").unwrap();
        let config = IndicatorConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.max_trendlines, 3);
    }
}
