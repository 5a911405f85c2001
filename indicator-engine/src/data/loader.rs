use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use common::{Bar, Interval, ProviderError};
use tracing::debug;

use super::{filter_range, normalize_bars};
use crate::provider::BarProvider;

/// Load bars from CSV file
///
/// Expected columns: timestamp, open, high, low, close, volume, [adjusted_close].
/// Empty price or volume cells are read as zero.
pub fn load_csv(path: &Path) -> Result<Vec<Bar>, ProviderError> {
    let file = File::open(path).map_err(|e| {
        ProviderError::DataLoad(format!("{}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut bars = Vec::new();

    for result in csv_reader.records() {
        let record = result.map_err(|e| ProviderError::Csv(e.to_string()))?;

        if record.len() < 6 {
            continue;
        }

        let timestamp = parse_timestamp(&record[0])?;
        let open = parse_price(&record[1], "open")?;
        let high = parse_price(&record[2], "high")?;
        let low = parse_price(&record[3], "low")?;
        let close = parse_price(&record[4], "close")?;
        let volume = parse_volume(&record[5])?;

        let adjusted_close = record
            .get(6)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok());

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close,
        });
    }

    Ok(bars)
}

/// Load bars from JSON file
pub fn load_json(path: &Path) -> Result<Vec<Bar>, ProviderError> {
    let file = File::open(path).map_err(|e| {
        ProviderError::DataLoad(format!("{}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let bars: Vec<Bar> = serde_json::from_reader(reader)?;
    Ok(bars)
}

/// Load bars from file, detecting format from extension
pub fn load_file(path: &Path) -> Result<Vec<Bar>, ProviderError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        _ => Err(ProviderError::DataLoad(format!(
            "Unsupported file format: {}",
            ext
        ))),
    }
}

fn parse_price(s: &str, field: &str) -> Result<f64, ProviderError> {
    if s.is_empty() {
        return Ok(0.0);
    }
    s.parse()
        .map_err(|_| ProviderError::Csv(format!("Invalid {} price: {}", field, s)))
}

fn parse_volume(s: &str) -> Result<u64, ProviderError> {
    if s.is_empty() {
        return Ok(0);
    }
    // Some exports write volume as a float
    s.parse::<u64>()
        .or_else(|_| s.parse::<f64>().map(|v| v.max(0.0) as u64))
        .map_err(|_| ProviderError::Csv(format!("Invalid volume: {}", s)))
}

/// Parse timestamp from various formats
fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ProviderError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
    for fmt in &datetime_formats {
        if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&dt));
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in &date_formats {
        if let Ok(date) = chrono::NaiveDate::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
        }
    }

    // Unix timestamp (seconds)
    if let Ok(ts) = s.parse::<i64>() {
        if let Some(dt) = DateTime::from_timestamp(ts, 0) {
            return Ok(dt);
        }
    }

    Err(ProviderError::Csv(format!(
        "Unable to parse timestamp: {}",
        s
    )))
}

/// Serves bars from `<dir>/<SYMBOL>_<interval>.csv` or `.json`
#[derive(Debug, Clone)]
pub struct FileBarProvider {
    dir: PathBuf,
}

impl FileBarProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn locate(&self, symbol: &str, interval: Interval) -> Option<PathBuf> {
        let stem = format!("{}_{}", symbol.to_uppercase(), interval);
        ["csv", "json"]
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file())
    }
}

#[async_trait]
impl BarProvider for FileBarProvider {
    async fn fetch_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval: Interval,
    ) -> Result<Vec<Bar>, ProviderError> {
        let path = self
            .locate(symbol, interval)
            .ok_or_else(|| ProviderError::NotFound(format!("{} {}", symbol, interval)))?;
        debug!(path = %path.display(), "loading bars from file");

        let bars = tokio::task::spawn_blocking(move || load_file(&path))
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))??;

        Ok(filter_range(normalize_bars(bars), start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};
    use std::io::Write;

    #[test]
    fn test_parse_timestamp_iso() {
        let ts = parse_timestamp("2024-01-15T09:30:00Z").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 1);
        assert_eq!(ts.day(), 15);
    }

    #[test]
    fn test_parse_timestamp_common() {
        let ts = parse_timestamp("2024-01-15 09:30:00").unwrap();
        assert_eq!(ts.hour(), 9);
    }

    #[test]
    fn test_parse_timestamp_date_only() {
        let ts = parse_timestamp("2024-01-15").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_timestamp_unix() {
        let ts = parse_timestamp("1705312200").unwrap();
        assert!(ts.year() >= 2024);
    }

    #[test]
    fn test_empty_cells_become_zero() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume,adjusted_close").unwrap();
        writeln!(file, "2024-01-02,10,11,,10.5,,10.4").unwrap();
        writeln!(file, "2024-01-03,10.5,12,10,11.5,1200,").unwrap();

        let bars = load_file(file.path()).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].low, 0.0);
        assert_eq!(bars[0].volume, 0);
        assert_eq!(bars[0].adjusted_close, Some(10.4));
        assert_eq!(bars[1].adjusted_close, None);
        assert_eq!(bars[1].volume, 1200);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_file(Path::new("bars.parquet")).unwrap_err();
        assert!(matches!(err, ProviderError::DataLoad(_)));
    }

    #[tokio::test]
    async fn test_file_provider_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SPY_1d.csv");
        let mut file = File::create(&path).unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        writeln!(file, "2024-01-05,3,4,2,3,100").unwrap();
        writeln!(file, "2024-01-02,1,2,0.5,1,100").unwrap();
        writeln!(file, "2024-01-03,2,3,1,2,100").unwrap();
        writeln!(file, "2024-01-10,9,9,9,9,100").unwrap();

        let provider = FileBarProvider::new(dir.path());
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = provider
            .fetch_bars("spy", start, start + Duration::days(6), Interval::Day1)
            .await
            .unwrap();

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn test_file_provider_missing_symbol() {
        let dir = tempfile::tempdir().unwrap();
        let provider = FileBarProvider::new(dir.path());
        let now = Utc::now();
        let err = provider
            .fetch_bars("NOPE", now - Duration::days(1), now, Interval::Day1)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }
}
