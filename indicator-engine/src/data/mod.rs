pub mod loader;
pub mod memory;
pub mod synthetic;

pub use loader::{load_csv, load_file, load_json, FileBarProvider};
pub use memory::MemoryBarProvider;
pub use synthetic::{generate_swing_bars, generate_synthetic_bars};

use chrono::{DateTime, Utc};
use common::Bar;

/// Sort ascending by timestamp, keeping the last bar seen for a repeated timestamp
pub fn normalize_bars(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.sort_by_key(|b| b.timestamp);
    let mut out: Vec<Bar> = Vec::with_capacity(bars.len());
    for bar in bars {
        match out.last_mut() {
            Some(last) if last.timestamp == bar.timestamp => *last = bar,
            _ => out.push(bar),
        }
    }
    out
}

/// Strictly increasing timestamps
pub fn is_ascending(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].timestamp < w[1].timestamp)
}

/// Bars with `start <= timestamp <= end`
pub fn filter_range(bars: Vec<Bar>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Bar> {
    bars.into_iter()
        .filter(|b| b.timestamp >= start && b.timestamp <= end)
        .collect()
}
