use std::f64::consts::PI;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{Bar, Interval};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Seeded random walk of `count` bars spaced by `interval`, the last one stamped `end`
pub fn generate_bars_ending(
    count: usize,
    initial_price: f64,
    seed: u64,
    end: DateTime<Utc>,
    interval: Interval,
) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(count);
    let step = Duration::minutes(interval.minutes() as i64);

    let mut price = initial_price;
    let daily_volatility = 0.02;
    let drift = 0.0002;

    for i in 0..count {
        let timestamp = end - step * (count - 1 - i) as i32;

        let random_return: f64 = rng.gen_range(-1.0..1.0);
        let new_price = (price * (1.0 + drift + daily_volatility * random_return)).max(0.01);

        let intraday_range = price * rng.gen_range(0.005..0.03);
        let open = price + rng.gen_range(-intraday_range / 2.0..intraday_range / 2.0);
        let close = new_price;
        let high = open.max(close) + rng.gen_range(0.0..intraday_range / 2.0);
        let low = (open.min(close) - rng.gen_range(0.0..intraday_range / 2.0)).max(0.0);

        let volume_multiplier = 1.0 + random_return.abs();
        let volume = (1_000_000.0 * volume_multiplier * rng.gen_range(0.8..1.2)) as u64;

        bars.push(Bar {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
            adjusted_close: Some(close),
        });

        price = new_price;
    }

    bars
}

/// Seeded daily random walk starting 2024-01-01
pub fn generate_synthetic_bars(days: usize, initial_price: f64, seed: u64) -> Vec<Bar> {
    let end = anchor() + Duration::days(days.saturating_sub(1) as i64);
    generate_bars_ending(days, initial_price, seed, end, Interval::Day1)
}

/// Deterministic sine-wave daily bars, useful for exercising pivot detection.
///
/// `wavelength` is the number of bars from one peak to the next.
pub fn generate_swing_bars(days: usize, center: f64, amplitude: f64, wavelength: usize) -> Vec<Bar> {
    let spread = amplitude * 0.05;
    let wave = |i: usize| center + amplitude * (2.0 * PI * i as f64 / wavelength.max(1) as f64).sin();

    (0..days)
        .map(|i| {
            let mid = wave(i);
            let high = mid + spread;
            let low = mid - spread;
            let open = if i == 0 { mid } else { wave(i - 1).clamp(low, high) };
            Bar {
                timestamp: anchor() + Duration::days(i as i64),
                open,
                high,
                low,
                close: mid,
                volume: 500_000,
                adjusted_close: None,
            }
        })
        .collect()
}

/// Daily bars from explicit high/low/close columns; open is the previous close
pub fn bars_from_hlc(highs: &[f64], lows: &[f64], closes: &[f64]) -> Vec<Bar> {
    highs
        .iter()
        .zip(lows)
        .zip(closes)
        .enumerate()
        .map(|(i, ((&high, &low), &close))| Bar {
            timestamp: anchor() + Duration::days(i as i64),
            open: if i == 0 { close } else { closes[i - 1] },
            high,
            low,
            close,
            volume: 1_000,
            adjusted_close: None,
        })
        .collect()
}
