use std::cmp::Ordering;

use common::{LevelKind, PivotPoint, Zone};

/// Zones kept after ranking
pub const MAX_ZONES: usize = 10;

const TOUCH_WEIGHT: f64 = 0.7;
const RECENCY_WEIGHT: f64 = 0.3;
/// Touch count at which the frequency term saturates
const TOUCH_SATURATION: f64 = 10.0;

/// Zone strength: touch frequency blended with recency of the latest touch
pub fn zone_strength(total_touches: u32, last_touch_index: usize, total_bars: usize) -> f64 {
    let frequency = (total_touches as f64 / TOUCH_SATURATION).min(1.0);
    let recency = if total_bars == 0 {
        0.0
    } else {
        last_touch_index as f64 / total_bars as f64
    };
    TOUCH_WEIGHT * frequency + RECENCY_WEIGHT * recency
}

fn within_tolerance(level: f64, price: f64, tolerance: f64) -> bool {
    if level == 0.0 {
        return price == 0.0;
    }
    ((level - price) / level).abs() <= tolerance
}

/// Ordered collection of zones, merged by linear scan.
///
/// A touch joins the first zone (in creation order) whose level lies within
/// `tolerance` of the touch price; otherwise it opens a new zone at its own price.
/// Zone levels never move once created.
#[derive(Debug, Clone)]
pub struct ZoneBook {
    zones: Vec<Zone>,
    tolerance: f64,
    total_bars: usize,
}

impl ZoneBook {
    pub fn new(tolerance: f64, total_bars: usize) -> Self {
        Self {
            zones: Vec::new(),
            tolerance,
            total_bars,
        }
    }

    pub fn add_touch(&mut self, pivot: &PivotPoint, kind: LevelKind) {
        let tolerance = self.tolerance;
        let idx = match self
            .zones
            .iter()
            .position(|z| within_tolerance(z.level, pivot.price, tolerance))
        {
            Some(idx) => idx,
            None => {
                self.zones.push(Zone {
                    level: pivot.price,
                    support_count: 0,
                    resistance_count: 0,
                    total_touches: 0,
                    strength: 0.0,
                    last_touch_index: pivot.index,
                });
                self.zones.len() - 1
            }
        };

        let zone = &mut self.zones[idx];
        zone.last_touch_index = zone.last_touch_index.max(pivot.index);
        match kind {
            LevelKind::Support => zone.support_count += 1,
            LevelKind::Resistance => zone.resistance_count += 1,
        }
        zone.total_touches = zone.support_count + zone.resistance_count;
        zone.strength = zone_strength(zone.total_touches, zone.last_touch_index, self.total_bars);
    }

    /// Zones by descending strength, at most `limit`. Equal strengths keep creation order.
    pub fn ranked(mut self, limit: usize) -> Vec<Zone> {
        self.zones
            .sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(Ordering::Equal));
        self.zones.truncate(limit);
        self.zones
    }
}

/// Cluster pivot highs (resistance touches) and pivot lows (support touches) into ranked zones.
///
/// Highs are fed before lows, each list in its own order.
pub fn cluster_zones(
    highs: &[PivotPoint],
    lows: &[PivotPoint],
    tolerance: f64,
    total_bars: usize,
) -> Vec<Zone> {
    let mut book = ZoneBook::new(tolerance, total_bars);
    for pivot in highs {
        book.add_touch(pivot, LevelKind::Resistance);
    }
    for pivot in lows {
        book.add_touch(pivot, LevelKind::Support);
    }
    book.ranked(MAX_ZONES)
}

/// Closest zone level at or below `price`, and closest at or above it
pub fn nearest_levels(zones: &[Zone], price: f64) -> (Option<f64>, Option<f64>) {
    let support = zones
        .iter()
        .map(|z| z.level)
        .filter(|level| *level <= price)
        .fold(None, |best: Option<f64>, level| {
            Some(best.map_or(level, |b| b.max(level)))
        });
    let resistance = zones
        .iter()
        .map(|z| z.level)
        .filter(|level| *level >= price)
        .fold(None, |best: Option<f64>, level| {
            Some(best.map_or(level, |b| b.min(level)))
        });
    (support, resistance)
}
