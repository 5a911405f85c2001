use std::cmp::Ordering;

use common::{LevelKind, PivotPoint, Trendline};

const SPAN_WEIGHT: f64 = 0.4;
const MAGNITUDE_WEIGHT: f64 = 0.3;
const RECENCY_WEIGHT: f64 = 0.3;

/// Strength of a line between two pivots.
///
/// Rewards lines spanning a large share of the window (saturating at half of it),
/// lines with a large relative price move, and lines whose second point is recent.
pub fn trendline_strength(p1: &PivotPoint, p2: &PivotPoint, total_bars: usize) -> f64 {
    if total_bars == 0 {
        return 0.0;
    }
    let bars = total_bars as f64;
    let time_span = (p2.index - p1.index) as f64;
    let price_span = (p2.price - p1.price).abs();
    let avg_price = (p1.price + p2.price) / 2.0;

    let span = (time_span / (0.5 * bars)).min(1.0);
    let magnitude = if avg_price == 0.0 {
        0.0
    } else {
        (price_span / avg_price * 10.0).min(1.0)
    };
    let recency = p2.index as f64 / bars;

    SPAN_WEIGHT * span + MAGNITUDE_WEIGHT * magnitude + RECENCY_WEIGHT * recency
}

/// Line through two pivots with `p1.index < p2.index`
pub fn build_trendline(
    kind: LevelKind,
    p1: &PivotPoint,
    p2: &PivotPoint,
    total_bars: usize,
) -> Trendline {
    let slope = (p2.price - p1.price) / (p2.index - p1.index) as f64;
    let intercept = p1.price - slope * p1.index as f64;

    Trendline {
        kind,
        point1: p1.clone(),
        point2: p2.clone(),
        slope,
        intercept,
        strength: trendline_strength(p1, p2, total_bars),
    }
}

/// Every pair of same-type pivots becomes one candidate line; the strongest `max_lines` survive.
///
/// Pairing is quadratic in the number of pivots, which the bounded detector window keeps small.
/// Pivots must be in ascending index order, as the detector emits them.
pub fn pair_trendlines(
    pivots: &[PivotPoint],
    kind: LevelKind,
    total_bars: usize,
    max_lines: usize,
) -> Vec<Trendline> {
    let mut lines = Vec::with_capacity(pivots.len() * pivots.len().saturating_sub(1) / 2);

    for (i, p1) in pivots.iter().enumerate() {
        for p2 in &pivots[i + 1..] {
            if p2.index <= p1.index {
                continue;
            }
            lines.push(build_trendline(kind, p1, p2, total_bars));
        }
    }

    lines.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(Ordering::Equal));
    lines.truncate(max_lines);
    lines
}
