//! Structural price levels built from local extrema.
//!
//! The pivot detector feeds both the zone clustering and the trendline pairing.

pub mod pivots;
pub mod trendlines;
pub mod zones;

pub use pivots::detect_pivots;
pub use trendlines::{build_trendline, pair_trendlines, trendline_strength};
pub use zones::{cluster_zones, nearest_levels, zone_strength, ZoneBook, MAX_ZONES};
