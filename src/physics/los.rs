//! Line-of-sight along a downtilted beam.
//!
//! The beam is modeled as a straight ray leaving the antenna at
//! `antenna_height_m` and descending linearly with ground distance. A sample
//! is obstructed when the terrain there rises above the beam plus the
//! receiver's own mast height.

/// Beam height above the site's ground level at `distance_m` out.
pub fn signal_height(antenna_height_m: f64, downtilt_deg: f64, distance_m: f64) -> f64 {
    antenna_height_m - distance_m * downtilt_deg.to_radians().tan()
}

/// Strict comparison: terrain exactly at the receiver height still sees the
/// beam.
pub fn is_obstructed(terrain_m: f64, signal_m: f64, receiver_height_m: f64) -> bool {
    terrain_m > signal_m + receiver_height_m
}
