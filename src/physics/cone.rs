//! Coverage cone polygons.
//!
//! The footprint of a sector antenna is approximated as a fan: the site,
//! then an arc of geodesically projected points spanning the horizontal
//! beamwidth around the azimuth. The arc radius is where the downtilted
//! beam meets the ground, capped at the model's effective range.

use crate::geo::{self, LatLon};

/// Arc segments in the cone boundary; the boundary has one more point.
pub const CONE_ARC_STEPS: usize = 36;

/// Beamwidth 0 (unreported) and 360 both mean omnidirectional.
pub fn is_omni(beamwidth_deg: f64) -> bool {
    beamwidth_deg == 0.0 || beamwidth_deg == 360.0
}

/// Ground distance at which the tilted beam intersects level ground. A beam
/// that never descends (downtilt <= 0) is capped at `max_distance_m`.
pub fn ground_distance(antenna_height_m: f64, downtilt_deg: f64, max_distance_m: f64) -> f64 {
    if downtilt_deg <= 0.0 {
        max_distance_m
    } else {
        antenna_height_m / downtilt_deg.to_radians().tan()
    }
}

/// Coverage polygon vertices, in latitude/longitude.
///
/// Directional antennas get the site prepended so the polygon closes into a
/// wedge; omnidirectional ones sweep a full circle and omit it. The arc runs
/// from the start edge (azimuth − beamwidth/2) to the end edge.
pub fn coverage_cone(
    center: LatLon,
    azimuth_deg: f64,
    downtilt_deg: f64,
    beamwidth_deg: f64,
    antenna_height_m: f64,
    max_distance_m: f64,
) -> Vec<LatLon> {
    let radius =
        ground_distance(antenna_height_m, downtilt_deg, max_distance_m).min(max_distance_m);
    let omni = is_omni(beamwidth_deg);
    let sweep = if omni { 360.0 } else { beamwidth_deg };

    let mut points = Vec::with_capacity(CONE_ARC_STEPS + 2);
    if !omni {
        points.push(center);
    }
    for i in 0..=CONE_ARC_STEPS {
        let bearing =
            azimuth_deg - sweep / 2.0 + sweep * (i as f64) / (CONE_ARC_STEPS as f64);
        points.push(geo::destination(center, bearing, radius));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{haversine_distance, initial_bearing};

    const CENTER: LatLon = LatLon {
        latitude: 46.5,
        longitude: 6.6,
    };

    #[test]
    fn directional_cone_is_origin_plus_arc() {
        let points = coverage_cone(CENTER, 90.0, 0.0, 60.0, 30.0, 5000.0);
        assert_eq!(points.len(), CONE_ARC_STEPS + 2);
        assert_eq!(points[0], CENTER);
    }

    #[test]
    fn arc_spans_the_beamwidth_around_the_azimuth() {
        let points = coverage_cone(CENTER, 90.0, 0.0, 60.0, 30.0, 5000.0);
        let first = initial_bearing(CENTER, points[1]);
        let last = initial_bearing(CENTER, points[points.len() - 1]);
        assert!((first - 60.0).abs() < 0.5, "start edge at {first}");
        assert!((last - 120.0).abs() < 0.5, "end edge at {last}");
    }

    #[test]
    fn level_beam_reaches_full_range() {
        let points = coverage_cone(CENTER, 0.0, 0.0, 60.0, 30.0, 5000.0);
        for p in &points[1..] {
            let d = haversine_distance(CENTER, *p);
            assert!((d - 5000.0).abs() < 1.0, "boundary at {d} m");
        }
    }

    #[test]
    fn downtilt_shrinks_the_radius_to_the_ground_intersection() {
        let expected = 30.0 / 5.0_f64.to_radians().tan();
        let points = coverage_cone(CENTER, 0.0, 5.0, 60.0, 30.0, 5000.0);
        let d = haversine_distance(CENTER, points[1]);
        assert!((d - expected).abs() < 1.0, "boundary at {d} m, wanted {expected}");
    }

    #[test]
    fn shallow_downtilt_is_capped_at_max_distance() {
        // 30 m / tan(0.1 deg) is ~17 km, well past the 5 km cap.
        let points = coverage_cone(CENTER, 0.0, 0.1, 60.0, 30.0, 5000.0);
        let d = haversine_distance(CENTER, points[1]);
        assert!((d - 5000.0).abs() < 1.0);
    }

    #[test]
    fn omni_sweeps_a_closed_circle_without_the_origin() {
        for beamwidth in [0.0, 360.0] {
            let points = coverage_cone(CENTER, 45.0, 0.0, beamwidth, 30.0, 2000.0);
            assert_eq!(points.len(), CONE_ARC_STEPS + 1);
            // No origin vertex.
            assert!(points.iter().all(|p| haversine_distance(CENTER, *p) > 1.0));
            // First and last land on the same spot.
            let gap = haversine_distance(points[0], points[points.len() - 1]);
            assert!(gap < 1.0, "circle gap {gap} m");
        }
    }
}
