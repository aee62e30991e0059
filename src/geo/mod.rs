use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS: f64 = 6378137.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub latitude: f64,
    pub longitude: f64,
}

impl LatLon {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Wrap a bearing in degrees into [0, 360).
pub fn normalize_bearing(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// Great-circle distance in meters (haversine, spherical Earth).
pub fn haversine_distance(p1: LatLon, p2: LatLon) -> f64 {
    let lat1 = p1.latitude.to_radians();
    let lat2 = p2.latitude.to_radians();
    let dlat = (p2.latitude - p1.latitude).to_radians();
    let dlon = (p2.longitude - p1.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS * c
}

/// Unit-vector components (x east-ish, y north-ish) of the initial
/// great-circle bearing from `from` to `to`. Kept separate from
/// `initial_bearing` so callers can sum components for a circular mean
/// instead of averaging wrapped angles.
pub fn bearing_components(from: LatLon, to: LatLon) -> (f64, f64) {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlon = (to.longitude - from.longitude).to_radians();

    let x = dlon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    (x, y)
}

/// Initial great-circle bearing from `from` to `to`, degrees in [0, 360).
pub fn initial_bearing(from: LatLon, to: LatLon) -> f64 {
    let (x, y) = bearing_components(from, to);
    normalize_bearing(x.atan2(y).to_degrees())
}

/// Spherical direct problem: the point reached by travelling `distance_m`
/// along the surface from `origin` on the given initial bearing.
pub fn destination(origin: LatLon, bearing_deg: f64, distance_m: f64) -> LatLon {
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular = distance_m / EARTH_RADIUS;

    let lat2 = (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular.sin() * lat1.cos())
            .atan2(angular.cos() - lat1.sin() * lat2.sin());

    LatLon {
        latitude: lat2.to_degrees(),
        longitude: lon2.to_degrees(),
    }
}
