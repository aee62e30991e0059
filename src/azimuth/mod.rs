//! Antenna pointing direction, either reported by the device or estimated
//! from the positions of its linked stations.

use crate::geo::{self, LatLon};

/// Where a radio's azimuth value came from, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AzimuthSource {
    /// Compass heading reported by the device itself.
    Sensor,
    /// Operator-supplied value from the site configuration.
    Override,
    /// Vector mean of bearings toward linked stations.
    Estimated,
    /// Nothing known, pointing north.
    Default,
}

impl AzimuthSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            AzimuthSource::Sensor => "sensor",
            AzimuthSource::Override => "override",
            AzimuthSource::Estimated => "estimated",
            AzimuthSource::Default => "default",
        }
    }
}

/// Mean bearing from `origin` toward `stations`, in degrees `[0, 360)`.
///
/// Bearings are averaged as vectors so that headings straddling north
/// (350 deg and 10 deg) combine to 0 deg rather than 180 deg. An empty
/// station list yields 0.0.
pub fn estimate_azimuth(origin: LatLon, stations: &[LatLon]) -> f64 {
    if stations.is_empty() {
        return 0.0;
    }
    let (sum_x, sum_y) = stations
        .iter()
        .map(|station| geo::bearing_components(origin, *station))
        .fold((0.0, 0.0), |(ax, ay), (x, y)| (ax + x, ay + y));
    geo::normalize_bearing(sum_x.atan2(sum_y).to_degrees())
}

/// Pick the radio's azimuth from the best available source.
///
/// Device heading wins over the configured override, which wins over the
/// station estimate; with no information at all the antenna is assumed to
/// face north.
pub fn resolve_azimuth(
    heading: Option<f64>,
    azimuth_override: Option<f64>,
    origin: LatLon,
    stations: &[LatLon],
) -> (f64, AzimuthSource) {
    if let Some(heading) = heading {
        return (geo::normalize_bearing(heading), AzimuthSource::Sensor);
    }
    if let Some(value) = azimuth_override {
        return (geo::normalize_bearing(value), AzimuthSource::Override);
    }
    if stations.is_empty() {
        (0.0, AzimuthSource::Default)
    } else {
        (estimate_azimuth(origin, stations), AzimuthSource::Estimated)
    }
}
