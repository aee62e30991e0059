//! GeoJSON hand-off for the rendering collaborator.
//!
//! Coordinates follow the GeoJSON convention, `[longitude, latitude]`. Each
//! radio contributes its coverage polygon and a device marker, plus the
//! viewshed points when the report carries them.

use serde_json::{json, Value};

use crate::coverage::CoverageReport;
use crate::geo::LatLon;
use crate::io::Radio;
use crate::spectrum;

/// Closed linear ring in GeoJSON order.
fn ring(points: &[LatLon]) -> Vec<Value> {
    let mut coordinates: Vec<Value> = points
        .iter()
        .map(|p| json!([p.longitude, p.latitude]))
        .collect();
    if points.len() > 1 && points.first() != points.last() {
        let first = points[0];
        coordinates.push(json!([first.longitude, first.latitude]));
    }
    coordinates
}

fn jet_hex(t: f64) -> String {
    let r = (1.5 - (4.0 * t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (4.0 * t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (4.0 * t - 1.0).abs()).clamp(0.0, 1.0);
    format!(
        "#{:02x}{:02x}{:02x}",
        (r * 255.0).round() as u8,
        (g * 255.0).round() as u8,
        (b * 255.0).round() as u8
    )
}

/// Fill color for a frequency: a jet gradient across the frequency's own
/// band, so neighboring channels in one band fan out visibly. Uncategorized
/// frequencies get neutral gray.
pub fn frequency_color(freq_mhz: f64) -> String {
    match spectrum::classify(freq_mhz) {
        Some(band) => {
            let span = band.high_mhz - band.low_mhz;
            let t = if span > 0.0 {
                ((freq_mhz - band.low_mhz) / span).clamp(0.0, 1.0)
            } else {
                0.5
            };
            jet_hex(t)
        }
        None => "#808080".to_string(),
    }
}

pub fn polygon_feature(radio: &Radio, report: &CoverageReport) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Polygon",
            "coordinates": [ring(&report.cone)],
        },
        "properties": {
            "name": report.radio_name,
            "model": radio.model,
            "frequency": radio.frequency_mhz,
            "channel_width": radio.channel_width_mhz,
            "band": report.band_name,
            "channel": report.channel,
            "azimuth": report.azimuth_deg,
            "fill": frequency_color(radio.frequency_mhz),
        }
    })
}

pub fn marker_feature(radio: &Radio) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [radio.location.longitude, radio.location.latitude],
        },
        "properties": {
            "name": radio.name,
            "model": radio.model,
            "azimuth": radio.azimuth_deg,
            "downtilt": radio.downtilt_deg,
            "frequency": radio.frequency_mhz,
            "channel_width": radio.channel_width_mhz,
        }
    })
}

fn viewshed_feature(report: &CoverageReport, points: &[LatLon]) -> Value {
    let coordinates: Vec<Value> = points
        .iter()
        .map(|p| json!([p.longitude, p.latitude]))
        .collect();
    json!({
        "type": "Feature",
        "geometry": {
            "type": "MultiPoint",
            "coordinates": coordinates,
        },
        "properties": {
            "name": report.radio_name,
            "kind": "viewshed",
        }
    })
}

pub fn feature_collection<'a, I>(items: I) -> Value
where
    I: IntoIterator<Item = (&'a Radio, &'a CoverageReport)>,
{
    let mut features = Vec::new();
    for (radio, report) in items {
        features.push(polygon_feature(radio, report));
        features.push(marker_feature(radio));
        if let Some(points) = &report.viewshed {
            features.push(viewshed_feature(report, points));
        }
    }
    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
