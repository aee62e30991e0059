use std::sync::Arc;

use crate::azimuth::AzimuthSource;
use crate::coverage::CoverageEngine;
use crate::geo::{haversine_distance, initial_bearing, LatLon};
use crate::geojson;
use crate::io::{normalize_records, DeviceRecord, GroupStationLookup};
use crate::physics::viewshed::{ViewshedEngine, ViewshedParams};
use crate::terrain::sampler::ElevationSampler;
use crate::terrain::{ElevationDataset, GeoTransform};

const CENTER: LatLon = LatLon {
    latitude: 46.5,
    longitude: 6.5,
};

fn flat_sampler() -> ElevationSampler {
    let transform = GeoTransform::from_origin(6.45025, 46.55025, 0.0005, 0.0005);
    let dataset = ElevationDataset::flat(200, 200, transform, 0.0);
    ElevationSampler::new(Arc::new(dataset))
}

fn record(name: &str, latitude: f64, longitude: f64) -> DeviceRecord {
    DeviceRecord {
        id: format!("id-{}", name),
        name: name.to_string(),
        model: "LAP-GPS".to_string(),
        antenna: None,
        latitude,
        longitude,
        heading: Some(180.0),
        azimuth: None,
        downtilt: Some(4.0),
        frequency: Some(5500.0),
        channel_width: Some(20.0),
        height: Some(30.0),
        beamwidth_h: None,
        beamwidth_v: None,
        group: None,
        mode: None,
    }
}

#[test]
fn geodesic_distance_and_bearing() {
    let p1 = LatLon::new(0.0, 0.0);
    let p2 = LatLon::new(1.0, 0.0);

    // 1 degree latitude ~ 111km
    assert!((haversine_distance(p1, p2) - 111319.0).abs() < 100.0);
    assert!(initial_bearing(p1, p2).abs() < 0.1);
}

#[tokio::test]
async fn level_antenna_sees_to_max_range() {
    let params = ViewshedParams {
        steps: 4,
        points_per_line: 10,
        receiver_height_m: 2.0,
    };
    let engine = ViewshedEngine::with_params(flat_sampler(), params);

    let points = engine.boundary(CENTER, 180.0, 0.0, 90.0, 30.0, 1000.0).await;

    // Origin plus 5 full rays of 10 points each.
    assert_eq!(points.len(), 51);
    let farthest = points
        .iter()
        .map(|p| haversine_distance(CENTER, *p))
        .fold(0.0_f64, f64::max);
    assert!((farthest - 1000.0).abs() < 2.0);
}

#[tokio::test]
async fn downtilt_grounds_the_viewshed() {
    let params = ViewshedParams {
        steps: 4,
        points_per_line: 10,
        receiver_height_m: 2.0,
    };
    let engine = ViewshedEngine::with_params(flat_sampler(), params);

    // Signal from 30m falls below a 2m receiver at (30+2)/tan(5) ~ 366m.
    let points = engine.boundary(CENTER, 180.0, 5.0, 90.0, 30.0, 1000.0).await;

    assert_eq!(points.len(), 16);
    let farthest = points
        .iter()
        .map(|p| haversine_distance(CENTER, *p))
        .fold(0.0_f64, f64::max);
    assert!(farthest < 366.0);
    assert!(farthest > 250.0);
}

#[test]
fn station_group_estimates_missing_azimuth() {
    let mut ap = record("ap-1", 46.5, 6.5);
    ap.heading = None;
    ap.group = Some("backhaul".to_string());
    let mut sta = record("sta-1", 46.5, 6.6);
    sta.mode = Some("sta".to_string());
    sta.group = Some("backhaul".to_string());

    let records = vec![ap, sta];
    let lookup = GroupStationLookup::new(&records);
    let access_points: Vec<_> = records.into_iter().filter(|r| !r.is_station()).collect();
    let radios = normalize_records(access_points, &lookup);

    assert_eq!(radios.len(), 1);
    assert_eq!(radios[0].azimuth_source, AzimuthSource::Estimated);
    assert!((radios[0].azimuth_deg - 90.0).abs() < 0.5);
}

#[tokio::test]
async fn device_export_to_feature_collection() {
    let mut sta = record("sta-1", 46.49, 6.52);
    sta.mode = Some("sta".to_string());
    let records = vec![
        record("ap-1", 46.5, 6.5),
        record("ap-2", 46.51, 6.51),
        sta,
    ];

    let lookup = GroupStationLookup::new(&records);
    let access_points: Vec<_> = records.into_iter().filter(|r| !r.is_station()).collect();
    let radios = normalize_records(access_points, &lookup);
    assert_eq!(radios.len(), 2);

    let engine = CoverageEngine::new(flat_sampler());
    let results = engine.compute_all(&radios).await;

    let mut pairs = Vec::new();
    for (radio, result) in radios.iter().zip(results) {
        pairs.push((radio, result.unwrap()));
    }

    let collection =
        geojson::feature_collection(pairs.iter().map(|(radio, report)| (*radio, report.as_ref())));
    assert_eq!(collection["type"], "FeatureCollection");

    let features = collection["features"].as_array().unwrap();
    assert_eq!(features.len(), 6);
    let count_of = |kind: &str| {
        features
            .iter()
            .filter(|f| f["geometry"]["type"] == kind)
            .count()
    };
    assert_eq!(count_of("Polygon"), 2);
    assert_eq!(count_of("Point"), 2);
    assert_eq!(count_of("MultiPoint"), 2);
}
