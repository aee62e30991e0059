//! Device inventory: raw records as the management controller exports them,
//! and the normalized `Radio` the engine computes with.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::azimuth::{self, AzimuthSource};
use crate::geo::LatLon;
use crate::profile::{self, AntennaProfile};
use crate::spectrum::{self, Band};

pub const DEFAULT_CHANNEL_WIDTH_MHZ: f64 = 20.0;
pub const DEFAULT_ANTENNA_HEIGHT_M: f64 = 30.0;

/// One inventory row, straight out of the controller export (JSON array or
/// CSV). Everything the controller may omit is optional here; normalization
/// happens in [`DeviceRecord::into_radio`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    pub name: String,
    pub model: String,
    #[serde(default)]
    pub antenna: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub heading: Option<f64>, // device compass, degrees
    #[serde(default)]
    pub azimuth: Option<f64>, // operator annotation, degrees
    #[serde(default)]
    pub downtilt: Option<f64>, // degrees
    #[serde(default)]
    pub frequency: Option<f64>, // MHz
    #[serde(default)]
    pub channel_width: Option<f64>, // MHz
    #[serde(default)]
    pub height: Option<f64>, // meters above ground
    #[serde(default)]
    pub beamwidth_h: Option<f64>, // degrees
    #[serde(default)]
    pub beamwidth_v: Option<f64>, // degrees
    #[serde(default)]
    pub group: Option<String>, // site/link grouping, see GroupStationLookup
    #[serde(default)]
    pub mode: Option<String>, // "ap" or "sta"
}

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("device {name:?} has no usable frequency ({value:?} MHz)")]
    InvalidFrequency { name: String, value: Option<f64> },
}

impl DeviceRecord {
    pub fn position(&self) -> LatLon {
        LatLon::new(self.latitude, self.longitude)
    }

    pub fn is_station(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|mode| mode.eq_ignore_ascii_case("sta"))
    }

    /// Normalize into a [`Radio`]. Orientation follows the source priority
    /// chain (device heading, then operator annotation, then estimation from
    /// `stations`, then north); downtilt is made non-negative and defaults to
    /// level; missing height and channel width get hardware-typical defaults.
    /// A record without a strictly positive frequency cannot be classified
    /// and is rejected.
    pub fn into_radio(self, stations: &[LatLon]) -> Result<Radio, RecordError> {
        let frequency_mhz = match self.frequency {
            Some(freq) if freq > 0.0 => freq,
            value => {
                return Err(RecordError::InvalidFrequency {
                    name: self.name,
                    value,
                });
            }
        };
        let location = LatLon::new(self.latitude, self.longitude);
        let (azimuth_deg, azimuth_source) =
            azimuth::resolve_azimuth(self.heading, self.azimuth, location, stations);
        Ok(Radio {
            id: self.id,
            name: self.name,
            model: self.model,
            antenna: self.antenna,
            location,
            azimuth_deg,
            azimuth_source,
            downtilt_deg: self.downtilt.unwrap_or(0.0).abs(),
            frequency_mhz,
            channel_width_mhz: self.channel_width.unwrap_or(DEFAULT_CHANNEL_WIDTH_MHZ),
            antenna_height_m: match self.height {
                Some(height) if height > 0.0 => height,
                _ => DEFAULT_ANTENNA_HEIGHT_M,
            },
            beamwidth_h_override: self.beamwidth_h,
            beamwidth_v_override: self.beamwidth_v,
        })
    }
}

/// A normalized radio. Immutable once constructed; all derived RF
/// characteristics are methods over the fields and the static tables.
#[derive(Debug, Clone)]
pub struct Radio {
    pub id: String,
    pub name: String,
    pub model: String,
    pub antenna: Option<String>,
    pub location: LatLon,
    pub azimuth_deg: f64,      // [0, 360)
    pub azimuth_source: AzimuthSource,
    pub downtilt_deg: f64,     // >= 0
    pub frequency_mhz: f64,    // > 0
    pub channel_width_mhz: f64,
    pub antenna_height_m: f64, // above ground
    pub beamwidth_h_override: Option<f64>,
    pub beamwidth_v_override: Option<f64>,
}

impl Radio {
    pub fn position(&self) -> LatLon {
        self.location
    }

    pub fn profile(&self) -> AntennaProfile {
        profile::resolve_profile(&self.model, self.antenna.as_deref().unwrap_or(""))
    }

    pub fn beamwidth_horizontal(&self) -> f64 {
        self.beamwidth_h_override
            .unwrap_or_else(|| self.profile().beamwidth_h_deg)
    }

    pub fn beamwidth_vertical(&self) -> f64 {
        self.beamwidth_v_override
            .unwrap_or_else(|| self.profile().beamwidth_v_deg)
    }

    pub fn max_range_m(&self) -> f64 {
        self.profile().range_m
    }

    pub fn frequency_band(&self) -> Option<&'static Band> {
        spectrum::classify(self.frequency_mhz)
    }

    pub fn band_name(&self) -> Option<&'static str> {
        self.frequency_band().map(|band| band.name)
    }

    pub fn channel(&self) -> Option<u16> {
        spectrum::channel(self.frequency_mhz, self.channel_width_mhz)
    }

    /// Hash of every parameter the coverage computation depends on. Two
    /// radios with equal hashes produce identical reports, which makes this
    /// the cache key. `to_bits` keeps float hashing exact.
    pub fn params_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.id.hash(&mut hasher);
        self.location.latitude.to_bits().hash(&mut hasher);
        self.location.longitude.to_bits().hash(&mut hasher);
        self.azimuth_deg.to_bits().hash(&mut hasher);
        self.downtilt_deg.to_bits().hash(&mut hasher);
        self.frequency_mhz.to_bits().hash(&mut hasher);
        self.channel_width_mhz.to_bits().hash(&mut hasher);
        self.antenna_height_m.to_bits().hash(&mut hasher);
        self.beamwidth_horizontal().to_bits().hash(&mut hasher);
        self.beamwidth_vertical().to_bits().hash(&mut hasher);
        self.max_range_m().to_bits().hash(&mut hasher);
        hasher.finish()
    }
}

/// How records are associated with the stations they serve. The controller
/// knows the real association topology; this trait is the seam where a
/// richer implementation plugs in.
pub trait StationLookup {
    fn stations_for(&self, record: &DeviceRecord) -> Vec<LatLon>;
}

/// Reference lookup: station records sharing a non-empty `group` with the
/// device count as its clients. Access points in the same group (backhaul
/// peers, sector siblings) are not stations and never feed the estimate.
pub struct GroupStationLookup {
    members: Vec<(String, String, LatLon)>, // (group, id, position)
}

impl GroupStationLookup {
    pub fn new(records: &[DeviceRecord]) -> Self {
        let members = records
            .iter()
            .filter(|record| record.is_station())
            .filter_map(|record| {
                let group = record.group.clone().filter(|g| !g.is_empty())?;
                Some((group, record.id.clone(), record.position()))
            })
            .collect();
        Self { members }
    }
}

impl StationLookup for GroupStationLookup {
    fn stations_for(&self, record: &DeviceRecord) -> Vec<LatLon> {
        let Some(group) = record.group.as_deref().filter(|g| !g.is_empty()) else {
            return Vec::new();
        };
        self.members
            .iter()
            .filter(|(g, id, _)| g == group && *id != record.id)
            .map(|(_, _, position)| *position)
            .collect()
    }
}

pub fn load_records_from_json(path: &str) -> anyhow::Result<Vec<DeviceRecord>> {
    let file = std::fs::File::open(path).with_context(|| format!("opening device records {path}"))?;
    let reader = std::io::BufReader::new(file);
    let records: Vec<DeviceRecord> =
        serde_json::from_reader(reader).with_context(|| format!("parsing device records {path}"))?;
    Ok(records)
}

pub fn load_records_from_csv(path: &str) -> anyhow::Result<Vec<DeviceRecord>> {
    // empty cells come through as None, same shape as the JSON export
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening device records {path}"))?;
    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: DeviceRecord =
            row.with_context(|| format!("parsing device records {path}"))?;
        records.push(record);
    }
    Ok(records)
}

/// Load an inventory, picking the format from the file extension.
pub fn load_records(path: &str) -> anyhow::Result<Vec<DeviceRecord>> {
    if path.to_ascii_lowercase().ends_with(".csv") {
        load_records_from_csv(path)
    } else {
        load_records_from_json(path)
    }
}

/// Normalize a batch of records. Records that fail their construction
/// invariants are skipped with a warning; one bad row never sinks the run.
pub fn normalize_records(records: Vec<DeviceRecord>, lookup: &dyn StationLookup) -> Vec<Radio> {
    let mut radios = Vec::with_capacity(records.len());
    for record in records {
        let stations = lookup.stations_for(&record);
        match record.into_radio(&stations) {
            Ok(radio) => radios.push(radio),
            Err(err) => log::warn!("skipping device: {err}"),
        }
    }
    radios
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str) -> DeviceRecord {
        DeviceRecord {
            id: format!("{name}-id"),
            name: name.to_string(),
            model: "LAP-GPS".to_string(),
            antenna: None,
            latitude: 46.5,
            longitude: 6.6,
            heading: None,
            azimuth: None,
            downtilt: None,
            frequency: Some(5500.0),
            channel_width: None,
            height: None,
            beamwidth_h: None,
            beamwidth_v: None,
            group: None,
            mode: None,
        }
    }

    #[test]
    fn normalization_applies_defaults() {
        let radio = record("ap1").into_radio(&[]).unwrap();
        assert_eq!(radio.downtilt_deg, 0.0);
        assert_eq!(radio.channel_width_mhz, DEFAULT_CHANNEL_WIDTH_MHZ);
        assert_eq!(radio.antenna_height_m, DEFAULT_ANTENNA_HEIGHT_M);
        assert_eq!(radio.azimuth_deg, 0.0);
        assert_eq!(radio.azimuth_source, AzimuthSource::Default);
    }

    #[test]
    fn negative_downtilt_is_folded_positive() {
        let mut rec = record("ap1");
        rec.downtilt = Some(-7.5);
        let radio = rec.into_radio(&[]).unwrap();
        assert_eq!(radio.downtilt_deg, 7.5);
    }

    #[test]
    fn missing_frequency_is_rejected() {
        let mut rec = record("ap1");
        rec.frequency = None;
        assert!(rec.into_radio(&[]).is_err());
        let mut rec = record("ap2");
        rec.frequency = Some(0.0);
        assert!(rec.into_radio(&[]).is_err());
    }

    #[test]
    fn heading_wins_over_annotation() {
        let mut rec = record("ap1");
        rec.heading = Some(120.0);
        rec.azimuth = Some(45.0);
        let radio = rec.into_radio(&[]).unwrap();
        assert_eq!(radio.azimuth_deg, 120.0);
        assert_eq!(radio.azimuth_source, AzimuthSource::Sensor);
    }

    #[test]
    fn derived_characteristics_come_from_the_tables() {
        let radio = record("ap1").into_radio(&[]).unwrap();
        assert_eq!(radio.band_name(), Some("U-NII-2C"));
        assert_eq!(radio.channel(), Some(100));
        assert_eq!(radio.beamwidth_horizontal(), 90.0);
        assert_eq!(radio.max_range_m(), 2000.0);
    }

    #[test]
    fn beamwidth_overrides_shadow_the_profile() {
        let mut rec = record("ap1");
        rec.beamwidth_h = Some(42.0);
        let radio = rec.into_radio(&[]).unwrap();
        assert_eq!(radio.beamwidth_horizontal(), 42.0);
        assert_eq!(radio.beamwidth_vertical(), 20.0);
    }

    fn station(name: &str) -> DeviceRecord {
        let mut rec = record(name);
        rec.mode = Some("sta".to_string());
        rec
    }

    #[test]
    fn group_lookup_excludes_the_device_itself() {
        let mut sta1 = station("sta1");
        sta1.group = Some("site-a".to_string());
        let mut sta2 = station("sta2");
        sta2.group = Some("site-a".to_string());
        sta2.latitude = 46.6;
        let mut elsewhere = station("sta3");
        elsewhere.group = Some("site-b".to_string());
        let all = vec![sta1.clone(), sta2, elsewhere];

        let lookup = GroupStationLookup::new(&all);
        let stations = lookup.stations_for(&sta1);
        assert_eq!(stations.len(), 1);
        assert!((stations[0].latitude - 46.6).abs() < 1e-12);
    }

    #[test]
    fn sibling_access_points_never_count_as_stations() {
        let mut ap = record("ap1");
        ap.group = Some("site-a".to_string());
        let mut peer = record("ap2");
        peer.group = Some("site-a".to_string());
        peer.longitude = 6.7; // due east of ap1
        let mut sta = station("sta1");
        sta.group = Some("site-a".to_string());
        sta.latitude = 46.6; // due north of ap1
        let all = vec![ap.clone(), peer, sta];

        let lookup = GroupStationLookup::new(&all);
        let stations = lookup.stations_for(&ap);
        assert_eq!(stations.len(), 1);

        // Only the client shapes the estimate; a peer AP in the mean
        // would drag it to 45 degrees.
        let radio = ap.into_radio(&stations).unwrap();
        assert_eq!(radio.azimuth_source, AzimuthSource::Estimated);
        assert!(radio.azimuth_deg < 1.0 || radio.azimuth_deg > 359.0);
    }

    #[test]
    fn ungrouped_devices_have_no_stations() {
        let rec = record("ap1");
        let lookup = GroupStationLookup::new(std::slice::from_ref(&rec));
        assert!(lookup.stations_for(&rec).is_empty());
    }

    #[test]
    fn estimated_azimuth_flows_through_normalization() {
        let mut ap = record("ap1");
        ap.group = Some("site-a".to_string());
        let mut sta = station("sta1");
        sta.group = Some("site-a".to_string());
        sta.longitude = 6.7; // due east
        let all = vec![ap.clone(), sta];

        let lookup = GroupStationLookup::new(&all);
        let stations = lookup.stations_for(&ap);
        let radio = ap.into_radio(&stations).unwrap();
        assert_eq!(radio.azimuth_source, AzimuthSource::Estimated);
        assert!((radio.azimuth_deg - 90.0).abs() < 1.0);
    }

    #[test]
    fn params_hash_tracks_coverage_inputs() {
        let radio = record("ap1").into_radio(&[]).unwrap();
        let same = record("ap1").into_radio(&[]).unwrap();
        assert_eq!(radio.params_hash(), same.params_hash());

        let mut moved = radio.clone();
        moved.azimuth_deg = 90.0;
        assert_ne!(radio.params_hash(), moved.params_hash());
    }

    #[test]
    fn csv_loader_turns_empty_cells_into_none() {
        let dir = std::env::temp_dir().join(format!("rf_coverage_csv_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("devices.csv");
        let export = "\
id,name,model,antenna,latitude,longitude,heading,azimuth,downtilt,frequency,channel_width,height,beamwidth_h,beamwidth_v,group,mode
ap1-id,ap1,LAP-GPS,,46.5,6.6,180,,4,5500,20,30,,,site-a,ap
sta1-id,sta1,PowerBeam-5AC,,46.6,6.6,,,,5500,,,,,site-a,sta
";
        std::fs::write(&path, export).unwrap();

        let records = load_records(path.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].heading, Some(180.0));
        assert_eq!(records[0].antenna, None);
        assert_eq!(records[0].azimuth, None);
        assert_eq!(records[1].heading, None);
        assert_eq!(records[1].height, None);
        assert!(records[1].is_station());

        let radio = records[0].clone().into_radio(&[]).unwrap();
        assert_eq!(radio.azimuth_deg, 180.0);
        assert_eq!(radio.channel_width_mhz, 20.0);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn json_loader_ignores_fields_it_does_not_know() {
        let dir = std::env::temp_dir().join(format!("rf_coverage_json_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("devices.json");
        let export = r#"[{
            "id": "ap1-id",
            "name": "ap1",
            "model": "LAP-GPS",
            "latitude": 46.5,
            "longitude": 6.6,
            "frequency": 5785.0,
            "firmware": "8.7.11",
            "uptime_s": 123456
        }]"#;
        std::fs::write(&path, export).unwrap();

        let records = load_records(path.to_str().unwrap()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].frequency, Some(5785.0));
        assert_eq!(records[0].downtilt, None);

        let radio = records[0].clone().into_radio(&[]).unwrap();
        assert_eq!(radio.band_name(), Some("U-NII-3"));
        assert_eq!(radio.channel(), Some(157));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn station_mode_detection_is_case_insensitive() {
        let mut rec = record("sta1");
        rec.mode = Some("STA".to_string());
        assert!(rec.is_station());
        rec.mode = Some("ap-ptmp".to_string());
        assert!(!rec.is_station());
        rec.mode = None;
        assert!(!rec.is_station());
    }
}
