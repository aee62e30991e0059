//! Elevation data: an immutable in-memory raster with affine
//! georeferencing, plus the SRTM `.hgt` tile loader.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub mod sampler;

pub const SRTM3_SIZE: usize = 1201;
pub const SRTM1_SIZE: usize = 3601;

/// SRTM no-data marker; voids read as sea level.
const SRTM_VOID: i16 = -32768;

#[derive(Debug, thiserror::Error)]
pub enum TerrainError {
    #[error("coordinate ({latitude}, {longitude}) is outside the dataset")]
    OutOfBounds { latitude: f64, longitude: f64 },
    #[error("grid holds {actual} values, expected {expected} for {width}x{height}")]
    GridSizeMismatch {
        expected: usize,
        actual: usize,
        width: usize,
        height: usize,
    },
}

/// Affine georeferencing for a north-up raster: the top-left corner plus the
/// per-cell step in degrees. `index` is the inverse mapping (floor
/// semantics), `xy` the forward one (cell centers).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    pub origin_lon: f64,   // west edge
    pub origin_lat: f64,   // north edge
    pub pixel_width: f64,  // degrees per column, eastward
    pub pixel_height: f64, // degrees per row, southward
}

impl GeoTransform {
    pub fn from_origin(west: f64, north: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_lon: west,
            origin_lat: north,
            pixel_width,
            pixel_height,
        }
    }

    /// Raster (row, col) containing a coordinate. Results can be negative or
    /// past the grid; bounds checking is the dataset's job.
    pub fn index(&self, latitude: f64, longitude: f64) -> (isize, isize) {
        let col = ((longitude - self.origin_lon) / self.pixel_width).floor() as isize;
        let row = ((self.origin_lat - latitude) / self.pixel_height).floor() as isize;
        (row, col)
    }

    /// (latitude, longitude) of a cell's center.
    pub fn xy(&self, row: usize, col: usize) -> (f64, f64) {
        let longitude = self.origin_lon + (col as f64 + 0.5) * self.pixel_width;
        let latitude = self.origin_lat - (row as f64 + 0.5) * self.pixel_height;
        (latitude, longitude)
    }
}

/// A read-only elevation grid. Built once, then shared behind `Arc`; nothing
/// mutates it after construction.
#[derive(Debug, Clone)]
pub struct ElevationDataset {
    width: usize,
    height: usize,
    data: Vec<f32>, // row-major, row 0 = north edge
    transform: GeoTransform,
    crs: String,
}

impl ElevationDataset {
    pub fn new(
        width: usize,
        height: usize,
        data: Vec<f32>,
        transform: GeoTransform,
        crs: impl Into<String>,
    ) -> std::result::Result<Self, TerrainError> {
        let expected = width * height;
        if data.len() != expected {
            return Err(TerrainError::GridSizeMismatch {
                expected,
                actual: data.len(),
                width,
                height,
            });
        }
        Ok(Self {
            width,
            height,
            data,
            transform,
            crs: crs.into(),
        })
    }

    /// Uniform-elevation dataset, mostly for tests and benches.
    pub fn flat(width: usize, height: usize, transform: GeoTransform, elevation: f32) -> Self {
        Self {
            width,
            height,
            data: vec![elevation; width * height],
            transform,
            crs: "EPSG:4326".to_string(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Bounds-checked inverse transform.
    pub fn index(&self, latitude: f64, longitude: f64) -> Option<(usize, usize)> {
        let (row, col) = self.transform.index(latitude, longitude);
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        (row < self.height && col < self.width).then_some((row, col))
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<f32> {
        (row < self.height && col < self.width).then(|| self.data[row * self.width + col])
    }

    /// Strict lookup; out-of-bounds coordinates are the caller's error.
    /// Degraded, never-failing sampling lives in [`sampler::ElevationSampler`].
    pub fn elevation_at(&self, latitude: f64, longitude: f64) -> std::result::Result<f64, TerrainError> {
        let (row, col) = self
            .index(latitude, longitude)
            .ok_or(TerrainError::OutOfBounds {
                latitude,
                longitude,
            })?;
        Ok(f64::from(self.data[row * self.width + col]))
    }

    /// Load a single SRTM `.hgt` tile. The filename encodes the south-west
    /// corner (`N46E006.hgt`); the file length decides SRTM1 vs SRTM3.
    pub fn from_hgt(path: &str) -> Result<Self> {
        let path_ref = Path::new(path);
        let stem = path_ref
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        let (lat_sw, lon_sw) = parse_tile_name(stem).with_context(|| {
            format!("tile name {stem:?} does not encode a corner (expected e.g. N46E006)")
        })?;

        let mut file = File::open(path_ref).with_context(|| format!("opening DEM tile {path}"))?;
        // 1201^2 or 3601^2 samples, two bytes each; anything else is not a tile
        let size = match file.metadata()?.len() {
            2_884_802 => SRTM3_SIZE,
            25_934_402 => SRTM1_SIZE,
            len => anyhow::bail!("unknown HGT file size: {len} bytes"),
        };

        let mut buffer = Vec::with_capacity(size * size * 2);
        file.read_to_end(&mut buffer)?;

        let data: Vec<f32> = buffer
            .chunks_exact(2)
            .map(|chunk| {
                let raw = i16::from_be_bytes([chunk[0], chunk[1]]);
                if raw == SRTM_VOID { 0.0 } else { f32::from(raw) }
            })
            .collect();

        // Node-registered one-degree tile: row 0 sits on the north edge.
        let step = 1.0 / (size - 1) as f64;
        let transform = GeoTransform::from_origin(f64::from(lon_sw), f64::from(lat_sw) + 1.0, step, step);
        Ok(Self::new(size, size, data, transform, "EPSG:4326")?)
    }
}

/// `N46E006` → (46, 6); `S10W077` → (-10, -77). Case-insensitive.
fn parse_tile_name(stem: &str) -> Option<(i32, i32)> {
    let stem = stem.to_ascii_uppercase();
    if stem.len() != 7 {
        return None;
    }
    let lat_sign = match stem.as_bytes()[0] {
        b'N' => 1,
        b'S' => -1,
        _ => return None,
    };
    let lon_sign = match stem.as_bytes()[3] {
        b'E' => 1,
        b'W' => -1,
        _ => return None,
    };
    let lat: i32 = stem[1..3].parse().ok()?;
    let lon: i32 = stem[4..7].parse().ok()?;
    Some((lat_sign * lat, lon_sign * lon))
}
