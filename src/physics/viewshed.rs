//! Terrain-aware visibility sweeps.
//!
//! A viewshed walks rays outward from the radio across its beamwidth and
//! keeps the points the downtilted beam can actually reach: the first
//! terrain sample rising above the beam shadows everything farther out on
//! that ray. Point mode samples elevations concurrently through the bounded
//! sampler; raster mode runs synchronously against a dataset and marks
//! visible cells in a DEM-shaped mask.

use futures::future::join_all;
use itertools::iproduct;

use crate::geo::{self, LatLon};
use crate::physics::{cone, los};
use crate::terrain::sampler::ElevationSampler;
use crate::terrain::ElevationDataset;

#[derive(Debug, Clone, Copy)]
pub struct ViewshedParams {
    /// Arc segments across the beam; the fan has one more bearing.
    pub steps: usize,
    /// Samples along each bearing.
    pub points_per_line: usize,
    /// Receiver mast height above ground, meters.
    pub receiver_height_m: f64,
}

impl Default for ViewshedParams {
    fn default() -> Self {
        Self {
            steps: 36,
            points_per_line: 50,
            receiver_height_m: 2.0,
        }
    }
}

/// Equally spaced bearings across the beam, start edge to end edge. An
/// omnidirectional beamwidth sweeps the full circle.
fn bearing_fan(azimuth_deg: f64, beamwidth_deg: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let sweep = if cone::is_omni(beamwidth_deg) {
        360.0
    } else {
        beamwidth_deg
    };
    (0..=steps)
        .map(|i| azimuth_deg - sweep / 2.0 + sweep * (i as f64) / (steps as f64))
        .collect()
}

/// Sample distances along one ray: equally spaced over (0, max]. The site
/// itself is not a sample; point mode prepends it separately.
fn distance_ladder(max_distance_m: f64, points_per_line: usize) -> Vec<f64> {
    (1..=points_per_line)
        .map(|i| max_distance_m * (i as f64) / (points_per_line as f64))
        .collect()
}

#[derive(Clone)]
pub struct ViewshedEngine {
    sampler: ElevationSampler,
    params: ViewshedParams,
}

impl ViewshedEngine {
    pub fn new(sampler: ElevationSampler) -> Self {
        Self::with_params(sampler, ViewshedParams::default())
    }

    pub fn with_params(sampler: ElevationSampler, params: ViewshedParams) -> Self {
        Self { sampler, params }
    }

    pub fn params(&self) -> ViewshedParams {
        self.params
    }

    pub fn sampler(&self) -> &ElevationSampler {
        &self.sampler
    }

    /// Visible points across the beam, bearing-major and near-to-far within
    /// each ray. Directional beams prepend the site itself.
    ///
    /// Every (bearing, distance) sample is issued at once; the sampler's
    /// semaphore is what bounds the actual concurrency. Consumption walks
    /// each ray in distance order and stops it at the first obstruction,
    /// regardless of the order samples completed in.
    pub async fn boundary(
        &self,
        center: LatLon,
        azimuth_deg: f64,
        downtilt_deg: f64,
        beamwidth_deg: f64,
        antenna_height_m: f64,
        max_distance_m: f64,
    ) -> Vec<LatLon> {
        let bearings = bearing_fan(azimuth_deg, beamwidth_deg, self.params.steps);
        let distances = distance_ladder(max_distance_m, self.params.points_per_line);

        let samples = iproduct!(bearings.iter().copied(), distances.iter().copied()).map(
            |(bearing, distance)| {
                let sampler = self.sampler.clone();
                async move {
                    let point = geo::destination(center, bearing, distance);
                    let terrain = sampler.sample(point.latitude, point.longitude).await;
                    (point, distance, terrain)
                }
            },
        );
        let samples = join_all(samples).await;

        let mut visible = Vec::with_capacity(samples.len() + 1);
        if !cone::is_omni(beamwidth_deg) {
            visible.push(center);
        }
        // join_all kept submission order, so one chunk is one ray, near to far
        for ray in samples.chunks(distances.len().max(1)) {
            for &(point, distance, terrain) in ray {
                let signal = los::signal_height(antenna_height_m, downtilt_deg, distance);
                if los::is_obstructed(terrain, signal, self.params.receiver_height_m) {
                    break;
                }
                visible.push(point);
            }
        }
        visible
    }
}

/// DEM-aligned 0/1 visibility mask.
#[derive(Debug, Clone)]
pub struct VisibilityGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<u8>,
}

impl VisibilityGrid {
    fn for_dataset(dataset: &ElevationDataset) -> Self {
        Self {
            width: dataset.width(),
            height: dataset.height(),
            cells: vec![0; dataset.width() * dataset.height()],
        }
    }

    pub fn is_visible(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col] == 1
    }

    pub fn visible_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell == 1).count()
    }
}

/// Raster-mode viewshed: same fan and obstruction rule as
/// [`ViewshedEngine::boundary`], evaluated straight against the dataset.
/// Samples falling outside the grid are skipped and their ray keeps going;
/// an obstruction still ends the ray.
#[allow(clippy::too_many_arguments)]
pub fn viewshed_raster(
    dataset: &ElevationDataset,
    center: LatLon,
    azimuth_deg: f64,
    downtilt_deg: f64,
    beamwidth_deg: f64,
    antenna_height_m: f64,
    max_distance_m: f64,
    params: ViewshedParams,
) -> VisibilityGrid {
    let mut grid = VisibilityGrid::for_dataset(dataset);
    let bearings = bearing_fan(azimuth_deg, beamwidth_deg, params.steps);
    let distances = distance_ladder(max_distance_m, params.points_per_line);

    // The site cell mirrors the prepended origin of point mode.
    if !cone::is_omni(beamwidth_deg) {
        if let Some((row, col)) = dataset.index(center.latitude, center.longitude) {
            grid.cells[row * grid.width + col] = 1;
        }
    }

    for &bearing in &bearings {
        for &distance in &distances {
            let point = geo::destination(center, bearing, distance);
            let signal = los::signal_height(antenna_height_m, downtilt_deg, distance);
            if let Some((row, col)) = dataset.index(point.latitude, point.longitude) {
                let terrain = f64::from(dataset.value_at(row, col).unwrap_or(0.0));
                if los::is_obstructed(terrain, signal, params.receiver_height_m) {
                    break;
                }
                grid.cells[row * grid.width + col] = 1;
            }
        }
    }
    grid
}
