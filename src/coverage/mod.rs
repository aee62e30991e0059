//! Per-radio orchestration: resolve the radio's RF characteristics, build
//! the cone, optionally run the viewshed, and batch the whole inventory.

use std::sync::Arc;

use crate::azimuth::AzimuthSource;
use crate::cache::{CoverageCache, ReportKey, DEFAULT_CACHE_CAPACITY};
use crate::geo::LatLon;
use crate::io::Radio;
use crate::physics::cone;
use crate::physics::viewshed::{viewshed_raster, ViewshedEngine, ViewshedParams, VisibilityGrid};
use crate::profile::AntennaProfile;
use crate::terrain::sampler::ElevationSampler;

#[derive(Debug, thiserror::Error)]
pub enum CoverageError {
    #[error("coverage task for {name:?} did not finish: {reason}")]
    TaskFailed { name: String, reason: String },
}

/// Which visibility product a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewshedMode {
    /// Cone geometry only.
    None,
    /// Visible points across the beam.
    #[default]
    Boundary,
    /// DEM-aligned visibility mask.
    Raster,
}

/// Everything computed for one radio. A pure value with no handle back to
/// the radio or the dataset.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub radio_id: String,
    pub radio_name: String,
    pub cone: Vec<LatLon>,
    pub viewshed: Option<Vec<LatLon>>,
    pub visibility: Option<VisibilityGrid>,
    pub profile: AntennaProfile,
    pub band_name: Option<&'static str>,
    pub channel: Option<u16>,
    pub azimuth_deg: f64,
    pub azimuth_source: AzimuthSource,
}

#[derive(Clone)]
pub struct CoverageEngine {
    viewshed: ViewshedEngine,
    mode: ViewshedMode,
    cache: CoverageCache,
}

impl CoverageEngine {
    pub fn new(sampler: ElevationSampler) -> Self {
        Self::with_options(
            sampler,
            ViewshedParams::default(),
            ViewshedMode::default(),
            DEFAULT_CACHE_CAPACITY,
        )
    }

    pub fn with_options(
        sampler: ElevationSampler,
        params: ViewshedParams,
        mode: ViewshedMode,
        cache_capacity: usize,
    ) -> Self {
        Self {
            viewshed: ViewshedEngine::with_params(sampler, params),
            mode,
            cache: CoverageCache::with_capacity(cache_capacity),
        }
    }

    pub fn mode(&self) -> ViewshedMode {
        self.mode
    }

    /// Report for one radio, served from cache when its parameters and the
    /// viewshed options are unchanged.
    pub async fn report_for(&self, radio: &Radio) -> Arc<CoverageReport> {
        let key = ReportKey::new(radio, self.viewshed.params(), self.mode);
        if let Some(report) = self.cache.get(&key) {
            log::debug!("cache hit for {}", radio.name);
            return report;
        }

        let report = Arc::new(self.compute(radio).await);
        self.cache.insert(key, report.clone());
        report
    }

    async fn compute(&self, radio: &Radio) -> CoverageReport {
        let beamwidth = radio.beamwidth_horizontal();
        let max_range = radio.max_range_m();
        let cone = cone::coverage_cone(
            radio.location,
            radio.azimuth_deg,
            radio.downtilt_deg,
            beamwidth,
            radio.antenna_height_m,
            max_range,
        );

        let (viewshed, visibility) = match self.mode {
            ViewshedMode::None => (None, None),
            ViewshedMode::Boundary => {
                let points = self
                    .viewshed
                    .boundary(
                        radio.location,
                        radio.azimuth_deg,
                        radio.downtilt_deg,
                        beamwidth,
                        radio.antenna_height_m,
                        max_range,
                    )
                    .await;
                (Some(points), None)
            }
            ViewshedMode::Raster => {
                let grid = viewshed_raster(
                    self.viewshed.sampler().dataset(),
                    radio.location,
                    radio.azimuth_deg,
                    radio.downtilt_deg,
                    beamwidth,
                    radio.antenna_height_m,
                    max_range,
                    self.viewshed.params(),
                );
                (None, Some(grid))
            }
        };

        log::debug!(
            "{}: band {:?}, channel {:?}, azimuth {:.1} ({})",
            radio.name,
            radio.band_name(),
            radio.channel(),
            radio.azimuth_deg,
            radio.azimuth_source.as_str()
        );

        CoverageReport {
            radio_id: radio.id.clone(),
            radio_name: radio.name.clone(),
            cone,
            viewshed,
            visibility,
            profile: radio.profile(),
            band_name: radio.band_name(),
            channel: radio.channel(),
            azimuth_deg: radio.azimuth_deg,
            azimuth_source: radio.azimuth_source,
        }
    }

    /// Reports for a whole inventory, one task per radio. Output order
    /// matches input order; a radio whose task dies yields its own error and
    /// leaves the others alone.
    pub async fn compute_all(
        &self,
        radios: &[Radio],
    ) -> Vec<Result<Arc<CoverageReport>, CoverageError>> {
        log::info!("computing coverage for {} radios", radios.len());
        let handles: Vec<_> = radios
            .iter()
            .map(|radio| {
                let engine = self.clone();
                let radio = radio.clone();
                let name = radio.name.clone();
                (
                    name,
                    tokio::spawn(async move { engine.report_for(&radio).await }),
                )
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            match handle.await {
                Ok(report) => results.push(Ok(report)),
                Err(err) => {
                    log::error!("coverage task for {name} failed: {err}");
                    results.push(Err(CoverageError::TaskFailed {
                        name,
                        reason: err.to_string(),
                    }));
                }
            }
        }
        results
    }
}
