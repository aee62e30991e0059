//! Concurrency-bounded elevation sampling over a shared dataset.
//!
//! Viewsheds issue thousands of lookups at once; the semaphore caps how many
//! blocking reads run simultaneously, and any failed lookup degrades to sea
//! level so a single bad sample never aborts a sweep.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::terrain::ElevationDataset;

pub const DEFAULT_MAX_CONCURRENT_READS: usize = 16;

#[derive(Clone)]
pub struct ElevationSampler {
    dataset: Arc<ElevationDataset>,
    permits: Arc<Semaphore>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl ElevationSampler {
    pub fn new(dataset: Arc<ElevationDataset>) -> Self {
        Self::with_limit(dataset, DEFAULT_MAX_CONCURRENT_READS)
    }

    pub fn with_limit(dataset: Arc<ElevationDataset>, max_concurrent: usize) -> Self {
        Self {
            dataset,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn dataset(&self) -> &Arc<ElevationDataset> {
        &self.dataset
    }

    /// Highest number of reads seen running at once. Clones share the
    /// gauge, so this covers every task sampling through the same limiter.
    pub fn peak_reads(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }

    /// Elevation at a coordinate, `0.0` on any failure. The permit is
    /// acquired before the blocking read starts and released when it ends.
    pub async fn sample(&self, latitude: f64, longitude: f64) -> f64 {
        let permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                log::warn!("elevation sampler gate closed: {err}; using 0.0");
                return 0.0;
            }
        };
        let dataset = self.dataset.clone();
        let in_flight = self.in_flight.clone();
        let peak = self.peak_in_flight.clone();
        let read = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let running = in_flight.fetch_add(1, Ordering::Relaxed) + 1;
            peak.fetch_max(running, Ordering::Relaxed);
            let sample = dataset.elevation_at(latitude, longitude);
            in_flight.fetch_sub(1, Ordering::Relaxed);
            sample
        })
        .await;
        match read {
            Ok(Ok(elevation)) => elevation,
            Ok(Err(err)) => {
                log::warn!("elevation sample at ({latitude:.6}, {longitude:.6}) failed: {err}; using 0.0");
                0.0
            }
            Err(err) => {
                log::warn!("elevation read task failed: {err}; using 0.0");
                0.0
            }
        }
    }
}
