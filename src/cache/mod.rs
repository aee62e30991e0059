//! LRU cache of computed coverage reports.
//!
//! Reports are pure functions of the radio parameters and the viewshed
//! options, so the key is the radio's parameter hash plus those options.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use crate::coverage::{CoverageReport, ViewshedMode};
use crate::io::Radio;
use crate::physics::viewshed::ViewshedParams;

pub const DEFAULT_CACHE_CAPACITY: usize = 100;

#[derive(Hash, PartialEq, Eq, Clone, Copy, Debug)]
pub struct ReportKey {
    pub radio_hash: u64,
    pub steps: usize,
    pub points_per_line: usize,
    pub receiver_height_bits: u64, // f64 bits, exact
    pub mode: ViewshedMode,
}

impl ReportKey {
    pub fn new(radio: &Radio, params: ViewshedParams, mode: ViewshedMode) -> Self {
        Self {
            radio_hash: radio.params_hash(),
            steps: params.steps,
            points_per_line: params.points_per_line,
            receiver_height_bits: params.receiver_height_m.to_bits(),
            mode,
        }
    }
}

#[derive(Clone)]
pub struct CoverageCache {
    cache: Arc<Mutex<LruCache<ReportKey, Arc<CoverageReport>>>>,
}

impl Default for CoverageCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl CoverageCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(capacity.max(1)).unwrap(),
            ))),
        }
    }

    pub fn get(&self, key: &ReportKey) -> Option<Arc<CoverageReport>> {
        let mut cache = self.cache.lock().unwrap();
        cache.get(key).cloned()
    }

    pub fn insert(&self, key: ReportKey, report: Arc<CoverageReport>) {
        let mut cache = self.cache.lock().unwrap();
        cache.put(key, report);
    }

    pub fn clear(&self) {
        let mut cache = self.cache.lock().unwrap();
        cache.clear();
    }

    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
