//! Process-wide cache of the combined dataset.
//!
//! The combined dataset is built on first access and shared read-only
//! afterwards. A failed load leaves the cache empty so the next access
//! retries. Clearing needs exclusive access, so readers never lock.

use crate::config::SolarConfig;
use crate::dataset::{CombinedDataset, DatasetLoader};
use crate::error::Result;

use once_cell::sync::OnceCell;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug)]
pub struct DatasetCache {
    loader: DatasetLoader,
    combined: OnceCell<Arc<CombinedDataset>>,
}

impl DatasetCache {
    pub fn new(config: SolarConfig) -> Self {
        Self {
            loader: DatasetLoader::new(config),
            combined: OnceCell::new(),
        }
    }

    /// Combined dataset, loading it on first use
    pub fn get(&self) -> Result<Arc<CombinedDataset>> {
        let combined = self.combined.get_or_try_init(|| {
            info!("Loading combined dataset");
            self.loader.load_all().map(Arc::new)
        })?;
        debug!("Serving combined dataset with {} rows", combined.height());
        Ok(Arc::clone(combined))
    }

    pub fn is_loaded(&self) -> bool {
        self.combined.get().is_some()
    }

    /// Drop the cached dataset; the next `get` reloads from disk
    pub fn clear(&mut self) {
        if self.combined.take().is_some() {
            info!("Cleared cached combined dataset");
        }
    }

    pub fn config(&self) -> &SolarConfig {
        self.loader.config()
    }
}
