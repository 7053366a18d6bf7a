use nd_core::NewsStorage;
use nd_fetch::Pipeline;
use std::sync::Arc;
use tokio::sync::Mutex;

/// What a refresh runs: the pipeline plus the countries and page size to fetch.
#[derive(Debug)]
pub struct Refresher {
    pub pipeline: Pipeline,
    pub countries: Vec<String>,
    pub page_size: u32,
    /// Held for the whole run so two refreshes never interleave
    pub lock: Mutex<()>,
}

pub struct AppState {
    pub storage: Arc<dyn NewsStorage>,
    pub pipeline: Option<Refresher>,
}

impl AppState {
    /// Read-only dashboard over whatever `storage` holds.
    pub fn new(storage: Arc<dyn NewsStorage>) -> Self {
        Self {
            storage,
            pipeline: None,
        }
    }

    pub fn with_pipeline(mut self, pipeline: Pipeline, countries: Vec<String>, page_size: u32) -> Self {
        self.pipeline = Some(Refresher {
            pipeline,
            countries,
            page_size,
            lock: Mutex::new(()),
        });
        self
    }
}
