// Application state module
// Shared by both listeners for the lifetime of the process

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::types::Config;
use crate::bom::{render_bridge, PatchOutcome};
use crate::catalog::LookupTable;
use crate::logger;
use crate::store::ComponentStore;

/// Path of the resolve endpoint, also baked into the bridge script
pub const LIGHTUP_PATH: &str = "/lightup";

/// Application state
pub struct AppState {
    pub config: Config,
    /// Viewer's lookup table, loaded at startup and swapped on reload
    pub table: RwLock<LookupTable>,
    /// Backing file; the manager reads it on every request
    pub store: ComponentStore,
    /// Serial bridge markup injected into the BOM page
    pub bridge: String,

    // Cached config values for fast access without locks
    pub cached_access_log: AtomicBool,

    patch_reported: AtomicBool,
}

impl AppState {
    /// Build state and load the table from the configured file
    pub async fn new(config: &Config) -> Self {
        let store = ComponentStore::new(&config.catalog.components_file);
        let table = store.load().await;
        logger::log_table_loaded(table.len(), store.path());
        Self::with_table(config, store, table)
    }

    /// Build state around an already loaded table
    pub fn with_table(config: &Config, store: ComponentStore, table: LookupTable) -> Self {
        Self {
            bridge: render_bridge(config.serial.baud_rate, LIGHTUP_PATH),
            cached_access_log: AtomicBool::new(config.logging.access_log),
            config: config.clone(),
            table: RwLock::new(table),
            store,
            patch_reported: AtomicBool::new(false),
        }
    }

    /// Re-read the component file into the viewer's table
    pub async fn reload_table(&self) -> usize {
        let table = self.store.load().await;
        let count = table.len();
        *self.table.write().await = table;
        logger::log_table_loaded(count, self.store.path());
        count
    }

    pub fn access_log_enabled(&self) -> bool {
        self.cached_access_log.load(Ordering::Relaxed)
    }

    /// Log the BOM patch outcome the first time a page is rendered
    pub fn report_patch_outcome(&self, outcome: PatchOutcome) {
        if !self.patch_reported.swap(true, Ordering::Relaxed) {
            logger::log_patch_outcome(outcome);
        }
    }
}
