use std::env;
use std::path::PathBuf;

use crate::util::persistence::Settings;

pub const DATASET_ENV: &str = "PRICE_ESTIMATOR_DATASET";
pub const CATALOG_ENV: &str = "PRICE_ESTIMATOR_CATALOG";
pub const LOG_ENV: &str = "PRICE_ESTIMATOR_LOG";

/// Runtime configuration: settings file, then environment, then CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub dataset_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub require_suburb: bool,
    pub recent_limit: usize,
    pub log_level: String,
}

impl AppConfig {
    /// Create config from the settings file and process environment
    pub fn from_env(settings: Settings) -> Self {
        Self::resolve(settings, |key| env::var(key).ok())
    }

    pub fn resolve(settings: Settings, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            dataset_path: non_empty(DATASET_ENV)
                .map(PathBuf::from)
                .or(settings.dataset_path),
            catalog_path: non_empty(CATALOG_ENV)
                .map(PathBuf::from)
                .or(settings.catalog_path),
            require_suburb: settings.require_suburb,
            recent_limit: settings.recent_limit.max(1),
            log_level: non_empty(LOG_ENV).unwrap_or(settings.log_level),
        }
    }

    pub fn with_overrides(
        mut self,
        dataset: Option<PathBuf>,
        catalog: Option<PathBuf>,
        verbose: bool,
    ) -> Self {
        if dataset.is_some() {
            self.dataset_path = dataset;
        }
        if catalog.is_some() {
            self.catalog_path = catalog;
        }
        if verbose {
            self.log_level = "debug".to_string();
        }
        self
    }

    /// Default tracing filter when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> String {
        format!("price_estimator={}", self.log_level)
    }
}
