//! Comparable-sales price estimation for residential property.
//!
//! The engine in [`domain`] is pure: it takes an immutable dataset snapshot,
//! a query and the catalogs, and returns an estimate with its breakdown.
//! [`infra`] loads datasets and catalog files from disk.

pub mod config;
pub mod domain;
pub mod infra;
pub mod ui;
pub mod util;

pub use domain::{
    estimate, recent_sales, search, select_comparables, Catalogs, ComparableRecord,
    DatasetSnapshot, DatasetStore, EstimateQuery, EstimateResult, SearchFilter,
};
pub use infra::{load_dataset, DatasetError, ReloadDataset};
