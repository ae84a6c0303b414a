//! Pricing logic for comparable-sales estimates lives here.

pub mod breakdown;
pub mod catalog;
pub mod entities;
pub mod evaluation;
pub mod parsing;
pub mod query;
pub mod selection;
pub mod snapshot;

pub use breakdown::{format_currency, format_multiplier};
pub use catalog::{CatalogError, Catalogs};
pub use entities::{
    BreakdownLine, ComparableRecord, ComparableView, Confidence, EstimateQuery, EstimateResult,
    FeatureOption, PriceRange, QualityLevel, QualitySection,
};
pub use evaluation::{age_adjustment, compute_adjustments, estimate, Adjustments};
pub use query::{QueryError, QueryInput};
pub use selection::{
    recent_sales, search, select_comparables, SearchFilter, DEFAULT_RECENT_LIMIT,
};
pub use snapshot::{DatasetSnapshot, DatasetStore, ReloadError};
