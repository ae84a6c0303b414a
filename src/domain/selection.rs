//! Peer-group selection over the comparable dataset.

use tracing::debug;

use super::entities::ComparableRecord;

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// `target` must already be trimmed.
fn same_suburb(record: &ComparableRecord, target: &str) -> bool {
    record.suburb.trim().eq_ignore_ascii_case(target)
}

fn contains_ignore_case(value: Option<&str>, needle: &str) -> bool {
    value.is_some_and(|value| value.to_lowercase().contains(needle))
}

/// Priced records in `suburb`, narrowed to an exact bedroom match when that
/// leaves anything. Falls back to the whole suburb otherwise.
pub fn select_comparables<'a>(
    dataset: &'a [ComparableRecord],
    suburb: &str,
    bedrooms: Option<u32>,
) -> Vec<&'a ComparableRecord> {
    let target = suburb.trim();
    let pool: Vec<&ComparableRecord> = dataset
        .iter()
        .filter(|record| record.price.is_some() && same_suburb(record, target))
        .collect();
    let selected = narrow_by_bedrooms(pool, bedrooms);
    debug!(suburb, ?bedrooms, count = selected.len(), "selected comparables");
    selected
}

/// Same narrowing as [`select_comparables`] without a suburb filter.
pub fn select_from_all<'a>(
    dataset: &'a [ComparableRecord],
    bedrooms: Option<u32>,
) -> Vec<&'a ComparableRecord> {
    let pool = dataset.iter().filter(|record| record.price.is_some()).collect();
    narrow_by_bedrooms(pool, bedrooms)
}

fn narrow_by_bedrooms(
    pool: Vec<&ComparableRecord>,
    bedrooms: Option<u32>,
) -> Vec<&ComparableRecord> {
    let Some(target) = bedrooms else {
        return pool;
    };

    let exact: Vec<&ComparableRecord> = pool
        .iter()
        .copied()
        .filter(|record| record.bedrooms == Some(target))
        .collect();

    if exact.is_empty() {
        pool
    } else {
        exact
    }
}

/// Most recent sales in `suburb`, newest first. Undated sales sort oldest.
pub fn recent_sales<'a>(
    dataset: &'a [ComparableRecord],
    suburb: &str,
    limit: usize,
) -> Vec<&'a ComparableRecord> {
    let target = suburb.trim();
    let mut sales: Vec<&ComparableRecord> = dataset
        .iter()
        .filter(|record| same_suburb(record, target))
        .collect();
    sales.sort_by(|a, b| b.sale_date.cmp(&a.sale_date));
    sales.truncate(limit);
    sales
}

/// Listing search filters. Minimum counts and price bounds exclude records
/// that lack the corresponding value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchFilter {
    /// Case-insensitive substring match.
    pub suburb: Option<String>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub min_parking: Option<u32>,
    pub price_min: Option<u64>,
    pub price_max: Option<u64>,
    /// Case-insensitive substring match.
    pub property_type: Option<String>,
    /// Exact match.
    pub office: Option<String>,
}

impl SearchFilter {
    pub fn matches(&self, record: &ComparableRecord) -> bool {
        if let Some(suburb) = non_blank(&self.suburb) {
            if !contains_ignore_case(Some(record.suburb.as_str()), &suburb.to_lowercase()) {
                return false;
            }
        }
        if let Some(property_type) = non_blank(&self.property_type) {
            if !contains_ignore_case(record.property_type.as_deref(), &property_type.to_lowercase())
            {
                return false;
            }
        }
        if let Some(office) = non_blank(&self.office) {
            if record.office.as_deref().map(str::trim) != Some(office) {
                return false;
            }
        }

        let at_least = |value: Option<u32>, minimum: Option<u32>| match minimum {
            Some(min) => value.is_some_and(|v| v >= min),
            None => true,
        };
        if !at_least(record.bedrooms, self.min_bedrooms)
            || !at_least(record.bathrooms, self.min_bathrooms)
            || !at_least(record.parking, self.min_parking)
        {
            return false;
        }

        if let Some(min) = self.price_min {
            if record.price.map_or(true, |price| price < min) {
                return false;
            }
        }
        if let Some(max) = self.price_max {
            if record.price.map_or(true, |price| price > max) {
                return false;
            }
        }

        true
    }
}

/// Matching records, oldest sale first with undated records last.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

pub fn search<'a>(dataset: &'a [ComparableRecord], filter: &SearchFilter) -> Vec<&'a ComparableRecord> {
    let mut matches: Vec<&ComparableRecord> =
        dataset.iter().filter(|record| filter.matches(record)).collect();
    matches.sort_by_key(|record| (record.sale_date.is_none(), record.sale_date));
    matches
}
