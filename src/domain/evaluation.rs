//! Comparable-sales estimate: baseline, quality multiplier and additive adjustments.

use tracing::debug;

use super::breakdown::{breakdown_lines, format_currency, format_range};
use super::catalog::Catalogs;
use super::entities::{ComparableRecord, Confidence, EstimateQuery, EstimateResult, PriceRange};
use super::selection::{select_comparables, select_from_all};

/// Dollars per square metre above or below the peer average.
pub const LAND_RATE_PER_SQM: f64 = 180.0;
/// Dollars per bathroom above the peer average.
pub const BATHROOM_RATE: f64 = 8_000.0;
/// Dollars per parking space above the peer average.
pub const PARKING_RATE: f64 = 6_000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaselineSource {
    Comparables,
    Dataset,
    Empty,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PeerDelta {
    pub amount: f64,
    pub subject: f64,
    pub peer_mean: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgeAdjustment {
    pub amount: f64,
    pub years: u32,
}

/// Numeric components of an estimate before formatting.
#[derive(Clone, Debug, PartialEq)]
pub struct Adjustments {
    pub baseline: f64,
    pub baseline_source: BaselineSource,
    pub comparable_count: usize,
    pub dataset_count: usize,
    pub quality_multiplier: f64,
    pub rated_sections: usize,
    pub feature_bonus: f64,
    pub features_applied: Vec<String>,
    pub land: Option<PeerDelta>,
    pub bathroom_bonus: Option<PeerDelta>,
    pub parking_bonus: Option<PeerDelta>,
    pub age: Option<AgeAdjustment>,
}

impl Adjustments {
    /// Never below zero.
    pub fn total(&self) -> f64 {
        let additive = self.feature_bonus
            + self.land.as_ref().map_or(0.0, |d| d.amount)
            + self.bathroom_bonus.as_ref().map_or(0.0, |d| d.amount)
            + self.parking_bonus.as_ref().map_or(0.0, |d| d.amount)
            + self.age.as_ref().map_or(0.0, |a| a.amount);
        (self.baseline * self.quality_multiplier + additive).max(0.0)
    }
}

/// Prices the subject property against `dataset`. Pure: identical inputs give
/// identical results.
pub fn estimate(
    query: &EstimateQuery,
    dataset: &[ComparableRecord],
    catalogs: &Catalogs,
) -> EstimateResult {
    let suburb = query.suburb_filter();
    let comparables = match suburb {
        Some(suburb) => select_comparables(dataset, suburb, query.bedrooms),
        None => select_from_all(dataset, query.bedrooms),
    };

    let adjustments = compute_adjustments(query, &comparables, dataset, catalogs);
    let value = adjustments.total();

    let confidence = Confidence::from_comparable_count(comparables.len());
    let spread = confidence.spread();
    let low = (value * (1.0 - spread)).max(0.0);
    let high = (value * (1.0 + spread)).max(0.0);

    debug!(
        suburb = suburb.unwrap_or("*"),
        comparables = comparables.len(),
        baseline = adjustments.baseline,
        multiplier = adjustments.quality_multiplier,
        estimate = value,
        "computed estimate"
    );

    EstimateResult {
        estimate: value,
        display: format_currency(Some(value)),
        breakdown: breakdown_lines(&adjustments, suburb),
        comparables: comparables.into_iter().cloned().collect(),
        confidence,
        range: PriceRange {
            low,
            high,
            display: format_range(low, high),
        },
    }
}

pub fn compute_adjustments(
    query: &EstimateQuery,
    comparables: &[&ComparableRecord],
    dataset: &[ComparableRecord],
    catalogs: &Catalogs,
) -> Adjustments {
    let dataset_prices: Vec<f64> = dataset
        .iter()
        .filter_map(|record| record.price)
        .map(|price| price as f64)
        .collect();

    let (baseline, baseline_source) =
        match mean(comparables.iter().filter_map(|r| r.price).map(|p| p as f64)) {
            Some(avg) => (avg, BaselineSource::Comparables),
            None => match mean(dataset_prices.iter().copied()) {
                Some(avg) => (avg, BaselineSource::Dataset),
                None => (0.0, BaselineSource::Empty),
            },
        };

    // Section names are free-form; only the level id has to be in the catalog.
    let multipliers: Vec<f64> = query
        .quality
        .values()
        .filter_map(|level| catalogs.level(level))
        .map(|level| level.multiplier)
        .collect();
    let quality_multiplier = mean(multipliers.iter().copied()).unwrap_or(1.0);

    let mut feature_bonus = 0.0;
    let mut features_applied = Vec::new();
    for feature in query.features.iter().filter_map(|id| catalogs.feature(id)) {
        feature_bonus += feature.adjustment;
        features_applied.push(feature.label.clone());
    }

    let land = query.land_size.and_then(|subject| {
        let peer_mean = mean(comparables.iter().filter_map(|r| r.land_size))?;
        let amount = (subject - peer_mean) * LAND_RATE_PER_SQM;
        (amount != 0.0).then_some(PeerDelta {
            amount,
            subject,
            peer_mean,
        })
    });

    let bathroom_bonus = excess_bonus(
        query.bathrooms,
        comparables.iter().filter_map(|r| r.bathrooms),
        BATHROOM_RATE,
    );
    let parking_bonus = excess_bonus(
        query.parking,
        comparables.iter().filter_map(|r| r.parking),
        PARKING_RATE,
    );

    let age = query.building_age.and_then(|years| {
        let amount = age_adjustment(years);
        (amount != 0.0).then_some(AgeAdjustment { amount, years })
    });

    Adjustments {
        baseline,
        baseline_source,
        comparable_count: comparables.len(),
        dataset_count: dataset_prices.len(),
        quality_multiplier,
        rated_sections: multipliers.len(),
        feature_bonus,
        features_applied,
        land,
        bathroom_bonus,
        parking_bonus,
        age,
    }
}

/// Only rewards counts above the peer average; never negative.
fn excess_bonus(
    subject: Option<u32>,
    peers: impl Iterator<Item = u32>,
    rate: f64,
) -> Option<PeerDelta> {
    let subject = f64::from(subject?);
    let peer_mean = mean(peers.map(f64::from))?;
    (subject > peer_mean).then(|| PeerDelta {
        amount: (subject - peer_mean) * rate,
        subject,
        peer_mean,
    })
}

/// Stepped by building age in years.
pub fn age_adjustment(years: u32) -> f64 {
    match years {
        0..=5 => 25_000.0,
        6..=15 => 12_000.0,
        16..=24 => 0.0,
        25..=39 => -9_000.0,
        _ => -18_000.0,
    }
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0_usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}
