//! Display formatting for estimate line items.

use super::entities::BreakdownLine;
use super::evaluation::{Adjustments, BaselineSource};

/// `$1,234,567`; negative amounts render as `-$9,000`; absent values as `N/A`.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(value) = value.filter(|v| v.is_finite()) else {
        return "N/A".to_string();
    };

    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if rounded < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

pub fn format_multiplier(multiplier: f64) -> String {
    format!("× {multiplier:.2}")
}

pub fn format_range(low: f64, high: f64) -> String {
    format!(
        "{} - {}",
        format_currency(Some(low)),
        format_currency(Some(high))
    )
}

/// Baseline, quality multiplier and feature bonus are always listed; the
/// rest only when they move the estimate.
pub fn breakdown_lines(adjustments: &Adjustments, suburb: Option<&str>) -> Vec<BreakdownLine> {
    let mut lines = Vec::with_capacity(7);

    let baseline_note = match adjustments.baseline_source {
        BaselineSource::Comparables => match suburb {
            Some(suburb) => format!(
                "Average of {} comparable sales in {suburb}",
                adjustments.comparable_count
            ),
            None => format!("Average of {} comparable sales", adjustments.comparable_count),
        },
        BaselineSource::Dataset => format!(
            "No comparables found; average of {} sales across the dataset",
            adjustments.dataset_count
        ),
        BaselineSource::Empty => "No priced sales available".to_string(),
    };
    lines.push(line(
        "Baseline",
        format_currency(Some(adjustments.baseline)),
        Some(baseline_note),
    ));

    let quality_note = if adjustments.rated_sections == 0 {
        "No quality ratings applied".to_string()
    } else {
        format!("Average of {} rated sections", adjustments.rated_sections)
    };
    lines.push(line(
        "Quality multiplier",
        format_multiplier(adjustments.quality_multiplier),
        Some(quality_note),
    ));

    let feature_note =
        (!adjustments.features_applied.is_empty()).then(|| adjustments.features_applied.join(", "));
    lines.push(line(
        "Feature bonus",
        format_currency(Some(adjustments.feature_bonus)),
        feature_note,
    ));

    if let Some(land) = &adjustments.land {
        lines.push(line(
            "Land adjustment",
            format_currency(Some(land.amount)),
            Some(format!(
                "{:.0} m² vs peer average {:.0} m²",
                land.subject, land.peer_mean
            )),
        ));
    }

    if let Some(bathrooms) = &adjustments.bathroom_bonus {
        lines.push(line(
            "Bathroom bonus",
            format_currency(Some(bathrooms.amount)),
            Some(format!(
                "{:.0} bathrooms vs peer average {:.1}",
                bathrooms.subject, bathrooms.peer_mean
            )),
        ));
    }

    if let Some(parking) = &adjustments.parking_bonus {
        lines.push(line(
            "Parking bonus",
            format_currency(Some(parking.amount)),
            Some(format!(
                "{:.0} spaces vs peer average {:.1}",
                parking.subject, parking.peer_mean
            )),
        ));
    }

    if let Some(age) = &adjustments.age {
        lines.push(line(
            "Building age",
            format_currency(Some(age.amount)),
            Some(format!("{} years old", age.years)),
        ));
    }

    lines
}

fn line(label: &str, value: String, description: Option<String>) -> BreakdownLine {
    BreakdownLine {
        label: label.to_string(),
        value,
        description,
    }
}
