//! Plain-text rendering of estimates and sale tables for the terminal.

use std::fmt::Write as _;

use crate::domain::{Catalogs, ComparableRecord, ComparableView, EstimateResult};

pub fn render_estimate(suburb: &str, result: &EstimateResult) -> String {
    let mut out = String::new();
    let heading = if suburb.trim().is_empty() {
        "Estimate".to_string()
    } else {
        format!("Estimate for {}", suburb.trim())
    };
    let _ = writeln!(out, "{heading}: {}", result.display);
    let _ = writeln!(
        out,
        "Range: {} ({} confidence, {} comparables)",
        result.range.display,
        result.confidence.label(),
        result.comparables.len()
    );
    out.push('\n');

    let label_width = width(result.breakdown.iter().map(|line| line.label.as_str()));
    let value_width = width(result.breakdown.iter().map(|line| line.value.as_str()));
    for line in &result.breakdown {
        let _ = write!(
            out,
            "  {}  {}",
            pad(&line.label, label_width),
            pad(&line.value, value_width)
        );
        if let Some(description) = &line.description {
            let _ = write!(out, "  {description}");
        }
        out.push('\n');
    }
    out
}

pub fn render_records(title: &str, records: &[&ComparableRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title} ({})", records.len());
    if records.is_empty() {
        out.push_str("  No sales found.\n");
        return out;
    }

    let headers = ["Date", "Address", "Suburb", "Type", "Bed", "Bath", "Car", "Land", "Price"];
    let rows: Vec<[String; 9]> = records
        .iter()
        .map(|record| row_cells(record.to_view()))
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            width(
                std::iter::once(headers[col]).chain(rows.iter().map(|row| row[col].as_str())),
            )
        })
        .collect();

    let header_cells: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(header, w)| pad(header, *w))
        .collect();
    let _ = writeln!(out, "  {}", header_cells.join("  ").trim_end());

    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| pad(cell, *w))
            .collect();
        let _ = writeln!(out, "  {}", cells.join("  ").trim_end());
    }
    out
}

pub fn render_catalog(catalogs: &Catalogs) -> String {
    let mut out = String::new();

    out.push_str("Quality sections\n");
    for section in catalogs.sections() {
        let _ = writeln!(out, "  {:<14} {}", section.id, section.label);
    }

    out.push_str("\nQuality levels\n");
    for level in catalogs.levels() {
        let _ = writeln!(
            out,
            "  {:<14} × {:.2}  {}",
            level.id, level.multiplier, level.label
        );
    }

    out.push_str("\nFeatures\n");
    for feature in catalogs.features() {
        let _ = writeln!(
            out,
            "  {:<14} {:>9}  {}",
            feature.id,
            crate::domain::format_currency(Some(feature.adjustment)),
            feature.label
        );
    }
    out
}

fn row_cells(view: ComparableView) -> [String; 9] {
    let count = |value: Option<u32>| value.map(|v| v.to_string()).unwrap_or_else(|| "—".to_string());
    [
        view.sale_date,
        view.address,
        view.suburb,
        view.property_type,
        count(view.bedrooms),
        count(view.bathrooms),
        count(view.parking),
        view.land,
        view.price,
    ]
}

fn width<'a>(values: impl Iterator<Item = &'a str>) -> usize {
    values.map(|value| value.chars().count()).max().unwrap_or(0)
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        value.to_string()
    } else {
        format!("{value}{}", " ".repeat(width - len))
    }
}
