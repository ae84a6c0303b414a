//! CSV/JSON readers for comparable-sales datasets.
//!
//! - CSV headers and JSON keys are trimmed, lower-cased and matched against the same
//!   alias lists (`bed`, `gar`, `land`, ...). The first alias present wins.
//! - Cell values go through the tolerant field parsers; bad cells become absent values.

use std::{
    fs::{self, File},
    io::{self, Read},
    path::Path,
    sync::Arc,
};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::parsing::{parse_count, parse_date, parse_land_size, parse_price};
use crate::domain::{ComparableRecord, DatasetSnapshot, DatasetStore, ReloadError};

pub const REQUIRED_COLUMNS: [&str; 3] = ["address", "suburb", "price"];

const ADDRESS_COLUMNS: [&str; 1] = ["address"];
const SUBURB_COLUMNS: [&str; 1] = ["suburb"];
const PRICE_COLUMNS: [&str; 1] = ["price"];
const BEDROOM_COLUMNS: [&str; 3] = ["bed", "bedrooms", "beds"];
const BATHROOM_COLUMNS: [&str; 3] = ["bath", "bathrooms", "baths"];
const PARKING_COLUMNS: [&str; 4] = ["gar", "garages", "parking", "car"];
const LAND_COLUMNS: [&str; 3] = ["land", "land_size", "land size"];
const DATE_COLUMNS: [&str; 3] = ["date", "sale_date", "sold_date"];
const TYPE_COLUMNS: [&str; 2] = ["type", "property_type"];
const OFFICE_COLUMNS: [&str; 1] = ["office"];

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
    #[error("json dataset must be an array of sales or hold a `records`/`sales` array")]
    NotARecordList,
    #[error("unsupported dataset format: {0}")]
    UnsupportedFormat(String),
}

/// Loads a dataset file, picking the reader from the extension.
pub fn load_dataset(path: &Path) -> Result<DatasetSnapshot, DatasetError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let records = match extension.as_str() {
        "csv" => read_csv(File::open(path)?)?,
        "json" => read_json(&fs::read_to_string(path)?)?,
        other => return Err(DatasetError::UnsupportedFormat(other.to_string())),
    };

    info!(
        path = %path.display(),
        records = records.len(),
        priced = records.iter().filter(|r| r.price.is_some()).count(),
        "loaded comparable dataset"
    );
    Ok(DatasetSnapshot::new(records).with_source(path))
}

/// Reloads a [`DatasetStore`] from the source file of its current snapshot.
pub trait ReloadDataset {
    fn reload(&self) -> Result<Arc<DatasetSnapshot>, ReloadError<DatasetError>>;
}

impl ReloadDataset for DatasetStore {
    fn reload(&self) -> Result<Arc<DatasetSnapshot>, ReloadError<DatasetError>> {
        self.reload_with(load_dataset)
    }
}

/// Text fields of one sale before parsing.
#[derive(Clone, Debug, Default)]
struct RawRecord {
    address: Option<String>,
    suburb: Option<String>,
    bedrooms: Option<String>,
    bathrooms: Option<String>,
    parking: Option<String>,
    price: Option<String>,
    land_size: Option<String>,
    sale_date: Option<String>,
    property_type: Option<String>,
    office: Option<String>,
}

impl RawRecord {
    /// `field` yields the value of the first alias present in the row.
    fn from_fields(field: impl Fn(&[&str]) -> Option<String>) -> Self {
        Self {
            address: field(&ADDRESS_COLUMNS),
            suburb: field(&SUBURB_COLUMNS),
            bedrooms: field(&BEDROOM_COLUMNS),
            bathrooms: field(&BATHROOM_COLUMNS),
            parking: field(&PARKING_COLUMNS),
            price: field(&PRICE_COLUMNS),
            land_size: field(&LAND_COLUMNS),
            sale_date: field(&DATE_COLUMNS),
            property_type: field(&TYPE_COLUMNS),
            office: field(&OFFICE_COLUMNS),
        }
    }
}

impl From<RawRecord> for ComparableRecord {
    fn from(raw: RawRecord) -> Self {
        let trimmed = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            address: trimmed(raw.address).unwrap_or_default(),
            suburb: trimmed(raw.suburb).unwrap_or_default(),
            bedrooms: raw.bedrooms.as_deref().and_then(parse_count),
            bathrooms: raw.bathrooms.as_deref().and_then(parse_count),
            parking: raw.parking.as_deref().and_then(parse_count),
            price: raw.price.as_deref().and_then(parse_price),
            land_size: raw
                .land_size
                .as_deref()
                .and_then(parse_land_size)
                .filter(|size| *size > 0.0),
            sale_date: raw.sale_date.as_deref().and_then(parse_date),
            property_type: trimmed(raw.property_type),
            office: trimmed(raw.office),
        }
    }
}

fn position_of(headers: &[String], names: &[&str]) -> Option<usize> {
    names
        .iter()
        .find_map(|name| headers.iter().position(|header| header.as_str() == *name))
}

/// Lower-cased CSV header row that passed the required-column check.
struct ColumnMap {
    headers: Vec<String>,
}

impl ColumnMap {
    fn from_headers(headers: Vec<String>) -> Result<Self, DatasetError> {
        let mut missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|name| position_of(&headers, &[**name]).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(DatasetError::MissingColumns(missing));
        }
        Ok(Self { headers })
    }

    fn raw_record(&self, row: &csv::StringRecord) -> RawRecord {
        RawRecord::from_fields(|names: &[&str]| {
            position_of(&self.headers, names)
                .and_then(|i| row.get(i))
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
    }
}

pub fn read_csv<R: Read>(reader: R) -> Result<Vec<ComparableRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_lowercase())
        .collect();
    let columns = ColumnMap::from_headers(headers)?;

    let mut records = Vec::new();
    for (line, row) in reader.records().enumerate() {
        match row {
            Ok(row) => records.push(ComparableRecord::from(columns.raw_record(&row))),
            Err(err) => warn!(row = line + 1, "skipping unreadable csv row: {err}"),
        }
    }
    Ok(records)
}

/// Accepts a top-level array or `{"records": [...]}` / `{"sales": [...]}`.
pub fn read_json(content: &str) -> Result<Vec<ComparableRecord>, DatasetError> {
    let rows = match serde_json::from_str::<Value>(content)? {
        Value::Array(rows) => rows,
        Value::Object(mut wrapper) => {
            match wrapper.remove("records").or_else(|| wrapper.remove("sales")) {
                Some(Value::Array(rows)) => rows,
                _ => return Err(DatasetError::NotARecordList),
            }
        }
        _ => return Err(DatasetError::NotARecordList),
    };

    let mut records = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        match row {
            Value::Object(fields) => records.push(ComparableRecord::from(json_record(fields))),
            other => warn!(row = index + 1, "skipping json row that is not an object: {other}"),
        }
    }
    Ok(records)
}

fn json_record(fields: &Map<String, Value>) -> RawRecord {
    let keyed: Vec<(String, &Value)> = fields
        .iter()
        .map(|(key, value)| (key.trim().to_lowercase(), value))
        .collect();

    RawRecord::from_fields(|names: &[&str]| {
        names
            .iter()
            .find_map(|name| keyed.iter().find(|(key, _)| key.as_str() == *name))
            .and_then(|(_, value)| json_text(value))
    })
}

/// Scalars as text; nulls, objects and arrays are absent.
fn json_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month};

    const SAMPLE: &str = "\
Date,Time,Address,Suburb,Price,Agent,Type,Bed,Bath,Gar,Land
2024-03-05,11:00,12 Moyes Cres,Kippax,\"$650,000\",AB,House,3,1,2,702 m2
05/04/2024,,3 Hardwick Cres,Kippax,Auction,CD,House,4,2,2,
,,7 Luxton St,kippax,720k,,Townhouse,three,1,,
";

    #[test]
    fn reads_spreadsheet_rows_tolerantly() {
        let records = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.address, "12 Moyes Cres");
        assert_eq!(first.price, Some(650_000));
        assert_eq!(first.bedrooms, Some(3));
        assert_eq!(first.parking, Some(2));
        assert_eq!(first.land_size, Some(702.0));
        assert_eq!(
            first.sale_date,
            Some(Date::from_calendar_date(2024, Month::March, 5).unwrap())
        );

        assert_eq!(records[1].price, None);
        assert_eq!(
            records[1].sale_date,
            Some(Date::from_calendar_date(2024, Month::April, 5).unwrap())
        );
        assert_eq!(records[2].bedrooms, None);
        assert_eq!(records[2].price, Some(720_000));
        assert_eq!(records[2].sale_date, None);
    }

    #[test]
    fn reports_missing_required_columns() {
        let err = read_csv("Address,Bed\n1 Test St,3\n".as_bytes()).unwrap_err();
        match err {
            DatasetError::MissingColumns(missing) => assert_eq!(missing, ["price", "suburb"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn headers_are_case_and_space_insensitive() {
        let csv = " ADDRESS , Suburb ,PRICE, Bedrooms \n1 Test St,Kaleen,1.1m,4\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].suburb, "Kaleen");
        assert_eq!(records[0].price, Some(1_100_000));
        assert_eq!(records[0].bedrooms, Some(4));
    }

    #[test]
    fn short_rows_are_accepted() {
        let csv = "address,suburb,price,bed\n1 Test St,Kippax\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, None);
    }

    #[test]
    fn json_array_with_mixed_value_types() {
        let json = r#"[
            {"address": "1 Test St", "suburb": "Kippax", "price": 650000, "bed": 3, "land": "700"},
            {"address": "2 Test St", "suburb": "Kippax", "price": "$1.2m", "date": "01-Feb-24"}
        ]"#;
        let records = read_json(json).unwrap();
        assert_eq!(records[0].price, Some(650_000));
        assert_eq!(records[0].bedrooms, Some(3));
        assert_eq!(records[0].land_size, Some(700.0));
        assert_eq!(records[1].price, Some(1_200_000));
        assert_eq!(
            records[1].sale_date,
            Some(Date::from_calendar_date(2024, Month::February, 1).unwrap())
        );
    }

    #[test]
    fn json_wrapped_records() {
        let json = r#"{"sales": [{"address": "1 Test St", "suburb": "Kaleen", "price": null}]}"#;
        let records = read_json(json).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price, None);
    }

    #[test]
    fn structured_json_cells_read_as_absent() {
        let json = r#"[
            {"address": "1 Test St", "suburb": "Kippax", "price": 650000},
            {"address": "2 Test St", "suburb": "Kippax", "price": {"amount": 700000}, "bed": [3]}
        ]"#;
        let records = read_json(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].price, Some(650_000));
        assert_eq!(records[1].price, None);
        assert_eq!(records[1].bedrooms, None);
    }

    #[test]
    fn json_aliases_resolve_like_csv_headers() {
        let json = r#"[{
            "Address": "1 Test St",
            " SUBURB ": "Kippax",
            "price": "650k",
            "date": "2024-01-01",
            "sale_date": "2024-01-02",
            "bed": 3,
            "bedrooms": 4,
            "land size": "700 m2"
        }]"#;
        let records = read_json(json).unwrap();
        let record = &records[0];
        assert_eq!(record.address, "1 Test St");
        assert_eq!(record.suburb, "Kippax");
        assert_eq!(
            record.sale_date,
            Some(Date::from_calendar_date(2024, Month::January, 1).unwrap())
        );
        assert_eq!(record.bedrooms, Some(3));
        assert_eq!(record.land_size, Some(700.0));
    }

    #[test]
    fn csv_land_size_header_with_space() {
        let csv = "address,suburb,price,land size\n1 Test St,Kippax,650k,712 m2\n";
        let records = read_csv(csv.as_bytes()).unwrap();
        assert_eq!(records[0].land_size, Some(712.0));
    }

    #[test]
    fn listing_type_and_office_are_kept() {
        let records = read_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records[0].property_type.as_deref(), Some("House"));
        assert_eq!(records[2].property_type.as_deref(), Some("Townhouse"));
        assert_eq!(records[0].office, None);

        let json = r#"[{"address": "1 Test St", "suburb": "Kippax", "property_type": "Unit", "office": " Belconnen "}]"#;
        let records = read_json(json).unwrap();
        assert_eq!(records[0].property_type.as_deref(), Some("Unit"));
        assert_eq!(records[0].office.as_deref(), Some("Belconnen"));
    }

    #[test]
    fn non_object_json_rows_are_skipped() {
        let json = r#"[{"address": "1 Test St", "suburb": "Kippax"}, 42, "row", null]"#;
        assert_eq!(read_json(json).unwrap().len(), 1);
    }

    #[test]
    fn json_without_record_list_is_rejected() {
        for json in [r#"{"rows": []}"#, r#"{"records": {}}"#, "7"] {
            assert!(matches!(read_json(json), Err(DatasetError::NotARecordList)), "{json}");
        }
    }

    #[test]
    fn reload_needs_a_source_file() {
        let store = DatasetStore::new(DatasetSnapshot::new(vec![]));
        assert!(matches!(store.reload(), Err(ReloadError::NoSource)));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_dataset(Path::new("sales.xlsx")).unwrap_err();
        assert!(matches!(err, DatasetError::UnsupportedFormat(ext) if ext == "xlsx"));
    }
}
