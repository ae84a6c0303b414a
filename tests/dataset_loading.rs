use std::{fs, path::PathBuf};

use price_estimator::{
    domain::{estimate, search, Catalogs, EstimateQuery, SearchFilter},
    infra::{load_dataset, DatasetError, ReloadDataset},
    DatasetStore,
};

const SPREADSHEET: &str = "\
date,time,address,development,suburb,seen,price,agent,office,com,type,bed,bath,gar,land
2024-02-10,10:00,12 Moyes Cres,,Kippax,y,\"$600,000\",AB,Kippax,,House,3,1,1,650 m2
11/03/2024,11:30,3 Hardwick Cres,,Kippax,,650k,CD,Kippax,,House,3,2,2,700
12-Apr-24,,7 Luxton St,,Kippax,,0.7m,AB,Kippax,,House,3,2,1,750sqm
,,1 Unknown Rd,,Kippax,,Auction,,,,House,3,,,
";

fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir()
        .join(format!("price-estimator-it-{}", std::process::id()))
        .join(test);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn test_csv_file_feeds_estimate() {
    let path = scratch_dir("csv-estimate").join("sales.csv");
    fs::write(&path, SPREADSHEET).unwrap();

    let snapshot = load_dataset(&path).unwrap();
    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot.source(), Some(path.as_path()));

    let query = EstimateQuery::new("Kippax")
        .with_bedrooms(3)
        .with_land_size(750.0)
        .with_bathrooms(3);
    let result = estimate(&query, &snapshot, &Catalogs::default());

    // baseline 650,000; land (750 - 700) * 180; bathrooms (3 - 5/3) * 8,000
    let expected = 650_000.0 + 9_000.0 + (3.0 - 5.0 / 3.0) * 8_000.0;
    assert!((result.estimate - expected).abs() < 1e-6);
    assert_eq!(result.comparables.len(), 3);
    let labels: Vec<&str> = result.breakdown.iter().map(|l| l.label.as_str()).collect();
    assert_eq!(
        labels,
        [
            "Baseline",
            "Quality multiplier",
            "Feature bonus",
            "Land adjustment",
            "Bathroom bonus"
        ]
    );
}

#[test]
fn test_json_file_with_wrapper() {
    let path = scratch_dir("json-wrapper").join("sales.json");
    fs::write(
        &path,
        r#"{"records": [
            {"address": "1 A St", "suburb": "Kaleen", "price": "1.1m", "bedrooms": 4, "sale_date": "2023-12-01"},
            {"address": "2 B St", "suburb": "Kaleen", "price": 980000, "bedrooms": "4"}
        ]}"#,
    )
    .unwrap();

    let snapshot = load_dataset(&path).unwrap();
    let filter = SearchFilter {
        suburb: Some("kal".to_string()),
        price_min: Some(1_000_000),
        ..SearchFilter::default()
    };
    let found = search(&snapshot, &filter);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].address, "1 A St");
}

#[test]
fn test_search_by_type_and_office() {
    let path = scratch_dir("listing-filters").join("sales.csv");
    fs::write(&path, SPREADSHEET).unwrap();
    let snapshot = load_dataset(&path).unwrap();

    let filter = SearchFilter {
        property_type: Some("house".to_string()),
        office: Some("Kippax".to_string()),
        min_bathrooms: Some(2),
        ..SearchFilter::default()
    };
    let found = search(&snapshot, &filter);
    let addresses: Vec<&str> = found.iter().map(|r| r.address.as_str()).collect();
    assert_eq!(addresses, ["3 Hardwick Cres", "7 Luxton St"]);

    let filter = SearchFilter {
        office: Some("Belconnen".to_string()),
        ..SearchFilter::default()
    };
    assert!(search(&snapshot, &filter).is_empty());
}

#[test]
fn test_missing_columns_are_reported_by_name() {
    let path = scratch_dir("missing-columns").join("sales.csv");
    fs::write(&path, "date,address,bed\n2024-01-01,1 A St,3\n").unwrap();

    match load_dataset(&path) {
        Err(DatasetError::MissingColumns(columns)) => assert_eq!(columns, ["price", "suburb"]),
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn test_store_reload_picks_up_file_changes() {
    let path = scratch_dir("reload").join("sales.csv");
    fs::write(&path, "address,suburb,price\n1 A St,Kippax,600000\n").unwrap();

    let store = DatasetStore::new(load_dataset(&path).unwrap());
    assert_eq!(store.current().len(), 1);

    fs::write(
        &path,
        "address,suburb,price\n1 A St,Kippax,600000\n2 B St,Kippax,700000\n",
    )
    .unwrap();
    let reloaded = store.reload().unwrap();
    assert_eq!(reloaded.len(), 2);

    fs::write(&path, "not,a,dataset\n").unwrap();
    assert!(store.reload().is_err());
    assert_eq!(store.current().len(), 2);
}
