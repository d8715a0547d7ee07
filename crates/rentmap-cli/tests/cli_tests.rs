//! End-to-end tests: config on disk → load → index → query JSON.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use rentmap_cli::{QueryCommand, RentmapConfig, load_index, run_query};
use rentmap_core::{Error, YearRange};
use rentmap_index::DuplicatePolicy;
use tempfile::TempDir;

const HEADER: &str = "YEAR,PLACE,GEO_ID,NAME,B25058_001E,B25057_001E,B25059_001E";

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn write_year(root: &Path, year: u16, rows: &[&str]) {
    let mut csv = HEADER.to_string();
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    write(root, &format!("masterfiles/contract_rent_masterfile_{year}.csv"), &csv);
    write(
        root,
        &format!("assets/contract_rent_mastergeometry_{year}.json"),
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature",
             "properties": {"GEO_ID": "1400000US06037570100", "INTPTLAT": "+33.7700", "INTPTLON": "-118.1900"},
             "geometry": {"type": "Point", "coordinates": [-118.19, 33.77]}}
        ]}"#,
    );
}

/// 2013-2015 fixture; Pasadena only appears in 2015.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_year(
        dir.path(),
        2013,
        &["2013,Long Beach,1400000US06037570100,Census Tract 5701,2001,900,2001"],
    );
    write_year(
        dir.path(),
        2014,
        &["2014,Long Beach,1400000US06037570200,Census Tract 5702,1100,900,1300"],
    );
    write_year(
        dir.path(),
        2015,
        &[
            "2015,Long Beach,1400000US06037570100,Census Tract 5701,1250,980,3501",
            "2015,Pasadena,1400000US06037460100,Census Tract 4601,,,",
        ],
    );
    write(
        dir.path(),
        "assets/fips.csv",
        "PLACE_FIPS,PLACENAME\n0643000,Long Beach\n0656000,Pasadena\n",
    );
    dir
}

fn config(dir: &TempDir) -> RentmapConfig {
    let mut config = RentmapConfig::default().with_data_root(dir.path().to_str().unwrap());
    config.years = YearRange::new(2013, 2015).unwrap();
    config.data.fips_file = Some("assets/fips.csv".to_string());
    config
}

#[tokio::test]
async fn test_load_index_from_disk() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    assert_eq!(loaded.stats.records_indexed, 4);
    assert_eq!(loaded.stats.partitions, 4);
    assert_eq!(loaded.stats.unlocated_records, 2);
    assert_eq!(loaded.index.available_years("Long Beach"), vec![2013, 2014, 2015]);
    assert_eq!(loaded.directory.name("0656000"), Some("Pasadena"));
}

#[tokio::test]
async fn test_places_query() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let value = run_query(&loaded, &QueryCommand::Places).unwrap();
    assert_eq!(value[0]["place"], "Long Beach");
    assert_eq!(value[0]["fips"], "0643000");
    assert_eq!(value[1]["years"], serde_json::json!([2015]));
    assert_eq!(value[1]["default_year"], 2015);
}

#[tokio::test]
async fn test_years_query_for_unknown_place_is_empty() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let value = run_query(
        &loaded,
        &QueryCommand::Years {
            place: "Lakewood".to_string(),
        },
    )
    .unwrap();
    assert_eq!(value["years"], serde_json::json!([]));
    assert!(value["default_year"].is_null());
}

#[tokio::test]
async fn test_records_query_sanitizes_caps() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let value = run_query(
        &loaded,
        &QueryCommand::Records {
            place: "Long Beach".to_string(),
            year: 2013,
        },
    )
    .unwrap();

    assert_eq!(value[0]["median_value"], 2001.0);
    assert_eq!(value[0]["display"]["median"], "Not available. Exceeds $2000!");
    assert_eq!(value[0]["centroid"]["lat"], 33.77);
}

#[tokio::test]
async fn test_records_query_not_found() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let err = run_query(
        &loaded,
        &QueryCommand::Records {
            place: "Pasadena".to_string(),
            year: 2013,
        },
    )
    .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_series_and_map_queries() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let series = run_query(
        &loaded,
        &QueryCommand::Series {
            place: "Long Beach".to_string(),
            tract: "Census Tract 5701".to_string(),
        },
    )
    .unwrap();
    assert_eq!(series["title"], "Median Contract Rents, 2013 to 2015");
    assert_eq!(series["points"].as_array().unwrap().len(), 2);
    assert_eq!(series["points"][1]["display"]["p75"], "Not available. Exceeds $3500!");

    let map = run_query(
        &loaded,
        &QueryCommand::Map {
            place: "Long Beach".to_string(),
            year: 2015,
            tract: Some("Census Tract 5701".to_string()),
        },
    )
    .unwrap();
    assert_eq!(map["highlighted"], "1400000US06037570100");
    assert_eq!(map["center"]["lon"], -118.19);
}

#[tokio::test]
async fn test_tracts_query() {
    let dir = fixture();
    let loaded = load_index(&config(&dir)).await.unwrap();

    let value = run_query(
        &loaded,
        &QueryCommand::Tracts {
            place: "Pasadena".to_string(),
            year: 2015,
        },
    )
    .unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[tokio::test]
async fn test_missing_year_fails_startup() {
    let dir = fixture();
    let mut config = config(&dir);
    config.years = YearRange::new(2013, 2016).unwrap();

    let err = load_index(&config).await.unwrap_err();
    assert!(matches!(err, Error::MissingSource { year: Some(2016), .. }));
}

#[tokio::test]
async fn test_duplicate_policy_from_config() {
    let dir = fixture();
    write_year(
        dir.path(),
        2015,
        &[
            "2015,Long Beach,1400000US06037570100,Census Tract 5701,1250,980,1600",
            "2015,Long Beach,1400000US06037570100,Census Tract 5701,1300,990,1700",
        ],
    );

    let mut config = config(&dir);
    assert!(matches!(
        load_index(&config).await.unwrap_err(),
        Error::DuplicateTract { .. }
    ));

    config.index.duplicate_policy = DuplicatePolicy::KeepFirst;
    let loaded = load_index(&config).await.unwrap();
    assert_eq!(loaded.stats.duplicates_dropped, 1);
    assert_eq!(
        loaded.index.record(2015, "Long Beach", "Census Tract 5701").unwrap().median_value,
        Some(1250.0)
    );
}

#[tokio::test]
async fn test_config_file_drives_load() {
    let dir = fixture();
    let config_path = dir.path().join("rentmap.toml");
    let root = dir.path().to_str().unwrap().replace('\\', "/");
    std::fs::write(
        &config_path,
        format!("[data]\nroot = \"{root}\"\n\n[years]\nstart = 2014\nend = 2015\n"),
    )
    .unwrap();

    let config = RentmapConfig::load(Some(config_path.to_str().unwrap())).unwrap();
    let loaded = load_index(&config).await.unwrap();

    assert_eq!(loaded.index.years().into_iter().collect::<Vec<_>>(), vec![2014, 2015]);
    assert!(loaded.directory.is_empty());
}
