//! Integration tests for loading yearly tables and geometry from disk.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::path::Path;
use std::sync::Arc;

use rentmap_core::{Centroid, Error, SourceKind, YearRange};
use rentmap_ingest::{DatasetLoader, FsSource, SourceLayout, open_source};
use tempfile::TempDir;

const HEADER: &str = "YEAR,PLACE,GEO_ID,NAME,B25058_001E,B25057_001E,B25059_001E";

fn write(root: &Path, name: &str, content: &str) {
    let path = root.join(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn write_year(root: &Path, year: u16, rows: &[&str], features: &str) {
    let mut csv = HEADER.to_string();
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    write(root, &format!("masterfiles/contract_rent_masterfile_{year}.csv"), &csv);
    write(
        root,
        &format!("assets/contract_rent_mastergeometry_{year}.json"),
        &format!(r#"{{"type": "FeatureCollection", "features": [{features}]}}"#),
    );
}

fn feature(geo_id: &str, lat: f64, lon: f64) -> String {
    format!(
        r#"{{"type": "Feature", "properties": {{"GEO_ID": "{geo_id}", "INTPTLAT": "+{lat}", "INTPTLON": "{lon}"}}, "geometry": null}}"#
    )
}

fn loader(root: &Path) -> DatasetLoader {
    DatasetLoader::new(Arc::new(FsSource::new(root)))
}

#[tokio::test]
async fn test_load_joins_centroids_and_keeps_unmatched_rows() {
    let dir = TempDir::new().unwrap();
    write_year(
        dir.path(),
        2015,
        &[
            "2015,Long Beach,g1,Census Tract 5701,1250,980,1600",
            "2015,Long Beach,g2,Census Tract 5702,,,",
        ],
        &feature("g1", 33.77, -118.19),
    );
    write_year(
        dir.path(),
        2016,
        &["2016,Long Beach,g1,Census Tract 5701,1300,1000,1700"],
        &feature("g1", 33.77, -118.19),
    );

    let dataset = loader(dir.path())
        .load(YearRange::new(2015, 2016).unwrap())
        .await
        .unwrap();

    assert_eq!(dataset.years().collect::<Vec<_>>(), vec![2015, 2016]);
    assert_eq!(dataset.row_count(2015), 2);
    assert_eq!(dataset.total_features(), 2);

    let rows = &dataset.tables[&2015];
    assert_eq!(rows[0].centroid, Some(Centroid::new(33.77, -118.19)));
    assert!(rows[1].centroid.is_none());
    assert_eq!(rows[1].display.median, "Not Available!");
}

#[tokio::test]
async fn test_missing_geometry_fails_whole_load() {
    let dir = TempDir::new().unwrap();
    write_year(
        dir.path(),
        2015,
        &["2015,Long Beach,g1,Census Tract 5701,1250,980,1600"],
        "",
    );
    write(
        dir.path(),
        "masterfiles/contract_rent_masterfile_2016.csv",
        &format!("{HEADER}\n2016,Long Beach,g1,Census Tract 5701,1300,1000,1700"),
    );

    let err = loader(dir.path())
        .load(YearRange::new(2015, 2016).unwrap())
        .await
        .unwrap_err();

    match err {
        Error::MissingSource { kind, year, .. } => {
            assert_eq!(kind, SourceKind::Geometry);
            assert_eq!(year, Some(2016));
        }
        other => panic!("expected MissingSource, got {other}"),
    }
}

#[tokio::test]
async fn test_missing_table_fails() {
    let dir = TempDir::new().unwrap();
    let err = loader(dir.path())
        .load(YearRange::new(2020, 2020).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingSource { .. }));
}

#[tokio::test]
async fn test_schema_error_names_file() {
    let dir = TempDir::new().unwrap();
    write_year(
        dir.path(),
        2015,
        &["2015,Long Beach,g1,Census Tract 5701,twelve,980,1600"],
        "",
    );

    let err = loader(dir.path())
        .load(YearRange::new(2015, 2015).unwrap())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Schema { .. }));
    assert!(err.to_string().contains("contract_rent_masterfile_2015.csv"));
}

#[tokio::test]
async fn test_custom_layout() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "rent-2019.csv",
        &format!("{HEADER}\n2019,Pasadena,g9,Census Tract 4601,3501,2500,3501"),
    );
    write(
        dir.path(),
        "geo-2019.json",
        r#"{"type": "FeatureCollection", "features": []}"#,
    );

    let dataset = loader(dir.path())
        .with_layout(SourceLayout::new("rent-{year}.csv", "geo-{year}.json").unwrap())
        .load(YearRange::new(2019, 2019).unwrap())
        .await
        .unwrap();

    assert_eq!(
        dataset.tables[&2019][0].display.median,
        "Not available. Exceeds $3500!"
    );
}

#[tokio::test]
async fn test_load_place_directory() {
    let dir = TempDir::new().unwrap();
    write(
        dir.path(),
        "assets/fips.csv",
        "PLACE_FIPS,PLACENAME\n0643000,Long Beach\n",
    );

    let loader = loader(dir.path());
    let directory = loader.load_place_directory("assets/fips.csv").await.unwrap();
    assert_eq!(directory.name("0643000"), Some("Long Beach"));

    let err = loader.load_place_directory("assets/other.csv").await.unwrap_err();
    assert!(matches!(
        err,
        Error::MissingSource {
            kind: SourceKind::PlaceDirectory,
            year: None,
            ..
        }
    ));
}

// ============================================================================
// Remote sources
// ============================================================================

/// Serve the 2015 files and only the 2016 table over HTTP.
async fn serve_remote() -> String {
    use axum::routing::get;

    let table_2015 = format!("{HEADER}\n2015,Long Beach,g1,Census Tract 5701,1250,980,3501");
    let geometry_2015 = format!(
        r#"{{"type": "FeatureCollection", "features": [{}]}}"#,
        feature("g1", 33.77, -118.19)
    );
    let table_2016 = format!("{HEADER}\n2016,Long Beach,g1,Census Tract 5701,1300,1000,1700");

    let router = axum::Router::new()
        .route(
            "/rents/masterfiles/contract_rent_masterfile_2015.csv",
            get(move || std::future::ready(table_2015.clone())),
        )
        .route(
            "/rents/assets/contract_rent_mastergeometry_2015.json",
            get(move || std::future::ready(geometry_2015.clone())),
        )
        .route(
            "/rents/masterfiles/contract_rent_masterfile_2016.csv",
            get(move || std::future::ready(table_2016.clone())),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    format!("http://{addr}/rents")
}

#[tokio::test]
async fn test_load_from_http_source() {
    let base = serve_remote().await;
    let dataset = DatasetLoader::new(open_source(&base))
        .load(YearRange::new(2015, 2015).unwrap())
        .await
        .unwrap();

    let rows = &dataset.tables[&2015];
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].centroid, Some(Centroid::new(33.77, -118.19)));
    assert_eq!(rows[0].display.p75, "Not available. Exceeds $3500!");
}

#[tokio::test]
async fn test_http_404_is_missing_source() {
    let base = serve_remote().await;
    let err = DatasetLoader::new(open_source(&base))
        .load(YearRange::new(2015, 2016).unwrap())
        .await
        .unwrap_err();

    match err {
        Error::MissingSource {
            kind,
            year,
            location,
        } => {
            assert_eq!(kind, SourceKind::Geometry);
            assert_eq!(year, Some(2016));
            assert_eq!(
                location,
                format!("{base}/assets/contract_rent_mastergeometry_2016.json")
            );
        }
        other => panic!("expected MissingSource, got {other}"),
    }
}
