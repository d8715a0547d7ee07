//! Yearly tract geometry collections.
//!
//! Each year ships one GeoJSON `FeatureCollection`. Every feature must carry
//! a `GEO_ID` property; `INTPTLAT`/`INTPTLON` give the tract's internal
//! point (TIGER files store them as signed strings such as `"+33.7701"`),
//! and an optional `PLACE` property names the place the feature was cut for.

use rentmap_core::{Centroid, Error, GeoFeature, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Value,
}

/// Parse a GeoJSON feature collection.
///
/// `location` is only used in error messages.
pub fn parse_geometry(text: &str, location: &str) -> Result<Vec<GeoFeature>> {
    let collection: RawCollection = serde_json::from_str(text)
        .map_err(|e| Error::schema_at(location, Some(e.line() as u64), e.to_string()))?;

    if collection.kind != "FeatureCollection" {
        return Err(Error::schema(
            location,
            format!("expected a FeatureCollection, found '{}'", collection.kind),
        ));
    }

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            to_feature(raw).map_err(|message| Error::schema(location, format!("feature {i}: {message}")))
        })
        .collect()
}

fn to_feature(raw: RawFeature) -> std::result::Result<GeoFeature, String> {
    let properties = raw.properties.unwrap_or_default();

    let geo_id = match properties.get("GEO_ID") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(other) if !other.is_null() => return Err(format!("GEO_ID is not a string: {other}")),
        _ => return Err("missing GEO_ID".to_string()),
    };

    let lat = coordinate(&properties, "INTPTLAT")?;
    let lon = coordinate(&properties, "INTPTLON")?;

    let mut feature = GeoFeature::new(geo_id).with_geometry(raw.geometry);
    if let (Some(lat), Some(lon)) = (lat, lon) {
        feature = feature.with_centroid(Centroid::new(lat, lon));
    }
    let place = properties
        .get("PLACE")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(place) = place {
        feature = feature.with_place(place);
    }

    Ok(feature)
}

/// Read a coordinate property that may be a number or a signed string.
fn coordinate(properties: &Map<String, Value>, key: &str) -> std::result::Result<Option<f64>, String> {
    let value = match properties.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_start_matches('+').parse::<f64>().ok(),
        Some(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(format!("{key} is not a coordinate")),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"GEO_ID": "1400000US06037570100", "INTPTLAT": "+33.7701", "INTPTLON": "-118.1937", "PLACE": "Long Beach"},
                    "geometry": {"type": "Polygon", "coordinates": [[[-118.2, 33.7], [-118.1, 33.7], [-118.1, 33.8], [-118.2, 33.7]]]}
                },
                {
                    "type": "Feature",
                    "properties": {"GEO_ID": "1400000US06037570200", "INTPTLAT": 33.78, "INTPTLON": -118.18},
                    "geometry": null
                }
            ]
        }"#;

        let features = parse_geometry(text, "geo_2015.json").unwrap();
        assert_eq!(features.len(), 2);

        assert_eq!(features[0].geo_id, "1400000US06037570100");
        assert_eq!(features[0].place.as_deref(), Some("Long Beach"));
        let centroid = features[0].centroid.unwrap();
        assert!((centroid.lat - 33.7701).abs() < 1e-9);
        assert!((centroid.lon + 118.1937).abs() < 1e-9);
        assert_eq!(features[0].geometry["type"], "Polygon");

        assert!(features[1].place.is_none());
        assert_eq!(features[1].centroid, Some(Centroid::new(33.78, -118.18)));
    }

    #[test]
    fn test_missing_centroid_is_allowed() {
        let text = r#"{"type": "FeatureCollection", "features": [{"properties": {"GEO_ID": "g1"}}]}"#;
        let features = parse_geometry(text, "geo.json").unwrap();
        assert!(features[0].centroid.is_none());
        assert!(features[0].geometry.is_null());
    }

    #[test]
    fn test_missing_geo_id_rejects_file() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"properties": {"GEO_ID": "g1"}},
            {"properties": {"NAME": "x"}}
        ]}"#;
        let err = parse_geometry(text, "geo.json").unwrap_err();
        assert!(err.to_string().contains("feature 1: missing GEO_ID"));
    }

    #[test]
    fn test_bad_coordinate_rejects_file() {
        let text = r#"{"type": "FeatureCollection", "features": [
            {"properties": {"GEO_ID": "g1", "INTPTLAT": "north", "INTPTLON": "-118.1"}}
        ]}"#;
        let err = parse_geometry(text, "geo.json").unwrap_err();
        assert!(err.to_string().contains("INTPTLAT"));
    }

    #[test]
    fn test_not_a_collection() {
        let text = r#"{"type": "Feature", "properties": {}}"#;
        let err = parse_geometry(text, "geo.json").unwrap_err();
        assert!(err.to_string().contains("FeatureCollection"));
    }

    #[test]
    fn test_invalid_json_reports_line() {
        let err = parse_geometry("{\n\"type\": ", "geo.json").unwrap_err();
        assert!(matches!(err, Error::Schema { line: Some(_), .. }));
    }
}
