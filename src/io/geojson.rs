use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use geo::{Area, Coord, LineString, Polygon};
use serde_json::Value;
use tracing::{debug, warn};

/// Attribute filter applied to feature properties before loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagFilter {
    tag: Option<(String, String)>,
}

impl Default for TagFilter {
    /// Keep only features tagged `building = yes`.
    fn default() -> Self { Self::new("building", "yes") }
}

impl TagFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { tag: Some((key.into(), value.into())) }
    }

    /// Keep every feature.
    pub fn any() -> Self { Self { tag: None } }

    /// Whether a feature's `properties` object passes the filter.
    pub fn matches(&self, properties: &Value) -> bool {
        let Some((key, expected)) = &self.tag else { return true };
        match properties.get(key) {
            Some(Value::String(s)) => s == expected,
            Some(Value::Null) | None => false,
            Some(other) => other.to_string() == *expected,
        }
    }
}

impl FromStr for TagFilter {
    type Err = anyhow::Error;

    /// Parse `key=value`.
    fn from_str(s: &str) -> Result<Self> {
        let (key, value) = s.split_once('=')
            .ok_or_else(|| anyhow!("tag filter must look like key=value, got {s:?}"))?;
        if key.trim().is_empty() {
            bail!("tag filter key is empty in {s:?}");
        }
        Ok(Self::new(key.trim(), value.trim()))
    }
}

/// Read building footprints from GeoJSON FeatureCollection bytes.
///
/// Features failing `filter` are dropped. `Polygon` geometries are kept as is.
/// For `MultiPolygon` geometries only the largest part is kept, so a segment
/// crossing just a smaller part of such a building is not counted against it.
/// Other geometry types are skipped.
///
/// A `Polygon` or `MultiPolygon` whose coordinates are empty or malformed is
/// returned as an empty polygon, which the repository loader then excludes
/// as degenerate. Only input that is not a JSON FeatureCollection is an error.
pub fn read_footprints_from_geojson_bytes(bytes: &[u8], filter: &TagFilter) -> Result<Vec<Polygon<f64>>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse GeoJSON bytes")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("GeoJSON input is not a FeatureCollection"))?;

    let mut footprints = Vec::new();
    let (mut filtered, mut skipped, mut malformed) = (0usize, 0usize, 0usize);

    for (i, feature) in features.iter().enumerate() {
        if !filter.matches(&feature["properties"]) {
            filtered += 1;
            continue;
        }

        let geometry = &feature["geometry"];
        let coords = &geometry["coordinates"];
        let polygon = match geometry["type"].as_str() {
            Some("Polygon") => parse_polygon(coords),
            Some("MultiPolygon") => largest_part(coords),
            _ => { skipped += 1; continue; }
        };

        footprints.push(polygon.unwrap_or_else(|| {
            warn!(feature = i, "malformed footprint coordinates");
            malformed += 1;
            Polygon::new(LineString::new(vec![]), vec![])
        }));
    }

    debug!(kept = footprints.len(), filtered, skipped, malformed, "read GeoJSON footprints");
    Ok(footprints)
}

/// Parse `[[exterior], [hole], ...]` into a polygon.
fn parse_polygon(coords: &Value) -> Option<Polygon<f64>> {
    let (exterior, interiors) = coords.as_array()?.split_first()?;
    Some(Polygon::new(
        parse_ring(exterior)?,
        interiors.iter().map(parse_ring).collect::<Option<Vec<_>>>()?,
    ))
}

/// Parse `[[x, y], ...]` into a ring.
fn parse_ring(ring: &Value) -> Option<LineString<f64>> {
    ring.as_array()?.iter()
        .map(|position| Some(Coord { x: position[0].as_f64()?, y: position[1].as_f64()? }))
        .collect::<Option<Vec<_>>>()
        .map(LineString::new)
}

/// The well-formed part of a multipolygon with the largest area.
fn largest_part(coords: &Value) -> Option<Polygon<f64>> {
    coords.as_array()?.iter()
        .filter_map(parse_polygon)
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
}
