mod geojson;
mod json;

pub use geojson::{read_footprints_from_geojson_bytes, TagFilter};
pub use json::{
    read_records_from_json_bytes, write_coordinates_to_json_bytes, write_matrix_to_json_bytes,
    write_results_to_dir, COORDINATES_FILE, MATRIX_FILE,
};

use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::building::{BuildingRepository, LoadOutcome};

/// Load buildings from a file holding either a GeoJSON FeatureCollection
/// (centroids computed with `geo`) or a JSON array of building records.
pub fn load_buildings_from_file(path: &Path, filter: &TagFilter) -> Result<LoadOutcome> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read building file: {}", path.display()))?;
    load_buildings_from_bytes(&bytes, filter)
}

/// Like `load_buildings_from_file`, from bytes already in memory.
pub fn load_buildings_from_bytes(bytes: &[u8], filter: &TagFilter) -> Result<LoadOutcome> {
    let is_records = bytes.iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'[');

    let outcome = if is_records {
        BuildingRepository::from_records(read_records_from_json_bytes(bytes)?)?
    } else {
        BuildingRepository::from_polygons(read_footprints_from_geojson_bytes(bytes, filter)?)?
    };
    Ok(outcome)
}
