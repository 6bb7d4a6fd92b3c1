use std::{fs::{self, File}, io::{BufWriter, Write}, path::{Path, PathBuf}};

use anyhow::{Context, Result};
use tracing::info;

use crate::building::BuildingRecord;
use crate::matrix::CrossingMatrix;
use crate::result::{CoordinateTable, CrossingResult};

/// File name of the `{id: [x, y]}` centroid table.
pub const COORDINATES_FILE: &str = "BuildingCentroids.json";

/// File name of the `{id: [counts...]}` crossing matrix.
pub const MATRIX_FILE: &str = "BuildingsIntersections.json";

/// Read an array of building records.
pub fn read_records_from_json_bytes(bytes: &[u8]) -> Result<Vec<BuildingRecord>> {
    serde_json::from_slice(bytes).context("Failed to parse building records")
}

/// Serialize the coordinate table as `{"1": [x, y], ...}`.
pub fn write_coordinates_to_json_bytes(table: &CoordinateTable) -> Result<Vec<u8>> {
    serde_json::to_vec(&table.to_rows()).context("Failed to serialize coordinate table")
}

/// Serialize the crossing matrix as `{"1": [c11, c12, ...], ...}`.
pub fn write_matrix_to_json_bytes(matrix: &CrossingMatrix) -> Result<Vec<u8>> {
    serde_json::to_vec(&matrix.to_rows()).context("Failed to serialize crossing matrix")
}

/// Write both outputs of a run into `dir`, creating it if needed.
/// Returns the coordinate table path and the matrix path.
pub fn write_results_to_dir(dir: &Path, result: &CrossingResult) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let coordinates_path = dir.join(COORDINATES_FILE);
    write_bytes(&coordinates_path, &write_coordinates_to_json_bytes(result.coordinates())?)?;

    let matrix_path = dir.join(MATRIX_FILE);
    write_bytes(&matrix_path, &write_matrix_to_json_bytes(result.matrix())?)?;

    info!(coordinates = %coordinates_path.display(), matrix = %matrix_path.display(), "wrote results");
    Ok((coordinates_path, matrix_path))
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}
