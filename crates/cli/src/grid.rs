use anyhow::{bail, Context, Result};
use footprint::DMatrix;
use polars::prelude::*;
use std::path::Path;

/// Read a headerless CSV of samples into a `rows × cols` grid.
///
/// One image row per line. Empty, `NaN` and non-numeric cells become NaN, so
/// they count as invalid pixels.
pub fn read_grid_csv(path: &Path) -> Result<DMatrix<f64>> {
    // Read everything as strings and cast, so all-empty columns still become floats.
    let df = LazyCsvReader::new(path)
        .with_has_header(false)
        .with_infer_schema_length(Some(0))
        .finish()
        .with_context(|| format!("opening grid {}", path.display()))?
        .select([all().cast(DataType::Float64)])
        .collect()
        .with_context(|| format!("reading grid {}", path.display()))?;

    let (rows, cols) = df.shape();
    if rows == 0 || cols == 0 {
        bail!("grid {} is empty", path.display());
    }
    // DMatrix storage is column-major, which is the column order of the frame.
    let mut data = Vec::with_capacity(rows * cols);
    for series in df.get_columns() {
        data.extend(series.f64()?.into_iter().map(|v| v.unwrap_or(f64::NAN)));
    }
    tracing::info!(rows, cols, "grid_loaded");
    Ok(DMatrix::from_vec(rows, cols, data))
}
