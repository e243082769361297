//! The local `<basename>_transformed.csv` copy of a run.

use std::fs;
use std::path::{Path, PathBuf};

use tally_core::{CanonicalRow, RowCollection};

use crate::error::PipelineError;

/// `<output_dir>/<input basename without .csv>_transformed.csv`
pub fn artifact_path(input: &Path, output_dir: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.strip_suffix(".csv").unwrap_or(&name);
    output_dir.join(format!("{stem}_transformed.csv"))
}

/// Serialize `rows` as CSV. The header is the first-seen union of canonical
/// keys; an empty collection produces an empty file.
pub fn write_artifact(path: &Path, rows: &RowCollection) -> Result<(), PipelineError> {
    if rows.is_empty() {
        return fs::write(path, "").map_err(|source| PipelineError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    let header = rows.header();
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_path(path)?;

    wtr.write_record(&header)?;
    for row in rows {
        wtr.write_record(header.iter().map(|h| row.get(h).unwrap_or("")))?;
    }
    wtr.flush().map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Read an artifact back into canonical rows.
///
/// Every row comes back with every header column, so rows written with
/// differing key sets gain empty values for the keys they lacked.
pub fn read_artifact(path: &Path) -> Result<RowCollection, PipelineError> {
    let bytes = fs::read(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Ok(RowCollection::new());
    }

    let mut rdr = csv::Reader::from_reader(bytes.as_slice());
    let headers = rdr.headers()?.clone();

    let mut rows = RowCollection::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(headers.iter().zip(record.iter()).collect::<CanonicalRow>());
    }
    Ok(rows)
}
