//! Streams a statement CSV through a row normalizer and collects the result.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use tally_core::{ConfigError, Institution, NormalizationTable, RawRow, RowCollection, RowParseError};
use tracing::{debug, info, warn};

use crate::artifact::{artifact_path, write_artifact};
use crate::error::PipelineError;
use crate::normalizers::{Verdict, normalizer_for};

/// Everything one pass over an input produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    pub rows: RowCollection,
    /// Rows the normalizer rejected as non-transactions
    pub dropped: usize,
    /// Lines that could not be parsed and were skipped
    pub malformed: Vec<RowParseError>,
}

/// Normalize every record of `reader`, in order. No filesystem side effects.
///
/// The first line is the header row. Malformed records are reported in the
/// returned report and skipped; only I/O failures abort the read.
pub fn normalize_reader<R: Read>(
    reader: R,
    institution: Institution,
    table: &NormalizationTable,
) -> Result<PipelineReport, PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let normalizer = normalizer_for(institution);
    let mut report = PipelineReport::default();

    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let err = RowParseError {
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    message: e.to_string(),
                };
                warn!(line = err.line, error = %err.message, "skipping malformed line");
                report.malformed.push(err);
                continue;
            }
        };

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let raw = RawRow::from_record(headers.iter(), record.iter());
        match normalizer.normalize(&raw, table) {
            Verdict::Keep(row) => {
                debug!(line, ?row, "normalized row");
                report.rows.push(row);
            }
            Verdict::Dropped => {
                debug!(line, "dropped non-transaction row");
                report.dropped += 1;
            }
        }
    }

    Ok(report)
}

/// Normalize the file at `csv_path` and write `<basename>_transformed.csv`
/// into `output_dir`. The artifact is written even when no rows survive.
pub fn run(
    csv_path: &Path,
    institution: Institution,
    table: &NormalizationTable,
    output_dir: &Path,
) -> Result<PipelineReport, PipelineError> {
    let file = File::open(csv_path).map_err(|source| ConfigError::UnreadableInput {
        path: csv_path.to_path_buf(),
        source,
    })?;

    let report = normalize_reader(BufReader::new(file), institution, table)?;

    let out = artifact_path(csv_path, output_dir);
    write_artifact(&out, &report.rows)?;

    info!(
        institution = %institution,
        input = %csv_path.display(),
        artifact = %out.display(),
        kept = report.rows.len(),
        dropped = report.dropped,
        malformed = report.malformed.len(),
        "pipeline complete"
    );

    Ok(report)
}

/// A validated run: institution, table and input are all known good before
/// any row is read.
#[derive(Debug, Clone)]
pub struct Pipeline {
    institution: Institution,
    table: NormalizationTable,
    input: PathBuf,
    output_dir: PathBuf,
}

impl Pipeline {
    pub fn new(
        institution_key: &str,
        tables: &BTreeMap<String, NormalizationTable>,
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let institution: Institution = institution_key.parse()?;
        let table = tables
            .get(institution.key())
            .cloned()
            .ok_or_else(|| ConfigError::MissingTable(institution.key().to_string()))?;

        let input = input.into();
        // probe only; the stream is opened again by `run`
        File::open(&input).map_err(|source| ConfigError::UnreadableInput {
            path: input.clone(),
            source,
        })?;

        Ok(Self {
            institution,
            table,
            input,
            output_dir: output_dir.into(),
        })
    }

    pub fn institution(&self) -> Institution {
        self.institution
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn artifact_path(&self) -> PathBuf {
        artifact_path(&self.input, &self.output_dir)
    }

    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        run(&self.input, self.institution, &self.table, &self.output_dir)
    }
}
