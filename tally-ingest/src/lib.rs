//! tally-ingest: per-institution row normalizers and the CSV pipeline that drives them.

pub mod artifact;
pub mod error;
pub mod normalizers;
pub mod pipeline;

pub use artifact::{artifact_path, read_artifact, write_artifact};
pub use error::PipelineError;
pub use normalizers::{RowNormalizer, Verdict, normalize, normalizer_for};
pub use pipeline::{Pipeline, PipelineReport, normalize_reader, run};
