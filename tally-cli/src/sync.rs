//! Run a validated plan: normalize, write the local copy, then append.

use anyhow::{Context, Result};
use tracing::info;

use tally_core::Sink;
use tally_ingest::{Pipeline, PipelineReport};

/// The local artifact is on disk before `sink` is contacted, so an append
/// failure never loses it. `None` skips the upload.
pub async fn sync_with<S: Sink>(pipeline: &Pipeline, sink: Option<&S>) -> Result<PipelineReport> {
    let report = pipeline
        .run()
        .with_context(|| format!("normalizing {}", pipeline.input().display()))?;

    match sink {
        Some(sink) => {
            sink.append(&report.rows).await.with_context(|| {
                format!(
                    "appending rows (local copy kept at {})",
                    pipeline.artifact_path().display()
                )
            })?;
        }
        None => info!("upload skipped"),
    }

    Ok(report)
}
