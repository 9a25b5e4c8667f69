//! NDJSON ingest: one raw record per line, upserted in file order.
//!
//! Bad lines do not abort the ingest. Each one is recorded in the
//! [`IngestReport`] with its 1-based line number and the remaining lines are
//! still applied. Only I/O failures on the reader are fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;

use crate::clock::Clock;
use crate::domain::error::{Result, ValidationError};
use crate::domain::object::SpectralObject;
use crate::obs;
use crate::registry::SpectralRegistry;

/// Why a line was skipped.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestRejection {
    #[error("line {line}: malformed JSON: {message}")]
    Malformed { line: usize, message: String },

    #[error("line {line}: {error}")]
    Invalid { line: usize, error: ValidationError },
}

impl IngestRejection {
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. } | Self::Invalid { line, .. } => *line,
        }
    }
}

/// Outcome of one ingest pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Non-blank lines seen.
    pub lines: usize,
    /// Lines that created or touched a record.
    pub applied: usize,
    pub rejected: Vec<IngestRejection>,
}

impl IngestReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Upsert every non-blank line of `reader` into `registry`.
pub fn ingest_ndjson<C, R>(registry: &mut SpectralRegistry<C>, reader: R) -> Result<IngestReport>
where
    C: Clock,
    R: BufRead,
{
    let mut report = IngestReport::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        report.lines += 1;
        let line_no = idx + 1;

        let raw: Value = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                report.rejected.push(IngestRejection::Malformed {
                    line: line_no,
                    message: e.to_string(),
                });
                continue;
            }
        };

        match registry.upsert(&raw) {
            Ok(obj) => {
                lint_metrics(obj);
                report.applied += 1;
            }
            Err(error) => report.rejected.push(IngestRejection::Invalid {
                line: line_no,
                error,
            }),
        }
    }

    obs::emit_ingest_finished(report.lines, report.applied, report.rejected.len());
    Ok(report)
}

/// [`ingest_ndjson`] over the file at `path`.
pub fn ingest_path<C: Clock>(
    registry: &mut SpectralRegistry<C>,
    path: &Path,
) -> Result<IngestReport> {
    let file = File::open(path)?;
    ingest_ndjson(registry, BufReader::new(file))
}

/// Metrics outside the conventional `[0, 1]` range, as `(name, value)`.
///
/// Such values are stored as given; this only reports them.
pub fn out_of_range_metrics(obj: &SpectralObject) -> Vec<(&'static str, f64)> {
    [
        ("stability", obj.stability()),
        ("drift", obj.drift()),
        ("confidence", obj.confidence()),
    ]
    .into_iter()
    .filter(|(_, v)| !(0.0..=1.0).contains(v))
    .collect()
}

fn lint_metrics(obj: &SpectralObject) {
    for (metric, value) in out_of_range_metrics(obj) {
        obs::emit_metric_out_of_range(obj.id(), metric, value);
    }
}
