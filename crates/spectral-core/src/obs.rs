//! Structured observability hooks for registry activity.
//!
//! This module provides:
//! - Catalog-scoped tracing spans via the `CatalogSpan` RAII guard
//! - Emission functions for the registry lifecycle: create, touch, reject,
//!   snapshot, ingest, vision scoring
//!
//! Per-record events are emitted at `debug!` so a busy ingest stays quiet at
//! the default `info` level. Filter with `RUST_LOG`.

use tracing::{debug, info, warn};

/// RAII guard that enters a catalog-scoped span for its lifetime.
///
/// # Example
///
/// ```ignore
/// let _span = CatalogSpan::enter("checkout-excavation");
/// // every event below carries catalog = "checkout-excavation"
/// ```
pub struct CatalogSpan {
    _span: tracing::span::EnteredSpan,
}

impl CatalogSpan {
    pub fn enter(catalog: &str) -> Self {
        let span = tracing::info_span!("spectral.catalog", catalog = %catalog);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a new record was stored.
pub fn emit_object_created(id: &str, kind: &str) {
    debug!(event = "object.created", id = %id, kind = %kind);
}

/// Emit event: an existing record was touched; `fields` lists what changed.
pub fn emit_object_touched(id: &str, fields: &[&str]) {
    debug!(event = "object.touched", id = %id, fields = ?fields);
}

/// Emit event: an upsert failed validation (warning level).
pub fn emit_upsert_rejected(error: &dyn std::fmt::Display) {
    warn!(event = "object.rejected", error = %error);
}

/// Emit event: a metric landed outside its conventional `[0, 1]` range.
pub fn emit_metric_out_of_range(id: &str, metric: &str, value: f64) {
    warn!(event = "object.metric_out_of_range", id = %id, metric = %metric, value = value);
}

/// Emit event: a snapshot was exported.
pub fn emit_snapshot_taken(objects: usize, digest: &str) {
    info!(event = "snapshot.taken", objects = objects, digest = %digest);
}

/// Emit event: the vision pipeline scored a record.
pub fn emit_vision_evaluated(id: &str, score: f64, promoted: bool, depth: &dyn std::fmt::Debug) {
    debug!(
        event = "vision.evaluated",
        id = %id,
        score = score,
        promoted = promoted,
        depth = ?depth,
    );
}

/// Emit event: an NDJSON ingest finished.
pub fn emit_ingest_finished(lines: usize, applied: usize, rejected: usize) {
    info!(
        event = "ingest.finished",
        lines = lines,
        applied = applied,
        rejected = rejected,
    );
}
