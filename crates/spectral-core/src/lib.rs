//! Spectral Reality Model
//!
//! In-memory registry of spectral objects: observed artifacts such as DOM
//! sheets, JSON schemas and state machines, each carrying provenance,
//! a shape signature and stability/drift/confidence metrics.
//!
//! Re-exports the registry, record types, the export/ingest helpers and the
//! vision promotion gate.

pub mod clock;
pub mod config;
pub mod domain;
pub mod export;
pub mod ingest;
pub mod obs;
pub mod registry;
pub mod shared;
pub mod telemetry;
pub mod vision;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LogFormat, RegistryConfig, DEFAULT_STABILITY_THRESHOLD};
pub use domain::{
    ObjectSnapshot, Result, SpectralError, SpectralObject, ValidationError, UPDATABLE_FIELDS,
};
pub use export::{snapshot_digest, write_snapshot_json, write_snapshot_ndjson};
pub use ingest::{ingest_ndjson, ingest_path, out_of_range_metrics, IngestRejection, IngestReport};
pub use obs::{
    emit_ingest_finished, emit_metric_out_of_range, emit_object_created, emit_object_touched,
    emit_snapshot_taken, emit_upsert_rejected, emit_vision_evaluated, CatalogSpan,
};
pub use registry::SpectralRegistry;
pub use shared::SharedRegistry;
pub use telemetry::{init_from_config, init_tracing};
pub use vision::{
    evaluate_object, evaluate_spectral_vision, BandSample, ExcavationDepth, GovernanceMode,
    GovernanceState, VisionDecision, VisionParams,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
