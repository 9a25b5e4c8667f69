//! Domain model for the spectral reality model.
//!
//! - `SpectralObject`: one catalogued artifact with provenance and metrics
//! - `ObjectSnapshot`: its plain exported projection
//! - `ValidationError` / `SpectralError`: the error taxonomy

pub mod error;
pub mod object;
pub mod update;

pub use error::{Result, SpectralError, ValidationError};
pub use object::{ObjectSnapshot, SpectralObject};
pub use update::UPDATABLE_FIELDS;
