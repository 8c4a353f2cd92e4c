//! Typed errors shared across the crate.

use std::path::PathBuf;

use thiserror::Error;


/// Fatal failures surfaced by the conversion, simplification, and
/// pricing layers. Recoverable per-record conditions are warned about
/// and skipped instead of being raised through this type.
#[derive(Debug, Error)]
pub enum GoblinError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("could not find telemetry.log or telemetry.jsonl under {}", .0.display())]
    TelemetryNotFound(PathBuf),

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("refusing to overwrite {} (left over from an earlier run?)", .0.display())]
    StaleArtifact(PathBuf),

    #[error("failed to {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("price data unavailable: {message}")]
    PriceUnavailable { message: String },
}


impl GoblinError {
    /// Wrap an I/O error with a short description of what was attempted.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}


pub type Result<T> = std::result::Result<T, GoblinError>;
