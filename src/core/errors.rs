//!    Error handling
//!
//! Editing operations return the typed [`EditorError`]; every variant means
//! the request was rejected before anything was mutated. The binary and the
//! settings loader sit at the application boundary and use anyhow with a
//! little extra context instead.

use anyhow::{Context, Result};
use thiserror::Error as ThisError;

use crate::data::{PointId, ZoneId};

/// Result type alias for the application boundary
pub type ZoneResult<T> = Result<T>;

/// Why an editing request was refused.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum EditorError {
    #[error("zone name must not be blank")]
    BlankZoneName,
    #[error("could not parse coordinates, need at least 3 points (found {found})")]
    TooFewImportPoints { found: usize },
    #[error("zone {0} does not exist")]
    UnknownZone(ZoneId),
    #[error("point {0} does not exist")]
    UnknownPoint(PointId),
    #[error("zone {0} is not the active zone")]
    InactiveZone(ZoneId),
    #[error("another drag or selection gesture is in progress")]
    GestureInProgress,
    #[error("'{0}' is not a valid coordinate")]
    InvalidSearchCoordinate(String),
    #[error("unknown shape template '{0}'")]
    UnknownShape(String),
    #[error("no template preview is active")]
    NoPreview,
    #[error("zone needs at least 3 points")]
    NotEnoughPoints,
}

/// Adds file context to an error at the application boundary
pub trait ZoneContext<T> {
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> ZoneResult<T>;
}

impl<T, E> ZoneContext<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_file_context<P: AsRef<std::path::Path>>(
        self,
        operation: &str,
        path: P,
    ) -> ZoneResult<T> {
        self.with_context(|| {
            format!("Failed to {} file: {}", operation, path.as_ref().display())
        })
    }
}
