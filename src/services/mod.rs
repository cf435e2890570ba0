//! Service layer: the timing and classification engine proper.
//!
//! Services orchestrate repository calls and implement the competitive-time
//! business logic. Each operation takes the repository as an explicit
//! parameter; none of them reads ambient state.

pub mod classification;
pub mod elapsed;
pub mod penalty;
pub mod timing;

pub use classification::{classify, classify_by_category, classify_by_stage, classify_general};
pub use elapsed::update_elapsed_times;
pub use penalty::{apply_penalty, register_checkpoint};

use crate::db::RepositoryError;

/// Result type for engine operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error taxonomy surfaced to callers of the engine.
///
/// Data-consistency anomalies (duplicate or out-of-order checkpoints) are
/// not errors: they are recovered locally, logged, and counted in the
/// operation summary.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// A referenced event, stage, checkpoint or vehicle does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller supplied invalid input (negative duration, conflicting
    /// filters, out-of-bounds coordinates).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The stage result store failed; not retried at this layer.
    #[error("store failure: {0}")]
    Store(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    /// Missing-entity store errors surface as `NotFound`; everything else is
    /// a store failure.
    fn from(err: RepositoryError) -> Self {
        if err.is_not_found() {
            ServiceError::NotFound(err.to_string())
        } else {
            ServiceError::Store(err)
        }
    }
}

impl ServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
