//! Stage result store access via the Repository pattern.
//!
//! The engine does not own persistence; it consumes checkpoint and metadata
//! records through abstract repository traits so storage backends can be
//! swapped.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Caller (HTTP layer, CLI, out of scope here)            │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services/) - Timing & Classification    │
//! │  - Elapsed-time recomputation                           │
//! │  - Classification aggregation                           │
//! │  - Penalty application                                  │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Traits (repository/) - Abstract Interface   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌──────────────────────────────────────────────┐
//!     │             Local Repository                  │
//!     │               (in-memory)                     │
//!     └──────────────────────────────────────────────┘
//! ```
//!
//! Services take the repository as an explicit parameter; there is no
//! ambient global store.

#[cfg(not(feature = "local-repo"))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repo_config;
pub mod repositories;
pub mod repository;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repo_config::RepositoryConfig;
pub use repositories::LocalRepository;
pub use repository::{
    CheckpointRepository, ErrorContext, FullRepository, MetadataRepository, RepositoryError,
    RepositoryResult,
};
