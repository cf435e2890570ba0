//! Repository traits for the stage result store and event metadata.
//!
//! The engine reads and writes checkpoint records through these traits; it
//! does not own their persistence. Implementations must be `Send + Sync` to
//! work with async Rust.

pub mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;

use crate::api::{CategoryId, CheckpointId, EventId, StageId, VehicleId};
use crate::models::{Checkpoint, NewCheckpoint, Stage, Vehicle};

/// Repository trait for checkpoint (stage result) records.
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Fetch every checkpoint belonging to an event, in no particular order.
    async fn list_by_event(&self, event_id: EventId) -> RepositoryResult<Vec<Checkpoint>>;

    /// Fetch every checkpoint of an event ordered by `(vehicle_id, stage
    /// order_number)`, the traversal order of the elapsed-time updater.
    async fn list_by_event_ordered(&self, event_id: EventId) -> RepositoryResult<Vec<Checkpoint>>;

    /// Fetch the checkpoints of an event restricted to one stage order.
    async fn list_by_event_and_stage_order(
        &self,
        event_id: EventId,
        stage_order: u32,
    ) -> RepositoryResult<Vec<Checkpoint>>;

    /// Fetch the checkpoints of an event restricted to vehicles of one category.
    async fn list_by_event_and_category(
        &self,
        event_id: EventId,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<Checkpoint>>;

    /// Fetch one checkpoint by id.
    ///
    /// # Returns
    /// * `Ok(Checkpoint)` if present
    /// * `Err(RepositoryError::NotFound)` otherwise
    async fn get_checkpoint(&self, id: CheckpointId) -> RepositoryResult<Checkpoint>;

    /// Persist the full state of an existing checkpoint. Single-row write;
    /// implementations must make it atomic.
    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> RepositoryResult<()>;

    /// Insert a new checkpoint record, assigning its id.
    async fn insert_checkpoint(&self, new: &NewCheckpoint) -> RepositoryResult<Checkpoint>;
}

/// Repository trait for stage and vehicle metadata.
///
/// The engine only reads this data; the insert methods exist so the local
/// backend (and tests) can seed events without a separate admin surface.
#[async_trait]
pub trait MetadataRepository: Send + Sync {
    /// Stages of an event ordered by `order_number`, with neutralization flags.
    async fn stages_for_event(&self, event_id: EventId) -> RepositoryResult<Vec<Stage>>;

    /// Fetch one stage by id.
    async fn get_stage(&self, id: StageId) -> RepositoryResult<Stage>;

    /// Fetch one vehicle by id.
    async fn get_vehicle(&self, id: VehicleId) -> RepositoryResult<Vehicle>;

    /// Vehicles registered in a category.
    async fn vehicles_in_category(&self, category_id: CategoryId)
        -> RepositoryResult<Vec<Vehicle>>;

    /// Seed a stage record.
    async fn insert_stage(&self, stage: &Stage) -> RepositoryResult<()>;

    /// Seed a vehicle record.
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> RepositoryResult<()>;
}

/// Combined repository surface consumed by the service layer.
pub trait FullRepository: CheckpointRepository + MetadataRepository {}

impl<T: CheckpointRepository + MetadataRepository> FullRepository for T {}
