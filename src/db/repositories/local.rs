//! In-memory repository for unit testing and local development.
//!
//! Data lives in hash maps behind `parking_lot` RwLocks. Every write replaces
//! a single map entry under the write lock, which gives the per-row atomicity
//! the service layer relies on during bulk updates.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::super::repository::{
    CheckpointRepository, ErrorContext, MetadataRepository, RepositoryError, RepositoryResult,
};
use crate::api::{CategoryId, CheckpointId, EventId, StageId, VehicleId};
use crate::models::{Checkpoint, NewCheckpoint, Stage, Vehicle};

/// In-memory implementation of the repository traits.
#[derive(Default)]
pub struct LocalRepository {
    stages: RwLock<HashMap<StageId, Stage>>,
    vehicles: RwLock<HashMap<VehicleId, Vehicle>>,
    checkpoints: RwLock<HashMap<CheckpointId, Checkpoint>>,
    next_checkpoint_id: AtomicI64,
}

impl LocalRepository {
    pub fn new() -> Self {
        Self {
            stages: RwLock::new(HashMap::new()),
            vehicles: RwLock::new(HashMap::new()),
            checkpoints: RwLock::new(HashMap::new()),
            next_checkpoint_id: AtomicI64::new(1),
        }
    }

    /// Stage ids of an event mapped to their order numbers.
    fn stage_index(&self, event_id: EventId) -> HashMap<StageId, u32> {
        self.stages
            .read()
            .values()
            .filter(|s| s.event_id == event_id)
            .map(|s| (s.id, s.order_number))
            .collect()
    }
}

#[async_trait]
impl CheckpointRepository for LocalRepository {
    async fn list_by_event(&self, event_id: EventId) -> RepositoryResult<Vec<Checkpoint>> {
        let index = self.stage_index(event_id);
        Ok(self
            .checkpoints
            .read()
            .values()
            .filter(|c| index.contains_key(&c.stage_id))
            .cloned()
            .collect())
    }

    async fn list_by_event_ordered(&self, event_id: EventId) -> RepositoryResult<Vec<Checkpoint>> {
        let index = self.stage_index(event_id);
        let mut results: Vec<Checkpoint> = self
            .checkpoints
            .read()
            .values()
            .filter(|c| index.contains_key(&c.stage_id))
            .cloned()
            .collect();
        results.sort_by_key(|c| (c.vehicle_id, index[&c.stage_id]));
        Ok(results)
    }

    async fn list_by_event_and_stage_order(
        &self,
        event_id: EventId,
        stage_order: u32,
    ) -> RepositoryResult<Vec<Checkpoint>> {
        let index = self.stage_index(event_id);
        Ok(self
            .checkpoints
            .read()
            .values()
            .filter(|c| index.get(&c.stage_id) == Some(&stage_order))
            .cloned()
            .collect())
    }

    async fn list_by_event_and_category(
        &self,
        event_id: EventId,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<Checkpoint>> {
        let index = self.stage_index(event_id);
        let vehicles = self.vehicles.read();
        Ok(self
            .checkpoints
            .read()
            .values()
            .filter(|c| index.contains_key(&c.stage_id))
            .filter(|c| {
                vehicles
                    .get(&c.vehicle_id)
                    .is_some_and(|v| v.category_id == category_id)
            })
            .cloned()
            .collect())
    }

    async fn get_checkpoint(&self, id: CheckpointId) -> RepositoryResult<Checkpoint> {
        self.checkpoints.read().get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("checkpoint {} does not exist", id),
                ErrorContext::new("get_checkpoint")
                    .with_entity("checkpoint")
                    .with_entity_id(id),
            )
        })
    }

    async fn save_checkpoint(&self, checkpoint: &Checkpoint) -> RepositoryResult<()> {
        let mut checkpoints = self.checkpoints.write();
        if !checkpoints.contains_key(&checkpoint.id) {
            return Err(RepositoryError::not_found_with_context(
                format!("checkpoint {} does not exist", checkpoint.id),
                ErrorContext::new("save_checkpoint")
                    .with_entity("checkpoint")
                    .with_entity_id(checkpoint.id),
            ));
        }
        checkpoints.insert(checkpoint.id, checkpoint.clone());
        Ok(())
    }

    async fn insert_checkpoint(&self, new: &NewCheckpoint) -> RepositoryResult<Checkpoint> {
        let id = CheckpointId::new(self.next_checkpoint_id.fetch_add(1, Ordering::SeqCst));
        let checkpoint = Checkpoint {
            id,
            vehicle_id: new.vehicle_id,
            stage_id: new.stage_id,
            timestamp: new.timestamp,
            latitude: new.latitude,
            longitude: new.longitude,
            penalty_waypoint: None,
            penalty_speed: None,
            discount_claim: None,
            elapsed_seconds: None,
            adjusted_seconds: None,
        };
        self.checkpoints.write().insert(id, checkpoint.clone());
        Ok(checkpoint)
    }
}

#[async_trait]
impl MetadataRepository for LocalRepository {
    async fn stages_for_event(&self, event_id: EventId) -> RepositoryResult<Vec<Stage>> {
        let mut stages: Vec<Stage> = self
            .stages
            .read()
            .values()
            .filter(|s| s.event_id == event_id)
            .cloned()
            .collect();
        stages.sort_by_key(|s| s.order_number);
        Ok(stages)
    }

    async fn get_stage(&self, id: StageId) -> RepositoryResult<Stage> {
        self.stages.read().get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("stage {} does not exist", id),
                ErrorContext::new("get_stage")
                    .with_entity("stage")
                    .with_entity_id(id),
            )
        })
    }

    async fn get_vehicle(&self, id: VehicleId) -> RepositoryResult<Vehicle> {
        self.vehicles.read().get(&id).cloned().ok_or_else(|| {
            RepositoryError::not_found_with_context(
                format!("vehicle {} does not exist", id),
                ErrorContext::new("get_vehicle")
                    .with_entity("vehicle")
                    .with_entity_id(id),
            )
        })
    }

    async fn vehicles_in_category(
        &self,
        category_id: CategoryId,
    ) -> RepositoryResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = self
            .vehicles
            .read()
            .values()
            .filter(|v| v.category_id == category_id)
            .cloned()
            .collect();
        vehicles.sort_by_key(|v| v.id);
        Ok(vehicles)
    }

    async fn insert_stage(&self, stage: &Stage) -> RepositoryResult<()> {
        let mut stages = self.stages.write();
        let duplicate_order = stages.values().any(|s| {
            s.event_id == stage.event_id
                && s.order_number == stage.order_number
                && s.id != stage.id
        });
        if duplicate_order {
            return Err(RepositoryError::validation(format!(
                "stage order {} already used in event {}",
                stage.order_number, stage.event_id
            )));
        }
        stages.insert(stage.id, stage.clone());
        Ok(())
    }

    async fn insert_vehicle(&self, vehicle: &Vehicle) -> RepositoryResult<()> {
        self.vehicles.write().insert(vehicle.id, vehicle.clone());
        Ok(())
    }
}
