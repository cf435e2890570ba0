//! JSON event seed loading.
//!
//! Deserializes an event definition (stages, vehicles, checkpoint
//! crossings) from JSON and loads it into a repository. Used to populate
//! the local backend without an administrative surface.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::db::FullRepository;
use crate::models::{validate_coordinates, NewCheckpoint, Stage, Vehicle};

/// One event's worth of seed data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSeed {
    pub stages: Vec<Stage>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub checkpoints: Vec<NewCheckpoint>,
}

/// Parse an event seed from a JSON string.
///
/// Rejects seeds without stages, with duplicate stage orders within an
/// event, or with out-of-bounds GPS coordinates.
pub fn parse_event_seed(json: &str) -> Result<EventSeed> {
    let seed: EventSeed = serde_json::from_str(json).context("Invalid event seed JSON")?;

    if seed.stages.is_empty() {
        anyhow::bail!("Event seed has no stages");
    }

    let mut seen = HashSet::new();
    for stage in &seed.stages {
        if !seen.insert((stage.event_id, stage.order_number)) {
            anyhow::bail!(
                "Duplicate stage order {} in event {}",
                stage.order_number,
                stage.event_id
            );
        }
    }

    for cp in &seed.checkpoints {
        validate_coordinates(cp.latitude, cp.longitude)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("Checkpoint for vehicle {} rejected", cp.vehicle_id))?;
    }

    Ok(seed)
}

/// Load a parsed seed into a repository.
pub async fn load_event_seed(repo: &dyn FullRepository, seed: &EventSeed) -> Result<()> {
    for stage in &seed.stages {
        repo.insert_stage(stage)
            .await
            .with_context(|| format!("Failed to seed stage {}", stage.id))?;
    }
    for vehicle in &seed.vehicles {
        repo.insert_vehicle(vehicle)
            .await
            .with_context(|| format!("Failed to seed vehicle {}", vehicle.id))?;
    }
    for cp in &seed.checkpoints {
        repo.insert_checkpoint(cp)
            .await
            .with_context(|| format!("Failed to seed checkpoint for vehicle {}", cp.vehicle_id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{CheckpointRepository, LocalRepository};
    use crate::api::EventId;

    const SEED: &str = r#"{
        "stages": [
            {"id": 1, "event_id": 1, "name": "SS1", "order_number": 1, "is_neutralized": false},
            {"id": 2, "event_id": 1, "name": "Liaison", "order_number": 2, "is_neutralized": true}
        ],
        "vehicles": [
            {"id": 1, "name": "car-1", "category_id": 10, "driver_name": "", "team_name": ""}
        ],
        "checkpoints": [
            {"vehicle_id": 1, "stage_id": 1, "timestamp": "2024-03-01T10:00:00Z",
             "latitude": 6.25, "longitude": -75.56}
        ]
    }"#;

    #[test]
    fn test_parse_valid_seed() {
        let seed = parse_event_seed(SEED).unwrap();
        assert_eq!(seed.stages.len(), 2);
        assert!(seed.stages[1].is_neutralized);
        assert_eq!(seed.checkpoints.len(), 1);
    }

    #[test]
    fn test_parse_rejects_empty_stages() {
        let err = parse_event_seed(r#"{"stages": []}"#).unwrap_err();
        assert!(err.to_string().contains("no stages"));
    }

    #[test]
    fn test_parse_rejects_duplicate_stage_orders() {
        let json = r#"{
            "stages": [
                {"id": 1, "event_id": 1, "name": "a", "order_number": 1, "is_neutralized": false},
                {"id": 2, "event_id": 1, "name": "b", "order_number": 1, "is_neutralized": false}
            ]
        }"#;
        assert!(parse_event_seed(json).is_err());
    }

    #[test]
    fn test_parse_rejects_bad_coordinates() {
        let json = r#"{
            "stages": [
                {"id": 1, "event_id": 1, "name": "a", "order_number": 1, "is_neutralized": false}
            ],
            "checkpoints": [
                {"vehicle_id": 1, "stage_id": 1, "timestamp": null,
                 "latitude": 120.0, "longitude": 0.0}
            ]
        }"#;
        assert!(parse_event_seed(json).is_err());
    }

    #[tokio::test]
    async fn test_load_into_local_repository() {
        let repo = LocalRepository::new();
        let seed = parse_event_seed(SEED).unwrap();
        load_event_seed(&repo, &seed).await.unwrap();

        let checkpoints = repo.list_by_event(EventId::new(1)).await.unwrap();
        assert_eq!(checkpoints.len(), 1);
    }
}
