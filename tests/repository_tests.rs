use chrono::{TimeZone, Utc};

use rally_timing::api::{CategoryId, CheckpointId, EventId, StageId, VehicleId};
use rally_timing::db::{
    CheckpointRepository, ErrorContext, LocalRepository, MetadataRepository, RepositoryConfig,
    RepositoryError, RepositoryFactory, RepositoryType,
};
use rally_timing::models::{NewCheckpoint, Stage, Vehicle};

fn stage(id: i64, event: i64, order: u32, neutralized: bool) -> Stage {
    Stage {
        id: StageId::new(id),
        event_id: EventId::new(event),
        name: format!("SS{}", order),
        order_number: order,
        is_neutralized: neutralized,
    }
}

fn vehicle(id: i64, category: i64) -> Vehicle {
    Vehicle {
        id: VehicleId::new(id),
        name: format!("car-{}", id),
        category_id: CategoryId::new(category),
        driver_name: String::new(),
        team_name: String::new(),
    }
}

fn crossing(vehicle: i64, stage: i64) -> NewCheckpoint {
    NewCheckpoint {
        vehicle_id: VehicleId::new(vehicle),
        stage_id: StageId::new(stage),
        timestamp: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
        latitude: 6.25,
        longitude: -75.56,
    }
}

#[tokio::test]
async fn test_stages_for_event_sorted_by_order() {
    let repo = LocalRepository::new();
    repo.insert_stage(&stage(3, 1, 3, false)).await.unwrap();
    repo.insert_stage(&stage(1, 1, 1, false)).await.unwrap();
    repo.insert_stage(&stage(2, 1, 2, true)).await.unwrap();

    let stages = repo.stages_for_event(EventId::new(1)).await.unwrap();
    let orders: Vec<u32> = stages.iter().map(|s| s.order_number).collect();
    assert_eq!(orders, vec![1, 2, 3]);
    assert!(stages[1].is_neutralized);
}

#[tokio::test]
async fn test_stages_for_unknown_event_is_empty() {
    let repo = LocalRepository::new();
    let stages = repo.stages_for_event(EventId::new(9)).await.unwrap();
    assert!(stages.is_empty());
}

#[tokio::test]
async fn test_list_by_event_and_stage_order() {
    let repo = LocalRepository::new();
    repo.insert_stage(&stage(1, 1, 1, false)).await.unwrap();
    repo.insert_stage(&stage(2, 1, 2, false)).await.unwrap();
    repo.insert_checkpoint(&crossing(1, 1)).await.unwrap();
    repo.insert_checkpoint(&crossing(1, 2)).await.unwrap();
    repo.insert_checkpoint(&crossing(2, 2)).await.unwrap();

    let listed = repo
        .list_by_event_and_stage_order(EventId::new(1), 2)
        .await
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|c| c.stage_id == StageId::new(2)));
}

#[tokio::test]
async fn test_list_by_event_and_category_filters_vehicles() {
    let repo = LocalRepository::new();
    repo.insert_stage(&stage(1, 1, 1, false)).await.unwrap();
    repo.insert_vehicle(&vehicle(1, 10)).await.unwrap();
    repo.insert_vehicle(&vehicle(2, 20)).await.unwrap();
    repo.insert_checkpoint(&crossing(1, 1)).await.unwrap();
    repo.insert_checkpoint(&crossing(2, 1)).await.unwrap();

    let listed = repo
        .list_by_event_and_category(EventId::new(1), CategoryId::new(10))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].vehicle_id, VehicleId::new(1));
}

#[tokio::test]
async fn test_vehicles_in_category_sorted_by_id() {
    let repo = LocalRepository::new();
    repo.insert_vehicle(&vehicle(5, 10)).await.unwrap();
    repo.insert_vehicle(&vehicle(2, 10)).await.unwrap();
    repo.insert_vehicle(&vehicle(3, 20)).await.unwrap();

    let vehicles = repo
        .vehicles_in_category(CategoryId::new(10))
        .await
        .unwrap();
    let ids: Vec<i64> = vehicles.iter().map(|v| v.id.value()).collect();
    assert_eq!(ids, vec![2, 5]);
}

#[tokio::test]
async fn test_get_checkpoint_not_found_carries_context() {
    let repo = LocalRepository::new();
    let err = repo.get_checkpoint(CheckpointId::new(77)).await.unwrap_err();

    assert!(err.is_not_found());
    let ctx = err.context();
    assert_eq!(ctx.operation.as_deref(), Some("get_checkpoint"));
    assert_eq!(ctx.entity.as_deref(), Some("checkpoint"));
    assert_eq!(ctx.entity_id.as_deref(), Some("77"));
}

#[tokio::test]
async fn test_get_stage_and_vehicle_not_found() {
    let repo = LocalRepository::new();
    assert!(repo.get_stage(StageId::new(1)).await.unwrap_err().is_not_found());
    assert!(repo
        .get_vehicle(VehicleId::new(1))
        .await
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_error_display_includes_context() {
    let err = RepositoryError::not_found_with_context(
        "checkpoint 3 does not exist",
        ErrorContext::new("get_checkpoint").with_entity_id(3),
    );
    let rendered = err.to_string();
    assert!(rendered.contains("checkpoint 3 does not exist"));
    assert!(rendered.contains("operation=get_checkpoint"));
}

// ==================== Factory & configuration ====================

#[test]
fn test_factory_creates_local_repository() {
    assert!(RepositoryFactory::create(RepositoryType::Local).is_ok());
}

#[test]
fn test_config_file_roundtrip() {
    let dir = std::env::temp_dir().join("rally-timing-config-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("repository.toml");
    std::fs::write(&path, "[repository]\ntype = \"local\"\n").unwrap();

    let config = RepositoryConfig::from_file(&path).unwrap();
    assert_eq!(config.repository_type().unwrap(), RepositoryType::Local);
    assert!(RepositoryFactory::from_config_file(&path).is_ok());

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_config_missing_file_is_configuration_error() {
    let err = RepositoryConfig::from_file("/nonexistent/repository.toml").unwrap_err();
    assert!(matches!(err, RepositoryError::ConfigurationError { .. }));
}
