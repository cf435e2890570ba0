//! Classification aggregation: ranked standings from stored stage results.
//!
//! Three query modes share one aggregation core and differ only in the
//! checkpoint subset they read: the whole event, one category's vehicles, or
//! one stage. This is a pure read+aggregate step; it never refreshes stale
//! derived times (run the elapsed-time updater first).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{ServiceError, ServiceResult};
use crate::api::{CategoryId, CheckpointId, EventId, VehicleId};
use crate::db::FullRepository;
use crate::models::{Checkpoint, DurationSecs, Stage};

/// One stage cell in a classification row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimeCell {
    pub stage_order: u32,
    pub checkpoint_id: CheckpointId,
    pub elapsed: DurationSecs,
    pub penalty_waypoint: DurationSecs,
    pub penalty_speed: DurationSecs,
    pub discount_claim: DurationSecs,
    pub adjusted: DurationSecs,
}

impl StageTimeCell {
    fn from_checkpoint(stage_order: u32, cp: &Checkpoint) -> Self {
        Self {
            stage_order,
            checkpoint_id: cp.id,
            elapsed: cp.elapsed_seconds.unwrap_or(DurationSecs::ZERO),
            penalty_waypoint: cp.penalty_waypoint.unwrap_or(DurationSecs::ZERO),
            penalty_speed: cp.penalty_speed.unwrap_or(DurationSecs::ZERO),
            discount_claim: cp.discount_claim.unwrap_or(DurationSecs::ZERO),
            adjusted: cp.recompute_adjusted(),
        }
    }
}

/// One vehicle's row in a classification.
///
/// `rank` is 1-based for ranked entries and `None` for rows in the
/// supplementary unranked list (vehicles missing a stage in the requested
/// range).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub vehicle_id: VehicleId,
    pub vehicle_name: String,
    pub driver_name: String,
    pub team_name: String,
    pub category_id: CategoryId,
    pub stage_times: Vec<StageTimeCell>,
    pub total_adjusted: DurationSecs,
    pub rank: Option<u32>,
}

/// Ranked classification output.
///
/// `entries` holds vehicles with a time for every stage in the requested
/// range, ascending by total adjusted time (ties broken by vehicle id).
/// `unranked` holds DNF vehicles with their partial times; they are surfaced,
/// never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub entries: Vec<ClassificationEntry>,
    pub unranked: Vec<ClassificationEntry>,
}

/// General classification across all non-neutralized stages of the event.
pub async fn classify_general(
    repo: &dyn FullRepository,
    event_id: EventId,
) -> ServiceResult<Classification> {
    classify(repo, event_id, None, None).await
}

/// Classification restricted to one category's vehicles; ranks are local to
/// that subset.
pub async fn classify_by_category(
    repo: &dyn FullRepository,
    event_id: EventId,
    category_id: CategoryId,
) -> ServiceResult<Classification> {
    classify(repo, event_id, Some(category_id), None).await
}

/// Classification over exactly one stage order.
///
/// Vehicles that raced the event but have no checkpoint for that stage
/// appear in `unranked` with empty stage times, same as the other modes.
pub async fn classify_by_stage(
    repo: &dyn FullRepository,
    event_id: EventId,
    stage_order: u32,
) -> ServiceResult<Classification> {
    classify(repo, event_id, None, Some(stage_order)).await
}

/// Shared classification core.
///
/// At most one of `category_id`/`stage_order` may be set; supplying both is
/// a caller contract violation.
pub async fn classify(
    repo: &dyn FullRepository,
    event_id: EventId,
    category_id: Option<CategoryId>,
    stage_order: Option<u32>,
) -> ServiceResult<Classification> {
    if category_id.is_some() && stage_order.is_some() {
        return Err(ServiceError::InvalidInput(
            "category and stage filters are mutually exclusive".to_string(),
        ));
    }

    let stages = repo.stages_for_event(event_id).await?;
    if stages.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "event {} has no stages",
            event_id
        )));
    }

    // Stage orders every ranked vehicle must have a checkpoint for.
    let required_orders = required_stage_orders(&stages, stage_order)?;

    let checkpoints = match (category_id, stage_order) {
        (Some(category), None) => repo.list_by_event_and_category(event_id, category).await?,
        (None, Some(order)) => repo.list_by_event_and_stage_order(event_id, order).await?,
        _ => repo.list_by_event(event_id).await?,
    };

    let order_of: BTreeMap<_, _> = stages
        .iter()
        .filter(|s| !s.is_neutralized)
        .map(|s| (s.id, s.order_number))
        .collect();

    // Group per vehicle, keeping only competitive-stage checkpoints and
    // collapsing duplicates deterministically.
    let mut by_vehicle: BTreeMap<VehicleId, BTreeMap<u32, Checkpoint>> = BTreeMap::new();
    for cp in checkpoints {
        let Some(&order) = order_of.get(&cp.stage_id) else {
            continue;
        };
        let cells = by_vehicle.entry(cp.vehicle_id).or_default();
        match cells.get(&order).map(|existing| existing.timestamp) {
            None => {
                cells.insert(order, cp);
            }
            Some(existing_ts) => {
                // An untimestamped duplicate never masks a timestamped one;
                // among timestamped duplicates the earliest wins, the same
                // tie-break the updater applies.
                let keep_new = match (existing_ts, cp.timestamp) {
                    (None, Some(_)) => true,
                    (Some(prev), Some(new)) => new < prev,
                    _ => false,
                };
                log::warn!(
                    "duplicate checkpoint for vehicle {} at stage order {} in event {}, \
                     keeping the earliest timestamped one",
                    cp.vehicle_id,
                    order,
                    event_id
                );
                if keep_new {
                    cells.insert(order, cp);
                }
            }
        }
    }

    // The by-stage listing only carries the requested stage's checkpoints, so
    // vehicles that raced the event but missed that stage must be pulled in
    // from the full event set to surface in the unranked list.
    if stage_order.is_some() {
        for cp in repo.list_by_event(event_id).await? {
            by_vehicle.entry(cp.vehicle_id).or_default();
        }
    }

    let mut ranked: Vec<ClassificationEntry> = Vec::new();
    let mut unranked: Vec<ClassificationEntry> = Vec::new();

    for (vehicle_id, cells) in by_vehicle {
        let vehicle = match repo.get_vehicle(vehicle_id).await {
            Ok(v) => v,
            Err(e) if e.is_not_found() => {
                // Orphaned checkpoint rows degrade only this vehicle.
                log::warn!(
                    "skipping classification row: vehicle {} referenced by checkpoints of \
                     event {} does not exist",
                    vehicle_id,
                    event_id
                );
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let stage_times: Vec<StageTimeCell> = cells
            .iter()
            .map(|(&order, cp)| StageTimeCell::from_checkpoint(order, cp))
            .collect();
        let total_adjusted = stage_times
            .iter()
            .fold(DurationSecs::ZERO, |acc, cell| acc.add(cell.adjusted));

        let complete = required_orders.iter().all(|o| cells.contains_key(o));
        let entry = ClassificationEntry {
            vehicle_id,
            vehicle_name: vehicle.name,
            driver_name: vehicle.driver_name,
            team_name: vehicle.team_name,
            category_id: vehicle.category_id,
            stage_times,
            total_adjusted,
            rank: None,
        };
        if complete {
            ranked.push(entry);
        } else {
            unranked.push(entry);
        }
    }

    // Ascending by total time, ties broken by vehicle id for determinism.
    ranked.sort_by_key(|e| (e.total_adjusted, e.vehicle_id));
    for (i, entry) in ranked.iter_mut().enumerate() {
        entry.rank = Some((i + 1) as u32);
    }
    unranked.sort_by_key(|e| e.vehicle_id);

    Ok(Classification {
        entries: ranked,
        unranked,
    })
}

/// Resolve the set of stage orders a complete entry must cover.
fn required_stage_orders(stages: &[Stage], stage_order: Option<u32>) -> ServiceResult<Vec<u32>> {
    match stage_order {
        Some(order) => {
            let stage = stages
                .iter()
                .find(|s| s.order_number == order)
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("event has no stage with order {}", order))
                })?;
            if stage.is_neutralized {
                return Err(ServiceError::InvalidInput(format!(
                    "stage order {} is neutralized and carries no competitive time",
                    order
                )));
            }
            Ok(vec![order])
        }
        None => Ok(stages
            .iter()
            .filter(|s| !s.is_neutralized)
            .map(|s| s.order_number)
            .collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StageId;

    fn stage(order: u32, neutralized: bool) -> Stage {
        Stage {
            id: StageId::new(order as i64),
            event_id: EventId::new(1),
            name: format!("SS{}", order),
            order_number: order,
            is_neutralized: neutralized,
        }
    }

    #[test]
    fn test_required_orders_excludes_neutralized() {
        let stages = vec![stage(1, false), stage(2, true), stage(3, false)];
        let orders = required_stage_orders(&stages, None).unwrap();
        assert_eq!(orders, vec![1, 3]);
    }

    #[test]
    fn test_required_orders_single_stage() {
        let stages = vec![stage(1, false), stage(2, false)];
        let orders = required_stage_orders(&stages, Some(2)).unwrap();
        assert_eq!(orders, vec![2]);
    }

    #[test]
    fn test_required_orders_missing_stage_is_not_found() {
        let stages = vec![stage(1, false)];
        let err = required_stage_orders(&stages, Some(5)).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_required_orders_neutralized_stage_is_invalid_input() {
        let stages = vec![stage(1, false), stage(2, true)];
        let err = required_stage_orders(&stages, Some(2)).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_cell_from_checkpoint_uses_stored_components() {
        let cp = Checkpoint {
            id: CheckpointId::new(7),
            vehicle_id: VehicleId::new(1),
            stage_id: StageId::new(1),
            timestamp: None,
            latitude: 0.0,
            longitude: 0.0,
            penalty_waypoint: Some(DurationSecs::try_new(60).unwrap()),
            penalty_speed: None,
            discount_claim: Some(DurationSecs::try_new(20).unwrap()),
            elapsed_seconds: Some(DurationSecs::try_new(600).unwrap()),
            adjusted_seconds: None,
        };
        let cell = StageTimeCell::from_checkpoint(3, &cp);
        assert_eq!(cell.stage_order, 3);
        assert_eq!(cell.elapsed.value(), 600);
        assert_eq!(cell.adjusted.value(), 640);
    }
}
