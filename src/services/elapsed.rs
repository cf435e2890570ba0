//! Bulk elapsed-time recomputation for one event.
//!
//! Walks every vehicle's ordered checkpoint crossings and rewrites the
//! derived `elapsed_seconds`/`adjusted_seconds` fields on each checkpoint of
//! a non-neutralized stage. Re-running with unchanged inputs performs no
//! writes and yields identical derived values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timing, ServiceError, ServiceResult};
use crate::api::{EventId, StageId, VehicleId};
use crate::db::FullRepository;
use crate::models::{Checkpoint, DurationSecs, Stage};

/// Outcome of one bulk update pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSummary {
    /// Checkpoints whose derived fields changed and were written back.
    pub checkpoints_updated: usize,
    /// Vehicles with at least one timestamped checkpoint in the event.
    pub vehicles_processed: usize,
    /// Data-consistency anomalies recovered locally (duplicate checkpoints,
    /// out-of-order timestamps). Zero on clean data.
    pub warnings: usize,
}

/// Per-stage info the updater needs about each stage.
#[derive(Debug, Clone, Copy)]
struct StageInfo {
    order_number: u32,
    is_neutralized: bool,
}

fn stage_index(stages: &[Stage]) -> BTreeMap<StageId, StageInfo> {
    stages
        .iter()
        .map(|s| {
            (
                s.id,
                StageInfo {
                    order_number: s.order_number,
                    is_neutralized: s.is_neutralized,
                },
            )
        })
        .collect()
}

/// Collapse duplicate checkpoints per stage order, earliest timestamp wins.
///
/// Returns the surviving checkpoints keyed by stage order plus the number of
/// duplicates dropped. Only timestamped checkpoints reach this point.
fn dedupe_by_stage_order(
    vehicle_id: VehicleId,
    checkpoints: Vec<(u32, Checkpoint)>,
) -> (BTreeMap<u32, Checkpoint>, usize) {
    let mut by_order: BTreeMap<u32, Checkpoint> = BTreeMap::new();
    let mut dropped = 0;

    for (order, cp) in checkpoints {
        match by_order.get(&order) {
            Some(existing) if existing.timestamp <= cp.timestamp => {
                log::warn!(
                    "duplicate checkpoint {} for vehicle {} at stage order {}, keeping earliest",
                    cp.id,
                    vehicle_id,
                    order
                );
                dropped += 1;
            }
            Some(existing) => {
                log::warn!(
                    "duplicate checkpoint {} for vehicle {} at stage order {}, keeping earliest",
                    existing.id,
                    vehicle_id,
                    order
                );
                by_order.insert(order, cp);
                dropped += 1;
            }
            None => {
                by_order.insert(order, cp);
            }
        }
    }

    (by_order, dropped)
}

/// Recompute elapsed and adjusted times for every checkpoint of the event's
/// non-neutralized stages.
///
/// The elapsed time of a checkpoint is the interval since the vehicle's
/// previous non-neutralized crossing. The data models no separate start-line
/// timestamp, so a vehicle's first competitive checkpoint gets elapsed zero;
/// that is expected for every vehicle and does not count as a warning.
///
/// Anomalous data (duplicates, timestamps that go backwards) degrades only
/// the affected vehicle and never aborts the event-wide pass.
pub async fn update_elapsed_times(
    repo: &dyn FullRepository,
    event_id: EventId,
) -> ServiceResult<UpdateSummary> {
    let stages = repo.stages_for_event(event_id).await?;
    if stages.is_empty() {
        return Err(ServiceError::NotFound(format!(
            "event {} has no stages",
            event_id
        )));
    }
    let index = stage_index(&stages);

    let checkpoints = repo.list_by_event_ordered(event_id).await?;

    // Group timestamped checkpoints per vehicle, tagging each with its stage
    // order. The repository already returns them in (vehicle, order) order.
    let mut by_vehicle: BTreeMap<VehicleId, Vec<(u32, Checkpoint)>> = BTreeMap::new();
    for cp in checkpoints {
        if cp.timestamp.is_none() {
            continue;
        }
        let Some(info) = index.get(&cp.stage_id) else {
            continue;
        };
        by_vehicle
            .entry(cp.vehicle_id)
            .or_default()
            .push((info.order_number, cp));
    }

    let mut summary = UpdateSummary {
        vehicles_processed: by_vehicle.len(),
        ..Default::default()
    };

    for (vehicle_id, vehicle_cps) in by_vehicle {
        let (by_order, dropped) = dedupe_by_stage_order(vehicle_id, vehicle_cps);
        summary.warnings += dropped;

        let mut prev_competitive: Option<DateTime<Utc>> = None;
        for (order, cp) in by_order {
            let info = &index[&cp.stage_id];
            // Neutralized stages contribute no competitive time and do not
            // serve as an elapsed-time reference.
            if info.is_neutralized {
                continue;
            }
            let Some(ts) = cp.timestamp else {
                continue;
            };

            let elapsed = match prev_competitive {
                Some(prev) => {
                    if ts < prev {
                        log::warn!(
                            "vehicle {} checkpoint {} at stage order {} is earlier than the \
                             previous crossing, clamping elapsed to zero",
                            vehicle_id,
                            cp.id,
                            order
                        );
                        summary.warnings += 1;
                    }
                    timing::elapsed_between(prev, ts)
                }
                None => {
                    // First competitive stage: no start-line reference exists
                    // in the data. Expected for every vehicle, so it is not
                    // counted as an anomaly.
                    log::debug!(
                        "vehicle {} has no start reference before stage order {}, elapsed set to zero",
                        vehicle_id,
                        order
                    );
                    DurationSecs::ZERO
                }
            };
            prev_competitive = Some(ts);

            let adjusted = timing::adjusted_seconds(
                elapsed,
                cp.penalty_waypoint,
                cp.penalty_speed,
                cp.discount_claim,
            );

            if cp.elapsed_seconds != Some(elapsed) || cp.adjusted_seconds != Some(adjusted) {
                let mut updated = cp.clone();
                updated.elapsed_seconds = Some(elapsed);
                updated.adjusted_seconds = Some(adjusted);
                repo.save_checkpoint(&updated).await?;
                summary.checkpoints_updated += 1;
            }
        }
    }

    log::debug!(
        "elapsed-time update for event {}: {} checkpoints written, {} vehicles, {} warnings",
        event_id,
        summary.checkpoints_updated,
        summary.vehicles_processed,
        summary.warnings
    );
    Ok(summary)
}
