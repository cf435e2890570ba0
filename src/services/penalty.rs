//! Penalty application and checkpoint ingestion.
//!
//! `apply_penalty` is the out-of-band mutation of the engine: it replaces
//! penalty/discount fields on one stage result and immediately recomputes the
//! derived adjusted time. It never touches the raw elapsed component.

use super::{ServiceError, ServiceResult};
use crate::api::CheckpointId;
use crate::db::FullRepository;
use crate::models::{validate_coordinates, Checkpoint, DurationSecs, NewCheckpoint};

fn duration_param(name: &str, secs: Option<i64>) -> ServiceResult<Option<DurationSecs>> {
    secs.map(|s| {
        DurationSecs::try_new(s)
            .map_err(|e| ServiceError::InvalidInput(format!("{}: {}", name, e)))
    })
    .transpose()
}

/// Replace penalty/discount durations on one checkpoint and recompute its
/// adjusted time.
///
/// Each provided value replaces the stored one; omitted parameters leave the
/// stored value unchanged. Durations are raw second counts at this boundary
/// and must be non-negative. Returns the updated checkpoint.
pub async fn apply_penalty(
    repo: &dyn FullRepository,
    checkpoint_id: CheckpointId,
    penalty_waypoint_secs: Option<i64>,
    penalty_speed_secs: Option<i64>,
    discount_claim_secs: Option<i64>,
) -> ServiceResult<Checkpoint> {
    let penalty_waypoint = duration_param("penalty_waypoint", penalty_waypoint_secs)?;
    let penalty_speed = duration_param("penalty_speed", penalty_speed_secs)?;
    let discount_claim = duration_param("discount_claim", discount_claim_secs)?;

    let mut checkpoint = repo.get_checkpoint(checkpoint_id).await?;

    if let Some(p) = penalty_waypoint {
        checkpoint.penalty_waypoint = Some(p);
    }
    if let Some(p) = penalty_speed {
        checkpoint.penalty_speed = Some(p);
    }
    if let Some(d) = discount_claim {
        checkpoint.discount_claim = Some(d);
    }

    checkpoint.adjusted_seconds = Some(checkpoint.recompute_adjusted());
    repo.save_checkpoint(&checkpoint).await?;

    log::debug!(
        "penalties applied to checkpoint {}: waypoint={:?} speed={:?} discount={:?} adjusted={}",
        checkpoint_id,
        checkpoint.penalty_waypoint,
        checkpoint.penalty_speed,
        checkpoint.discount_claim,
        checkpoint.adjusted_seconds.unwrap_or(DurationSecs::ZERO)
    );
    Ok(checkpoint)
}

/// Register a new checkpoint crossing.
///
/// Validates GPS bounds and that the referenced stage and vehicle exist.
/// Derived time fields start unset; they are filled by the next elapsed-time
/// update pass.
pub async fn register_checkpoint(
    repo: &dyn FullRepository,
    new: NewCheckpoint,
) -> ServiceResult<Checkpoint> {
    validate_coordinates(new.latitude, new.longitude).map_err(ServiceError::InvalidInput)?;
    repo.get_stage(new.stage_id).await?;
    repo.get_vehicle(new.vehicle_id).await?;

    let checkpoint = repo.insert_checkpoint(&new).await?;
    Ok(checkpoint)
}
