//! Domain records for the timing engine.
//!
//! Entities are flat value records keyed by id; the engine never traverses an
//! object graph, it queries the repository by event, category or stage order.

pub mod seed;
pub mod time;

pub use seed::{load_event_seed, parse_event_seed, EventSeed};
pub use time::{DurationSecs, NegativeDuration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{CategoryId, CheckpointId, EventId, StageId, VehicleId};
use crate::services::timing;

/// One timestamped crossing record for one vehicle at one stage.
///
/// `elapsed_seconds` (raw, pre-adjustment) and `adjusted_seconds` are derived
/// by the elapsed-time updater; they are never authoritative on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub vehicle_id: VehicleId,
    pub stage_id: StageId,
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
    pub penalty_waypoint: Option<DurationSecs>,
    pub penalty_speed: Option<DurationSecs>,
    pub discount_claim: Option<DurationSecs>,
    pub elapsed_seconds: Option<DurationSecs>,
    pub adjusted_seconds: Option<DurationSecs>,
}

impl Checkpoint {
    /// Adjusted time recomputed from the current raw and penalty fields.
    pub fn recompute_adjusted(&self) -> DurationSecs {
        timing::adjusted_seconds(
            self.elapsed_seconds.unwrap_or(DurationSecs::ZERO),
            self.penalty_waypoint,
            self.penalty_speed,
            self.discount_claim,
        )
    }
}

/// Payload for registering a new checkpoint crossing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCheckpoint {
    pub vehicle_id: VehicleId,
    pub stage_id: StageId,
    pub timestamp: Option<DateTime<Utc>>,
    pub latitude: f64,
    pub longitude: f64,
}

/// One competitive (or neutralized) section of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: StageId,
    pub event_id: EventId,
    pub name: String,
    /// 1-based position within the event, unique per event.
    pub order_number: u32,
    /// Neutralized stages carry no competitive time.
    pub is_neutralized: bool,
}

/// Grouping and display key for classification output. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub category_id: CategoryId,
    pub driver_name: String,
    pub team_name: String,
}

/// Validate GPS coordinates at the ingestion boundary.
///
/// Returns the offending field name on failure.
pub fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), String> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {} outside [-90, 90]", latitude));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {} outside [-180, 180]", longitude));
    }
    Ok(())
}
