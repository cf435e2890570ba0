//! Public API surface of the timing engine.
//!
//! This file consolidates the identifier newtypes and re-exports the DTO
//! types produced by the service layer. All types derive
//! Serialize/Deserialize for JSON serialization.

pub use crate::models::time::DurationSecs;
pub use crate::services::classification::Classification;
pub use crate::services::classification::ClassificationEntry;
pub use crate::services::classification::StageTimeCell;
pub use crate::services::elapsed::UpdateSummary;

use serde::{Deserialize, Serialize};

/// Event identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub i64);

/// Stage identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageId(pub i64);

/// Vehicle identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VehicleId(pub i64);

/// Category identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

/// Checkpoint (stage result record) identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CheckpointId(pub i64);

macro_rules! id_impls {
    ($($name:ident),+) => {
        $(
            impl $name {
                pub fn new(value: i64) -> Self {
                    $name(value)
                }

                pub fn value(&self) -> i64 {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    $name(value)
                }
            }
        )+
    };
}

id_impls!(EventId, StageId, VehicleId, CategoryId, CheckpointId);
