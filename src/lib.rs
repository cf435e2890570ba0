//! # Rally Timing Engine
//!
//! Stage-time and classification engine for multi-stage rally events.
//!
//! This crate converts raw per-stage checkpoint timestamps and administrative
//! penalty/discount adjustments into elapsed times, and aggregates those into
//! per-stage, per-category, and overall event rankings. Persistence, auth and
//! HTTP routing are external collaborators; the engine consumes the stage
//! result store through repository traits.
//!
//! ## Features
//!
//! - **Time Arithmetic**: adjusted competitive time from raw elapsed plus
//!   penalties minus discounts, floored at zero
//! - **Elapsed-Time Update**: bulk per-event recomputation from each
//!   vehicle's ordered checkpoint crossings, neutralized stages excluded
//! - **Classification**: general, per-category and per-stage rankings with
//!   deterministic tie-breaks and an explicit DNF list
//! - **Penalty Application**: replace-not-add penalty mutation with
//!   immediate adjusted-time recomputation
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: identifier newtypes and DTO surface for callers
//! - [`models`]: flat domain records and the integer-seconds duration type
//! - [`db`]: repository traits, error types, and the in-memory backend
//! - [`services`]: the engine operations (update, classify, penalize)
//!
//! ## Usage
//!
//! ```ignore
//! use rally_timing::api::EventId;
//! use rally_timing::db::RepositoryFactory;
//! use rally_timing::services;
//!
//! async fn standings() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = RepositoryFactory::from_env()?;
//!     services::update_elapsed_times(repo.as_ref(), EventId::new(1)).await?;
//!     let general = services::classify_general(repo.as_ref(), EventId::new(1)).await?;
//!     for entry in &general.entries {
//!         println!("{:?} {} {}", entry.rank, entry.vehicle_name, entry.total_adjusted);
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;

pub mod db;
pub mod models;

pub mod services;
