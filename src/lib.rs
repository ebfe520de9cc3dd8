//! Convivio Match - Mystery dinner matchmaking service for the Convivio app
//!
//! This library provides the periodic matchmaking job that partitions
//! onboarded users into compatible dining groups and materializes each group
//! as a scheduled mystery-dinner event.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{compatibility_score, haversine_distance, GroupBuilder, GroupingConfig};
pub use crate::models::{
    CompatibilityWeights, CreatedEvent, DiningGroup, DiningStyle, MatchmakingResponse, RunOutcome,
    RunReport, UserCandidate,
};
