use serde::{Deserialize, Serialize};
use crate::models::domain::CreatedEvent;

/// Response body for the matchmaking trigger endpoint
///
/// Partial failure is still a success: the events list just shrinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchmakingResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<CreatedEvent>>,
}

/// Response body when the run itself could not execute (pool read failed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchmakingErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}
