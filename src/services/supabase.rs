use crate::models::{NewCrossedPath, NewMysteryEvent, NewNotification, NewRsvp, UserCandidate};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when interacting with Supabase
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid service role key")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Columns fetched for the matching pool
const CANDIDATE_SELECT: &str =
    "id,latitude,longitude,home_city,dining_style,dietary_preferences,onboarding_completed";

/// Supabase REST client
///
/// Handles all communication with the Supabase backend over PostgREST:
/// - Fetching the eligible-user pool
/// - Inserting events, RSVP, notification and crossed-paths rows
pub struct SupabaseClient {
    base_url: String,
    service_role_key: String,
    client: Client,
    tables: SupabaseTables,
}

/// Table names in the Supabase schema
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub profiles: String,
    pub events: String,
    pub rsvps: String,
    pub notifications: String,
    pub crossed_paths: String,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(base_url: String, service_role_key: String, tables: SupabaseTables) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            service_role_key,
            client,
            tables,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            table
        )
    }

    /// Fetch all users eligible for matching: onboarding completed and both
    /// coordinates present. Rows are returned in onboarding order so repeated
    /// runs over an unchanged pool group identically.
    pub async fn list_eligible_users(&self) -> Result<Vec<UserCandidate>, SupabaseError> {
        let url = format!(
            "{}?select={}&onboarding_completed=eq.true&latitude=not.is.null&longitude=not.is.null&order=created_at.asc",
            self.table_url(&self.tables.profiles),
            urlencoding::encode(CANDIDATE_SELECT),
        );

        tracing::debug!("Fetching eligible users from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }
        if !status.is_success() {
            return Err(SupabaseError::ApiError(format!(
                "Failed to list eligible users: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let rows = json
            .as_array()
            .ok_or_else(|| SupabaseError::InvalidResponse("Expected a JSON array".into()))?;

        // Malformed rows are skipped rather than failing the whole pool read
        let candidates: Vec<UserCandidate> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();

        tracing::debug!(
            "Fetched {} eligible users ({} rows)",
            candidates.len(),
            rows.len()
        );

        Ok(candidates)
    }

    /// Insert the event row for a materialized group
    pub async fn insert_event(&self, event: &NewMysteryEvent) -> Result<(), SupabaseError> {
        self.insert_rows(&self.tables.events, event, "insert event").await
    }

    /// Bulk-insert one confirmed RSVP per group member
    pub async fn insert_rsvps(&self, rsvps: &[NewRsvp]) -> Result<(), SupabaseError> {
        self.insert_rows(&self.tables.rsvps, rsvps, "insert rsvps").await
    }

    /// Bulk-insert one notification per group member
    pub async fn insert_notifications(
        &self,
        notifications: &[NewNotification],
    ) -> Result<(), SupabaseError> {
        self.insert_rows(&self.tables.notifications, notifications, "insert notifications")
            .await
    }

    /// Bulk-insert one crossed-paths row per member pair
    pub async fn insert_crossed_paths(
        &self,
        crossed_paths: &[NewCrossedPath],
    ) -> Result<(), SupabaseError> {
        self.insert_rows(&self.tables.crossed_paths, crossed_paths, "insert crossed paths")
            .await
    }

    /// Health check: probe the profiles table with a minimal query
    pub async fn health_check(&self) -> Result<bool, SupabaseError> {
        let url = format!("{}?select=id&limit=1", self.table_url(&self.tables.profiles));

        let response = self
            .client
            .get(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    async fn insert_rows<T: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &T,
        context: &str,
    ) -> Result<(), SupabaseError> {
        let url = self.table_url(table);

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_role_key)
            .header("Authorization", format!("Bearer {}", self.service_role_key))
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SupabaseError::Unauthorized);
        }
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to {}: {} - {}", context, status, body);
            return Err(SupabaseError::ApiError(format!(
                "Failed to {}: {}",
                context, status
            )));
        }

        tracing::debug!("Completed {}", context);
        Ok(())
    }
}
