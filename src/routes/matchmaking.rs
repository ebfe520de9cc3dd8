use actix_web::{web, HttpResponse, Responder};
use crate::models::{HealthResponse, MatchmakingErrorResponse, MatchmakingResponse, RunOutcome};
use crate::services::{MatchmakingRun, SupabaseClient};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub run: Arc<MatchmakingRun>,
    pub run_timeout: Duration,
}

/// Configure all matchmaking routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matchmaking/run", web::post().to(trigger_run));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.supabase.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Trigger a matchmaking run
///
/// POST /api/v1/matchmaking/run
///
/// Takes no request payload. Returns 200 with the run summary; partial
/// failure still responds 200 with a shorter events list. Only a failed pool
/// read (or the whole-run deadline expiring) responds 500.
async fn trigger_run(state: web::Data<AppState>) -> impl Responder {
    tracing::info!("Matchmaking run triggered");

    match tokio::time::timeout(state.run_timeout, state.run.execute()).await {
        Err(_) => {
            tracing::error!(
                "Matchmaking run exceeded the {}s deadline",
                state.run_timeout.as_secs()
            );
            HttpResponse::InternalServerError().json(MatchmakingErrorResponse {
                success: false,
                error: format!(
                    "Matchmaking run exceeded the {}s deadline",
                    state.run_timeout.as_secs()
                ),
            })
        }
        Ok(Err(e)) => {
            tracing::error!("Matchmaking run failed: {}", e);
            HttpResponse::InternalServerError().json(MatchmakingErrorResponse {
                success: false,
                error: e.to_string(),
            })
        }
        Ok(Ok(RunOutcome::Skipped { eligible })) => {
            HttpResponse::Ok().json(MatchmakingResponse {
                success: true,
                message: format!(
                    "Skipped: insufficient pool ({} eligible user(s))",
                    eligible
                ),
                events: None,
            })
        }
        Ok(Ok(RunOutcome::Completed(report))) => {
            let message = format!(
                "Created {} event(s) from {} group(s), {} failed",
                report.events.len(),
                report.groups_attempted,
                report.failures.len()
            );

            tracing::info!(
                "Matchmaking run finished: {} (pool: {} users)",
                message,
                report.pool_size
            );

            HttpResponse::Ok().json(MatchmakingResponse {
                success: true,
                message,
                events: Some(report.events),
            })
        }
    }
}
