mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use crate::config::Settings;
use crate::core::{GroupBuilder, GroupingConfig};
use crate::models::CompatibilityWeights;
use crate::routes::matchmaking::AppState;
use crate::services::{EventMaterializer, MatchmakingRun, SupabaseClient, SupabaseTables};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting Convivio matchmaking service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize Supabase client
    let tables = SupabaseTables {
        profiles: settings.table.profiles,
        events: settings.table.events,
        rsvps: settings.table.rsvps,
        notifications: settings.table.notifications,
        crossed_paths: settings.table.crossed_paths,
    };

    let supabase = Arc::new(SupabaseClient::new(
        settings.supabase.url,
        settings.supabase.service_role_key,
        tables,
    ));

    info!("Supabase client initialized");

    // Initialize the group builder with configured bounds and weights
    let grouping_config = GroupingConfig {
        max_radius_km: settings.matching.max_radius_km,
        compatibility_threshold: settings.matching.compatibility_threshold,
        max_group_size: settings.matching.max_group_size,
        min_group_size: settings.matching.min_group_size,
    };

    let weights = CompatibilityWeights {
        dining_style: settings.scoring.weights.dining_style,
        dietary: settings.scoring.weights.dietary,
        locality: settings.scoring.weights.locality,
    };

    let builder = GroupBuilder::new(grouping_config, weights);

    info!(
        "Group builder initialized (radius: {}km, threshold: {}, sizes: {}-{})",
        settings.matching.max_radius_km,
        settings.matching.compatibility_threshold,
        settings.matching.min_group_size,
        settings.matching.max_group_size
    );

    let materializer = EventMaterializer::new(supabase.clone(), settings.matching.event_lead_days);
    let run = Arc::new(MatchmakingRun::new(supabase.clone(), builder, materializer));

    // Build application state
    let app_state = AppState {
        supabase,
        run,
        run_timeout: Duration::from_secs(settings.matching.run_timeout_secs),
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
