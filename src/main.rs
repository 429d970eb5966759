use std::net::SocketAddr;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod cache;
mod classifier;
mod config;
mod corpus;
mod database;
mod error;
mod feedback;
mod filter;
mod handlers;
mod llm;
mod logging;
mod models;
mod orchestrator;
mod prioritization;
mod server;
mod tools;

use crate::config::Config;
use crate::handlers::{calendar, concierge, feedback as feedback_handlers, health, startups};
use crate::logging::setup_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenv::from_filename(".env.dev") {
        warn!("⚠️ Could not load .env.dev file: {}", e);
    } else {
        println!("✅ Loaded configuration from .env.dev");
    }

    setup_logging()?;

    let config = Config::from_env()?;
    info!("🔧 Configuration loaded: {}", config.service_name);

    let state = server::AppState::new(config.clone()).await?;

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));

    info!("🚀 Startup concierge service starting...");
    info!("📡 Server will bind to: {}", addr);
    info!("🏥 Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("✅ Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn create_router(state: server::AppState) -> Router {
    let cors_origins = state.config.server.cors_origins.clone();

    Router::new()
        .route("/health", get(health::health_check))
        // Concierge
        .route("/concierge/ask", post(concierge::ask))
        .route(
            "/concierge/generate-linkedin-post",
            post(concierge::generate_linkedin_post),
        )
        .route("/concierge/directions", post(concierge::directions))
        .route(
            "/concierge/startup-details",
            post(concierge::startup_details),
        )
        .route("/concierge/event-details", post(concierge::event_details))
        // Startups
        .route("/startups/all", get(startups::all))
        .route("/startups/prioritized", get(startups::prioritized))
        .route("/startups/:id/insights", get(startups::insights))
        .route("/startups/batch-insights", post(startups::batch_insights))
        .route("/startups/enriched/search", get(startups::enriched_search))
        .route("/startups/:id/enrichment", get(startups::enrichment))
        .route(
            "/startups/enrichment/stats",
            get(startups::enrichment_stats),
        )
        // Feedback
        .route("/feedback/start", post(feedback_handlers::start))
        .route("/feedback/chat", post(feedback_handlers::chat))
        .route(
            "/feedback/session/:id",
            get(feedback_handlers::get_session),
        )
        .route(
            "/feedback/preview/:meeting_id",
            get(feedback_handlers::preview),
        )
        .route(
            "/insights/:insight_id/edit",
            put(feedback_handlers::edit_insight),
        )
        // Ambient calendar/votes/ratings CRUD
        .route(
            "/calendar/events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/calendar/events/:id",
            get(calendar::get_event).delete(calendar::delete_event),
        )
        .route("/votes", post(calendar::cast_vote))
        .route("/votes/:user_id", get(calendar::votes_for_user))
        .route("/ratings", post(calendar::rate))
        .route("/ratings/:user_id", get(calendar::ratings_for_user))
        .with_state(state)
        .layer(cors_layer(&cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any);
    }
    let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
