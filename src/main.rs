mod analytics;
mod config;
mod database;
mod error;
mod filters;
mod forms;
mod handlers;
mod middleware;
mod models;
mod repository;
mod search;
mod session;
mod state;

#[cfg(test)]
mod tests;

use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
    Router,
};
use dotenvy::dotenv;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use config::Config;
use database::{create_database_pool, run_migrations};
use handlers::{api, portal};
use models::{
    AttendanceRecord, Employee, LeaveRequest, Model, ProductionRecord, RawMaterial, StockRequest,
    ToolStock,
};
use repository::Repositories;
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = Config::from_env()?;

    let repos = match &config.database_url {
        Some(url) => {
            let pool = create_database_pool(url).await?;
            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        None => {
            log::warn!("DATABASE_URL is not set; records are kept in memory only");
            Repositories::in_memory()
        }
    };

    let addr = config.addr()?;
    let app = create_router(AppState::new(repos, config));

    log::info!("Aero portal listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn api_routes<M: Model>() -> Router<AppState> {
    Router::new()
        .route(&format!("/api/{}", M::API_PATH), api::collection::<M>())
        .route(&format!("/api/{}/:id", M::API_PATH), api::item::<M>())
}

fn entity_routes<M: Model>() -> Router<AppState> {
    portal::routes::<M>().merge(api_routes::<M>())
}

fn create_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit;
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Public routes (no authentication required)
        .route("/", get(|| async { Redirect::permanent("/login") }))
        .route("/login", get(handlers::auth::login_page).post(handlers::auth::login))
        .route("/register", get(handlers::auth::register_page).post(handlers::auth::register))
        .route(
            "/verification",
            get(handlers::auth::verification_page).post(handlers::auth::verification),
        )
        .route("/logout", post(handlers::auth::logout))
        // Protected routes (authentication required)
        .route("/dashboard", get(handlers::dashboard))
        .route("/analytics", get(handlers::analytics::overview))
        // Portals and their JSON APIs
        .merge(entity_routes::<Employee>())
        .merge(entity_routes::<AttendanceRecord>())
        .merge(entity_routes::<LeaveRequest>())
        .merge(entity_routes::<ToolStock>())
        .merge(entity_routes::<StockRequest>())
        .merge(entity_routes::<RawMaterial>())
        .merge(entity_routes::<ProductionRecord>())
        // Static files
        .nest_service("/static", ServeDir::new(static_dir))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
