//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{db::DbAdapter, llm::GeminiInterpreter},
    config::Config,
    error::ApiError,
    meanings::KatinaMeanings,
    web::{
        auth::{login_handler, logout_handler, signup_handler},
        dream_handler, get_dream_handler, get_katina_reading_handler, get_tarot_reading_handler,
        katina_catalog_handler, katina_reading_handler, list_dreams_handler,
        list_katina_readings_handler, list_tarot_readings_handler,
        middleware::require_auth,
        rest::ApiDoc,
        state::AppState,
        tarot_catalog_handler, tarot_reading_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Initialize Service Adapters ---
    let openai_config = OpenAIConfig::new()
        .with_api_key(
            config
                .gemini_api_key
                .as_ref()
                .ok_or_else(|| ApiError::Internal("GEMINI_API_KEY is required".to_string()))?,
        )
        .with_api_base(&config.generation_api_base);
    let gemini_client = Client::with_config(openai_config);

    let interpreter = Arc::new(GeminiInterpreter::new(
        gemini_client,
        config.tarot_model.clone(),
        config.katina_model.clone(),
        config.dream_model.clone(),
    ));

    let katina_meanings = Arc::new(KatinaMeanings::load(&config.katina_meanings_path)?);
    info!(
        "Loaded {} Katina card meanings from {}",
        katina_meanings.len(),
        config.katina_meanings_path.display()
    );

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        db: db_adapter,
        interpreter,
        config: config.clone(),
        katina_meanings,
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 5. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/cards/tarot", get(tarot_catalog_handler))
        .route("/cards/katina", get(katina_catalog_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route(
            "/readings/tarot",
            post(tarot_reading_handler).get(list_tarot_readings_handler),
        )
        .route("/readings/tarot/{reading_id}", get(get_tarot_reading_handler))
        .route(
            "/readings/katina",
            post(katina_reading_handler).get(list_katina_readings_handler),
        )
        .route(
            "/readings/katina/{reading_id}",
            get(get_katina_reading_handler),
        )
        .route("/dreams", post(dream_handler).get(list_dreams_handler))
        .route("/dreams/{dream_id}", get(get_dream_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
