//! RentHub backend - property listing gateway over a hosted data + storage platform,
//! plus the client-side account and listing logic.

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod platform;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::process::ExitCode;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use config::{AppConfig, ConfigError};
use platform::PlatformError;
use state::AppState;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to build platform client: {0}")]
    Platform(#[from] PlatformError),

    #[error("failed to bind or serve: {0}")]
    Io(#[from] std::io::Error),
}

/// CORS from `ALLOWED_ORIGINS`; any origin when none are configured.
pub fn configure_cors(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}

/// Create and configure the application router.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health_ping))
        .route("/api/health/detailed", get(routes::health::health_detailed))
        .route(
            "/api/houses",
            get(routes::houses::list_houses).post(routes::houses::create_house),
        )
        .route(
            "/api/houses/{id}",
            put(routes::houses::update_house).delete(routes::houses::delete_house),
        )
        .route("/api/select-house", post(routes::selections::select_house))
        .route(
            "/api/selected-houses",
            get(routes::selections::list_selected_houses),
        )
        .route("/api/users", get(routes::users::list_users))
        .with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        // Uploads are buffered whole; both limits must agree.
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .layer(configure_cors(&config.allowed_origins))
}

async fn serve(config: AppConfig) -> Result<(), StartupError> {
    let state = AppState::supabase(&config)?;
    let addr = config.bind_addr()?;
    let app = create_app(state, &config);

    tracing::info!(bucket = %config.bucket, "using storage bucket");

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("RentHub backend listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}

/// Run the server (used by main).
pub async fn run() -> ExitCode {
    dotenvy::dotenv().ok();

    // Held until return so buffered log lines are flushed.
    let _log_guards = logging::init(&logging::LogSettings::from_env());

    routes::health::init_start_time();

    let result = match AppConfig::from_env() {
        Ok(config) => serve(config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
