pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::controllers::{
    health, import::ImportController, playback::PlaybackController, report::ReportController,
    translation::TranslationController,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::repositories::ReportRepository;

/// `*` allows any origin; otherwise only the listed ones
fn cors_layer(allow_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    if allow_origins.is_empty() || allow_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allow_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router with every route and the shared layers
pub fn build_router(
    report_repo: Arc<dyn ReportRepository>,
    cors_allow_origins: &[String],
    report_controller: Arc<ReportController>,
    translation_controller: Arc<TranslationController>,
    playback_controller: Arc<PlaybackController>,
    import_controller: Arc<ImportController>,
) -> Router {
    let report_routes = Router::new()
        .route(
            "/api/reports",
            get(ReportController::list_reports).post(ReportController::create_report),
        )
        .route(
            "/api/reports/latest-published",
            get(ReportController::latest_published),
        )
        .route(
            "/api/reports/:id",
            get(ReportController::get_report)
                .put(ReportController::update_report)
                .delete(ReportController::delete_report),
        )
        .route("/api/reports/:id/generate", post(ReportController::generate))
        .route("/api/reports/:id/publish", post(ReportController::publish))
        .route(
            "/api/reports/:id/reflections",
            get(ReportController::reflections),
        )
        .route("/api/reports/:id/questions", get(ReportController::questions))
        .with_state(report_controller);

    let translation_routes = Router::new()
        .route(
            "/api/reports/:id/translations",
            get(TranslationController::list_translations),
        )
        .route(
            "/api/reports/:id/translation-jobs",
            get(TranslationController::translation_jobs),
        )
        .route(
            "/api/reports/:id/translations/retranslate-all",
            post(TranslationController::retranslate_all),
        )
        .route(
            "/api/reports/:id/translations/:lang/retranslate",
            post(TranslationController::retranslate_language),
        )
        .route(
            "/api/reports/:id/translations/:lang/prepare",
            post(TranslationController::prepare),
        )
        .route(
            "/api/reports/:id/translations/:lang",
            put(TranslationController::update_translation),
        )
        .with_state(translation_controller);

    let playback_routes = Router::new()
        .route("/api/playback/queue", get(PlaybackController::queue))
        .with_state(playback_controller);

    let import_routes = Router::new()
        .route("/api/imports/rows", post(ImportController::import_rows))
        .route(
            "/api/imports/meetings",
            post(ImportController::import_meetings),
        )
        .with_state(import_controller);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(report_repo)
        .merge(report_routes)
        .merge(translation_routes)
        .merge(playback_routes)
        .merge(import_routes)
        .layer(cors_layer(cors_allow_origins))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve `app` until shutdown
pub async fn start_http_server(
    config: &Config,
    app: Router,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
