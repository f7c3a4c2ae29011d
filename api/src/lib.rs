mod core;
mod error_handler;
mod middleware_layer;
mod routes;

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tracing::{error, info};

pub use crate::core::app_state::{AppConfig, AppState, ConfigError};
pub use crate::error_handler::{AppError, AppResult};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{
        analytics::{analytics_route::analytics_route, insights_route::insights_route},
        health::health_route::health_route,
        organizations::{
            list_organizations_route::list_organizations_route,
            org_reports_route::org_reports_route,
        },
        public_reports::public_reports_route::public_reports_route,
        reports::{
            report_status_route::report_status_route, submit_report_route::submit_report_route,
            update_status_route::update_status_route,
        },
    },
};

/// All HTTP routes over `state`.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/reports", post(submit_report_route))
        .route(
            "/reports/{id}/status",
            get(report_status_route).patch(update_status_route),
        )
        .route("/organizations", get(list_organizations_route))
        .route("/organizations/{name}/reports", get(org_reports_route))
        .route("/public/reports", get(public_reports_route))
        .route("/analytics", get(analytics_route))
        .route("/analytics/insights", post(insights_route))
        .route("/health", get(health_route))
        .layer(middleware::from_fn(json_error_mapper))
        .with_state(state)
}

/// Builds the state from `config` and serves until Ctrl+C.
pub async fn start(config: AppConfig) -> Result<(), AppError> {
    let address = config.api_address.clone();
    let state = Arc::new(AppState::build(config).await?);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .map_err(AppError::Bind)?;
    info!(%address, "listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("server stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed; never resolves if the signal cannot be installed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
