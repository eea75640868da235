use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::{AppConfig, AppState, HealthStatus};

/// Health check service dan database
#[utoipa::path(
    get,
    path = "/health",
    tag = "Service",
    responses(
        (status = 200, description = "Service healthy", body = HealthStatus),
        (status = 503, description = "Database unreachable", body = HealthStatus)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let health = state.health_check().await;

    let status = if health.overall == "healthy" {
        StatusCode::OK
    } else {
        tracing::warn!("Health check degraded: database {}", health.database);
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

/// Informasi service
#[utoipa::path(
    get,
    path = "/info",
    tag = "Service",
    responses(
        (status = 200, description = "Service information", body = serde_json::Value)
    )
)]
pub async fn get_service_info(State(config): State<AppConfig>) -> Json<Value> {
    Json(json!({
        "service": "quotation-service",
        "version": config.app_version,
        "environment": config.environment,
        "company": config.company_name,
        "email_provider": config.email.provider_name(),
        "quote_validity_days": config.quote_validity_days,
        "features": [
            "Custom order intake",
            "Quotation creation and amendment",
            "Payment ledger with live balance",
            "Quotation and reminder emails",
            "Quotation history trail"
        ],
        "timestamp": Utc::now()
    }))
}
