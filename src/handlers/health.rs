use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::routes::AppState;

/// GET /v1/healthcheck
pub async fn healthcheck(State(state): State<AppState>) -> impl IntoResponse {
    let system_info = json!({
        "environment": state.config.environment.as_str(),
        "version": env!("CARGO_PKG_VERSION"),
    });

    match state.services.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "available",
                    "system_info": system_info,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "system_info": system_info,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
