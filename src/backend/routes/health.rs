//! Health check
//!
//! `GET /health` pings the user directory. 200 when it answers, 503 when it
//! does not, so a load balancer can take the instance out of rotation.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::backend::server::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub directory: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let directory = state.authority.directory();
    let (code, status) = match directory.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "degraded")
        }
    };

    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
            service: "identity".to_string(),
            directory: directory.backend_name().to_string(),
        }),
    )
}
