/**
 * Health Routes
 * Liveness ping plus a detailed view of the remote platform
 */
use axum::{extract::State, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::platform::PlatformResult;
use crate::state::AppState;

// Track server start time for uptime calculation
lazy_static::lazy_static! {
    static ref SERVER_START: Instant = Instant::now();
}

pub fn init_start_time() {
    lazy_static::initialize(&SERVER_START);
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Single service check result
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCheck {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<PlatformResult<Duration>> for ServiceCheck {
    fn from(result: PlatformResult<Duration>) -> Self {
        match result {
            Ok(elapsed) => ServiceCheck {
                status: "healthy".to_string(),
                response_time: Some(elapsed.as_millis() as u64),
                error: None,
            },
            Err(e) => ServiceCheck {
                status: "unhealthy".to_string(),
                response_time: None,
                error: Some(e.to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    pub database: ServiceCheck,
    pub storage: ServiceCheck,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    pub ok: bool,
    pub timestamp: DateTime<Utc>,
    pub uptime: u64,
    pub checks: HealthChecks,
}

/// GET /api/health
pub async fn health_ping() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

/// GET /api/health/detailed
///
/// Always 200: the gateway itself is up even when the platform is not.
pub async fn health_detailed(State(state): State<AppState>) -> impl IntoResponse {
    let (database, storage) = tokio::join!(state.records.ping(), state.storage.ping());

    Json(DetailedHealthResponse {
        ok: true,
        timestamp: Utc::now(),
        uptime: SERVER_START.elapsed().as_secs(),
        checks: HealthChecks {
            database: database.into(),
            storage: storage.into(),
        },
    })
}
