use std::time::{Duration, SystemTime};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::db::operations::entries::count_entries;
use crate::state::AppState;

const PING_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    status: &'static str,
    database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries: Option<i64>,
    schema: &'static str,
    timestamp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LivenessResponse {
    status: &'static str,
    uptime: u64,
    start_time: String,
    timestamp: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(root))
        .route("/health/live", get(live))
}

async fn root(State(state): State<AppState>) -> Response {
    let proxy = state.db_proxy();

    let (database, latency_ms, entries) = match proxy.ping(PING_TIMEOUT).await {
        Ok(latency) => {
            let entries = match count_entries(proxy.as_ref()).await {
                Ok(total) => Some(total),
                Err(err) => {
                    tracing::warn!(error = %err, "entry count failed during health check");
                    None
                }
            };
            ("connected", Some(latency.as_millis() as u64), entries)
        }
        Err(reason) => {
            tracing::warn!(%reason, "document store health check failed");
            ("disconnected", None, None)
        }
    };

    let ok = database == "connected";
    let response = HealthResponse {
        status: if ok { "ok" } else { "degraded" },
        database,
        latency_ms,
        entries,
        schema: state.schema().as_str(),
        timestamp: now_iso(),
    };

    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(response)).into_response()
}

async fn live(State(state): State<AppState>) -> Response {
    Json(LivenessResponse {
        status: "healthy",
        uptime: state.uptime_seconds(),
        start_time: system_time_iso(state.started_at_system()),
        timestamp: now_iso(),
    })
    .into_response()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn system_time_iso(value: SystemTime) -> String {
    DateTime::<Utc>::from(value).to_rfc3339_opts(SecondsFormat::Millis, true)
}
