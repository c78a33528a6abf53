//! Router and handlers.

use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tracing::warn;

use crate::state::ServerState;
use crate::types::{
    ChatRequest, ChatResponse, ControlRequest, ControlResponse, ErrorResponse, HistoryResponse,
    LimitParams, SensorsResponse, ServiceInfo, StatusResponse, MAX_REQUEST_BODY_SIZE,
};

/// Default row count for `GET /api/sensors`.
const DEFAULT_SENSOR_LIMIT: usize = 50;

/// Default row count for `GET /api/history`.
const DEFAULT_HISTORY_LIMIT: usize = 20;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

/// Build the facade router.
pub fn create_router(state: ServerState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/status", get(get_status))
        .route("/api/control", post(post_control))
        .route("/api/chat", post(post_chat))
        .route("/api/sensors", get(get_sensors))
        .route("/api/history", get(get_history))
        .layer(build_cors(allowed_origins))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_SIZE))
        .with_state(state)
}

/// CORS policy: a configured origin list restricts; no list means open,
/// matching the reference deployment.
fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        status: "online",
        service: "HomeLink Bridge",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now(),
    })
}

async fn get_status(State(state): State<ServerState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        data: state.store.snapshot().await,
        timestamp: Utc::now(),
    })
}

async fn post_control(
    State(state): State<ServerState>,
    Json(request): Json<ControlRequest>,
) -> Result<Json<ControlResponse>, ApiError> {
    let device = request.device.filter(|d| !d.trim().is_empty());
    let action = request.action.filter(|a| !a.trim().is_empty());
    let (Some(device), Some(action)) = (device, action) else {
        return Err(bad_request("Device and action are required"));
    };

    let response = match state.dispatcher.dispatch(&device, &action).await {
        Ok(_) => ControlResponse {
            success: true,
            message: format!("Command sent: {action} {device}"),
            timestamp: Utc::now(),
        },
        Err(e) => ControlResponse {
            success: false,
            message: format!("Command publish failed: {e}"),
            timestamp: Utc::now(),
        },
    };
    Ok(Json(response))
}

async fn post_chat(
    State(state): State<ServerState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Some(message) = request.message.filter(|m| !m.trim().is_empty()) else {
        return Err(bad_request("'message' is required"));
    };

    // Snapshot first; no lock is held across the classifier call.
    let snapshot = state.store.snapshot().await;
    let intent = state.translator.translate(&message, &snapshot).await;

    let command_sent = match intent.command_parts() {
        Some((device, action)) => state
            .dispatcher
            .dispatch(device.as_str(), action.as_str())
            .await
            .is_ok(),
        None => false,
    };

    state
        .history
        .record_chat(&message, &intent.reply, Utc::now())
        .await;

    Ok(Json(ChatResponse {
        success: true,
        reply: intent.reply.clone(),
        intent,
        command_sent,
        timestamp: Utc::now(),
    }))
}

async fn get_sensors(
    State(state): State<ServerState>,
    Query(params): Query<LimitParams>,
) -> Json<SensorsResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_SENSOR_LIMIT);
    Json(SensorsResponse {
        success: true,
        data: state.history.recent_readings(limit).await,
    })
}

async fn get_history(
    State(state): State<ServerState>,
    Query(params): Query<LimitParams>,
) -> Json<HistoryResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Json(HistoryResponse {
        success: true,
        data: state.history.recent_chats(limit).await,
    })
}
