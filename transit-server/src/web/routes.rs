//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::domain::{RoutePoint, parse_iso_datetime};
use crate::siri::{SiriError, SourceStatus};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/next_passages", get(next_passages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Real-time source status, circuit breaker included.
async fn status(State(state): State<AppState>) -> Json<SourceStatus> {
    Json(state.siri.status())
}

/// Next passages at a route point.
///
/// Provider outages are not errors: the response then says `realtime: false`.
async fn next_passages(
    State(state): State<AppState>,
    Query(req): Query<NextPassagesRequest>,
) -> Result<Json<NextPassagesResponse>, AppError> {
    let count = req.count.unwrap_or(DEFAULT_COUNT);
    if count == 0 || count > MAX_COUNT {
        return Err(AppError::BadRequest {
            message: format!("count must be between 1 and {MAX_COUNT}, got {count}"),
        });
    }

    let now = Utc::now();
    let from_dt = match req.from.as_deref() {
        Some(from) => parse_iso_datetime(from).map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?,
        None => now,
    };

    let siri = &state.siri;
    let route_point =
        RoutePoint::single_tag(siri.object_id_tag(), req.stop_point, req.line, req.route);

    let passages = siri.next_passages(&route_point, count, from_dt, now).await?;

    Ok(Json(NextPassagesResponse::new(siri.id(), passages.as_deref())))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    BadGateway { message: String },
}

impl From<SiriError> for AppError {
    fn from(e: SiriError) -> Self {
        AppError::BadGateway {
            message: e.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => {
                warn!(%message, "bad request");
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::BadGateway { message } => {
                error!(%message, "real-time provider returned an unusable response");
                (StatusCode::BAD_GATEWAY, message)
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
