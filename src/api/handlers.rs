//! HTTP request handlers

use super::types::{ErrorResponse, TurnRequest, TurnResponse, LAUNCH_REQUEST};
use super::AppState;
use crate::credential::Credential;
use crate::runtime::{Turn, TurnOutcome};
use crate::state_machine::{Event, Intent, SessionContext};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/turn", post(handle_turn))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Turns
// ============================================================

async fn handle_turn(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    let turn = parse_turn(req)?;
    let outcome = state.runtime.handle_turn(turn).await;
    Ok(Json(into_response(outcome)))
}

/// Decode a host request into a runtime turn
fn parse_turn(req: TurnRequest) -> Result<Turn, AppError> {
    if req.session_id.is_empty() {
        return Err(AppError::BadRequest("session_id is required".to_string()));
    }
    if req.user_id.is_empty() {
        return Err(AppError::BadRequest("user_id is required".to_string()));
    }

    let context = match req.attributes {
        None | Some(serde_json::Value::Null) => SessionContext::default(),
        Some(value) => serde_json::from_value(value)
            .map_err(|e| AppError::BadRequest(format!("Invalid attributes: {e}")))?,
    };

    let event = if req.intent_name == LAUNCH_REQUEST {
        Event::Launch
    } else {
        let intent = Intent::from_name(&req.intent_name);
        if intent.is_unknown() {
            tracing::debug!(intent = %req.intent_name, "Unrecognized intent name");
        }
        Event::Intent(intent)
    };

    if let Some(slots) = &req.slots {
        tracing::debug!(session_id = %req.session_id, slots = %slots, "Ignoring slots");
    }

    Ok(Turn {
        session_id: req.session_id,
        user_id: req.user_id,
        credential: Credential::from_optional(req.credential.as_deref()),
        event,
        context,
    })
}

fn into_response(outcome: TurnOutcome) -> TurnResponse {
    TurnResponse {
        should_end_session: outcome.action.ends_session(),
        action: outcome.action,
        attributes: outcome.context,
    }
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("quizlexa ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        tracing::warn!(status = %status, error = %message, "Rejected request");
        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
