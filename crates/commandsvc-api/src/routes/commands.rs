//! Route for creating MDM commands.

use axum::body::Body;
use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::Serialize;
use tracing::{debug, instrument};

use commandsvc_mdm::{CommandRequest, Payload};

use crate::error::ApiError;
use crate::state::AppState;

/// Largest request body accepted, in bytes.
pub const MAX_REQUEST_BYTES: usize = 10_000;

/// Response body returned after a command is created.
#[derive(Debug, Serialize)]
pub struct NewCommandResponse {
    /// The created command.
    pub payload: Payload,
}

/// Reads at most [`MAX_REQUEST_BYTES`] of `body` and decodes it as a
/// command request.
///
/// # Errors
///
/// Returns [`ApiError::Decode`] if the body is too large, empty, or not a
/// JSON command request.
pub async fn decode_request(body: Body) -> Result<CommandRequest, ApiError> {
    let bytes = axum::body::to_bytes(body, MAX_REQUEST_BYTES)
        .await
        .map_err(|_| {
            ApiError::Decode(format!(
                "request body must be at most {MAX_REQUEST_BYTES} bytes"
            ))
        })?;
    if bytes.is_empty() {
        return Err(ApiError::Decode("request body is empty".into()));
    }
    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::Decode(format!("request body is not a command request: {e}")))
}

/// POST /commands
#[instrument(skip(state, body))]
async fn new_command(
    State(state): State<AppState>,
    body: Body,
) -> Result<(StatusCode, Json<NewCommandResponse>), ApiError> {
    let request = decode_request(body).await?;
    debug!(udid = %request.udid, request_type = %request.request_type, "request decoded");

    let payload = state.endpoint.new_command(request).await?;

    Ok((StatusCode::CREATED, Json(NewCommandResponse { payload })))
}

/// Returns the commands router.
pub fn router() -> Router<AppState> {
    Router::new().route("/commands", post(new_command))
}
