use crate::auth::Granted;
use crate::routes::ApiError;
use crate::state::SharedState;
use axum::{extract::Request, response::Response};
use tracing::error;

const ADD_PATH: &str = "/api/v0/add";
const CAT_PATH: &str = "/api/v0/cat";

/// Forward an upload to the storage node. Only granted wallets may add content.
#[utoipa::path(
    post,
    path = "/api/v0/add",
    responses(
        (status = OK, description = "The storage node's response, relayed verbatim"),
        (status = 401, body = String, description = "No session, or the wallet is not granted"),
        (status = 403, body = String, description = "The session is invalid or expired"),
        (status = 502, body = String, description = "The storage node could not be reached"),
    ),
    security(("bearer" = []))
)]
pub(crate) async fn add(
    state: SharedState,
    _granted: Granted,
    request: Request,
) -> Result<Response, ApiError> {
    forward(&state, ADD_PATH, request).await
}

/// Forward a retrieval to the storage node. Content is public.
#[utoipa::path(
    get,
    path = "/api/v0/cat",
    responses(
        (status = OK, description = "The storage node's response, relayed verbatim"),
        (status = 502, body = String, description = "The storage node could not be reached"),
    )
)]
pub(crate) async fn cat(state: SharedState, request: Request) -> Result<Response, ApiError> {
    forward(&state, CAT_PATH, request).await
}

async fn forward(state: &SharedState, path: &str, request: Request) -> Result<Response, ApiError> {
    state.services.storage.forward(path, request).await.map_err(|e| {
        error!("Forwarding to {path} failed: {e}");
        ApiError::StorageUnavailable
    })
}
