use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use strum::EnumDiscriminants;
use tower_http::cors::CorsLayer;
use tracing::warn;

pub(crate) mod about;
pub(crate) mod health;
pub(crate) mod protected;
pub(crate) mod signup;
pub(crate) mod storage;
pub(crate) mod verify;
pub(crate) mod wallets;

pub fn build_router(state: AppState) -> Router {
    let state = Arc::new(state);
    Router::new()
        .route("/health", get(health::handler))
        .route("/about", get(about::handler))
        .route("/openapi.json", get(crate::docs::handler))
        .route("/signup", post(signup::handler))
        .route("/verify", post(verify::handler))
        .route("/protected", get(protected::handler))
        .route("/api/v0/add", any(storage::add))
        .route("/api/v0/cat", any(storage::cat))
        .route("/approved-wallets", get(wallets::approved))
        .route("/submitted-wallets", get(wallets::submitted))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// An error when handling a request.
///
/// Every handler and extractor funnels its failures through this type so the mapping to an HTTP
/// status lives in one place. The response body is the plain text message.
#[derive(Debug, thiserror::Error, EnumDiscriminants)]
pub(crate) enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    #[error("nonce does not match signer")]
    NonceMismatch,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("membership oracle unavailable")]
    OracleUnavailable,

    #[error("indexer query failed")]
    OracleQueryFailed,

    #[error("storage gateway unavailable")]
    StorageUnavailable,

    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::VerificationFailed(_) | Self::NonceMismatch => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::StorageUnavailable => StatusCode::BAD_GATEWAY,
            Self::OracleUnavailable | Self::OracleQueryFailed | Self::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let discriminant = ApiErrorDiscriminants::from(&self);
        let status = self.status();
        warn!("Request failed with {discriminant:?} ({status}): {self}");
        (status, self.to_string()).into_response()
    }
}

/// A type that behaves like `axum::Json` but turns body parsing failures into `InvalidInput`.
#[derive(Debug)]
pub(crate) struct Json<T>(pub T);

impl<S, T> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match axum::Json::<T>::from_request(req, state).await {
            Ok(value) => Ok(Self(value.0)),
            Err(rejection) => Err(ApiError::InvalidInput(rejection.body_text())),
        }
    }
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_input(ApiError::InvalidInput("walletAddress is required".into()), StatusCode::BAD_REQUEST)]
    #[case::verification(ApiError::VerificationFailed("malformed signature".into()), StatusCode::BAD_REQUEST)]
    #[case::nonce_mismatch(ApiError::NonceMismatch, StatusCode::BAD_REQUEST)]
    #[case::unauthorized(ApiError::Unauthorized("wallet is not granted".into()), StatusCode::UNAUTHORIZED)]
    #[case::forbidden(ApiError::Forbidden("session expired".into()), StatusCode::FORBIDDEN)]
    #[case::oracle(ApiError::OracleUnavailable, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::indexer(ApiError::OracleQueryFailed, StatusCode::INTERNAL_SERVER_ERROR)]
    #[case::storage(ApiError::StorageUnavailable, StatusCode::BAD_GATEWAY)]
    #[case::internal(ApiError::Internal, StatusCode::INTERNAL_SERVER_ERROR)]
    fn status_codes(#[case] error: ApiError, #[case] expected: StatusCode) {
        assert_eq!(error.status(), expected);
    }

    #[tokio::test]
    async fn plain_text_body() {
        let response = ApiError::Unauthorized("wallet is not granted".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers()["content-type"].to_str().unwrap().starts_with("text/plain"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "wallet is not granted");
    }
}
