use crate::routes::ApiError;
use crate::session::{SessionClaims, SessionError};
use crate::state::AppState;
use axum::{extract::FromRequestParts, http::request::Parts};
use metrics::counter;
use std::sync::Arc;
use tracing::{error, info};

const AUTHORIZATION_HEADER: &str = "Authorization";

enum TokenExtractionError {
    MissingHeader,
    InvalidHeaderValue,
    MissingBearerPrefix,
    Session(SessionError),
}

impl From<TokenExtractionError> for ApiError {
    fn from(e: TokenExtractionError) -> Self {
        match e {
            TokenExtractionError::MissingHeader => {
                Self::Unauthorized(format!("`{AUTHORIZATION_HEADER}` header missing"))
            }
            TokenExtractionError::InvalidHeaderValue => {
                Self::Forbidden("header value is not valid utf8".into())
            }
            TokenExtractionError::MissingBearerPrefix => {
                Self::Forbidden("missing `Bearer ` prefix in header".into())
            }
            TokenExtractionError::Session(e) => Self::Forbidden(e.to_string()),
        }
    }
}

/// A validated session token.
#[derive(Debug)]
pub(crate) struct Session(pub(crate) SessionClaims);

impl FromRequestParts<Arc<AppState>> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let claims = extract_and_validate_token(parts, state)?;
        Ok(Self(claims))
    }
}

/// A session whose wallet is currently on the allow-list.
#[derive(Debug)]
pub(crate) struct Granted(pub(crate) SessionClaims);

impl FromRequestParts<Arc<AppState>> for Granted {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Role::Granted).await.map(Self)
    }
}

/// A session whose wallet currently holds the admin role.
#[derive(Debug)]
pub(crate) struct Admin(pub(crate) SessionClaims);

impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        admit(parts, state, Role::Admin).await.map(Self)
    }
}

#[derive(Clone, Copy, Debug)]
enum Role {
    Granted,
    Admin,
}

impl Role {
    fn label(self) -> &'static str {
        match self {
            Self::Granted => "granted",
            Self::Admin => "admin",
        }
    }
}

// The oracle is asked on every request: membership can change on chain at any time.
async fn admit(
    parts: &mut Parts,
    state: &AppState,
    role: Role,
) -> Result<SessionClaims, ApiError> {
    let claims = extract_and_validate_token(parts, state)?;
    let oracle = &state.services.oracle;
    let address = &claims.wallet_address;
    let result = match role {
        Role::Granted => oracle.is_granted(address).await,
        Role::Admin => oracle.is_admin(address).await,
    };
    match result {
        Ok(true) => Ok(claims),
        Ok(false) => {
            info!("Wallet {address} denied, not {}", role.label());
            counter!("oracle_denials_total", "role" => role.label()).increment(1);
            Err(ApiError::Unauthorized(format!("wallet is not {}", role.label())))
        }
        Err(e) => {
            error!("Failed to check {} status for {address}: {e}", role.label());
            Err(ApiError::OracleUnavailable)
        }
    }
}

fn extract_and_validate_token(
    parts: &Parts,
    state: &AppState,
) -> Result<SessionClaims, TokenExtractionError> {
    let value = parts
        .headers
        .get(AUTHORIZATION_HEADER)
        .ok_or(TokenExtractionError::MissingHeader)?;
    let payload = value.to_str().map_err(|_| TokenExtractionError::InvalidHeaderValue)?;
    let payload = payload
        .strip_prefix("Bearer ")
        .ok_or(TokenExtractionError::MissingBearerPrefix)?;
    state
        .parameters
        .sessions
        .validate(payload)
        .map_err(TokenExtractionError::Session)
}
