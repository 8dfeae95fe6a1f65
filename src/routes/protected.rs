use crate::auth::Granted;
use tracing::debug;

pub(crate) const PROTECTED_CONTENT: &str = "Hello! You are viewing protected content.";

/// A sanity check endpoint only granted wallets can reach.
#[utoipa::path(
    get,
    path = "/protected",
    responses(
        (status = OK, body = String, description = "The protected content", example = "Hello! You are viewing protected content."),
        (status = 401, body = String, description = "No session, or the wallet is not granted"),
        (status = 403, body = String, description = "The session is invalid or expired"),
    ),
    security(("bearer" = []))
)]
pub(crate) async fn handler(Granted(claims): Granted) -> &'static str {
    debug!("Serving protected content to {}", claims.wallet_address);
    PROTECTED_CONTENT
}
