use crate::routes::{ApiError, Json};
use crate::state::SharedState;
use crate::wallet::WalletAddress;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest {
    /// The wallet requesting a challenge.
    #[schema(examples(crate::docs::wallet_address))]
    wallet_address: Option<String>,
}

/// The challenge for a wallet.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct SignupResponse {
    /// The nonce the wallet must sign, in hex form.
    #[schema(examples(crate::docs::nonce))]
    nonce: String,
}

/// Request the challenge nonce for a wallet.
///
/// The nonce is deterministic, so repeated calls for the same wallet return the same value.
#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = OK, body = SignupResponse, description = "The nonce the wallet must sign"),
        (status = 400, body = String, description = "The wallet address is missing or malformed"),
    )
)]
pub(crate) async fn handler(
    state: SharedState,
    Json(request): Json<SignupRequest>,
) -> Result<Json<SignupResponse>, ApiError> {
    let address = request
        .wallet_address
        .ok_or_else(|| ApiError::InvalidInput("`walletAddress` is required".into()))?;
    let address: WalletAddress = address
        .parse()
        .map_err(|e| ApiError::InvalidInput(format!("invalid `walletAddress`: {e}")))?;
    let nonce = state.parameters.nonces.generate(&address);
    info!("Issued nonce for {address}");
    counter!("nonces_issued_total").increment(1);
    Ok(Json(SignupResponse { nonce }))
}
