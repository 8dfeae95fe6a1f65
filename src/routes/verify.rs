use crate::routes::{ApiError, Json};
use crate::signed::SignedNonce;
use crate::state::SharedState;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VerifyRequest {
    /// The nonce returned by `/signup`.
    #[schema(examples(crate::docs::nonce))]
    nonce: Option<String>,

    /// The wallet's `personal_sign` signature over the nonce, in hex form.
    #[schema(examples(crate::docs::signed_message))]
    signed_message: Option<String>,
}

/// A freshly issued session.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct VerifyResponse {
    /// The session token in JWT serialized form.
    #[schema(examples(crate::docs::session_token))]
    token: String,
}

/// Exchange a signed nonce for a session token.
#[utoipa::path(
    post,
    path = "/verify",
    request_body = VerifyRequest,
    responses(
        (status = OK, body = VerifyResponse, description = "A session token valid for one day"),
        (status = 400, body = String, description = "Missing fields, a malformed signature or a nonce that doesn't match the signer"),
    )
)]
pub(crate) async fn handler(
    state: SharedState,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let (Some(nonce), Some(signed_message)) = (request.nonce, request.signed_message) else {
        return Err(ApiError::InvalidInput("`nonce` and `signedMessage` are required".into()));
    };
    let signed = SignedNonce { nonce, signed_message };
    let address = signed.recover().map_err(|e| {
        counter!("verification_failures_total", "reason" => "signature").increment(1);
        ApiError::VerificationFailed(e.to_string())
    })?;

    // Only a signer that owns the address the nonce was derived for can produce a match.
    let expected = state.parameters.nonces.generate(&address);
    if expected.as_bytes() != signed.nonce.as_bytes() {
        warn!("Nonce mismatch for recovered signer {address}");
        counter!("verification_failures_total", "reason" => "nonce").increment(1);
        return Err(ApiError::NonceMismatch);
    }

    let now = state.services.time.current_time();
    let token = state.parameters.sessions.issue(address, now).map_err(|e| {
        error!("Failed to sign session: {e}");
        ApiError::Internal
    })?;
    info!("Issued session for {address}");
    counter!("sessions_issued_total").increment(1);
    Ok(Json(VerifyResponse { token }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SessionIssuer, SESSION_LIFETIME};
    use crate::tests::{random_wallet, sign_message, AppStateBuilder, TOKEN_SECRET};
    use crate::nonce::NonceGenerator;
    use axum::extract::State;
    use chrono::{DateTime, Utc};
    use rstest::rstest;

    #[derive(Default)]
    struct Handler {
        builder: AppStateBuilder,
    }

    impl Handler {
        async fn invoke(self, nonce: Option<String>, signed_message: Option<String>) -> Result<VerifyResponse, ApiError> {
            let state = self.builder.build();
            let request = VerifyRequest { nonce, signed_message };
            handler(State(state), Json(request)).await.map(|r| r.0)
        }
    }

    #[tokio::test]
    async fn valid_signature() {
        let (key, address) = random_wallet();
        let mut handler = Handler::default();
        let now = DateTime::from_timestamp(Utc::now().timestamp(), 0).unwrap();
        handler.builder.current_time = Some(now);
        let nonce = handler.builder.nonce_for(&address);
        let signed_message = sign_message(&key, &nonce);

        let response = handler.invoke(Some(nonce), Some(signed_message)).await.expect("verify failed");
        let claims = SessionIssuer::new(TOKEN_SECRET).validate(&response.token).expect("invalid token");
        assert_eq!(claims.wallet_address, address);
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + SESSION_LIFETIME).timestamp());
    }

    #[tokio::test]
    async fn stale_nonce_after_secret_rotation() {
        let (key, address) = random_wallet();
        let stale_nonce = NonceGenerator::new("old-secret").generate(&address);
        let signed_message = sign_message(&key, &stale_nonce);

        let mut handler = Handler::default();
        handler.builder.nonce_secret = "new-secret".into();
        let err = handler.invoke(Some(stale_nonce), Some(signed_message)).await.expect_err("verify succeeded");
        assert!(matches!(err, ApiError::NonceMismatch), "{err:?}");
    }

    #[tokio::test]
    async fn signed_by_another_wallet() {
        let (_, victim) = random_wallet();
        let (attacker_key, _) = random_wallet();
        let handler = Handler::default();
        let nonce = handler.builder.nonce_for(&victim);
        let signed_message = sign_message(&attacker_key, &nonce);

        let err = handler.invoke(Some(nonce), Some(signed_message)).await.expect_err("verify succeeded");
        assert!(matches!(err, ApiError::NonceMismatch), "{err:?}");
    }

    #[tokio::test]
    async fn uppercase_nonce_is_rejected() {
        let (key, address) = random_wallet();
        let handler = Handler::default();
        let nonce = handler.builder.nonce_for(&address).to_uppercase();
        let signed_message = sign_message(&key, &nonce);

        let err = handler.invoke(Some(nonce), Some(signed_message)).await.expect_err("verify succeeded");
        assert!(matches!(err, ApiError::NonceMismatch), "{err:?}");
    }

    #[tokio::test]
    #[rstest]
    #[case::not_hex("0xzz")]
    #[case::too_short("0x1234")]
    #[case::empty("")]
    async fn malformed_signature(#[case] signed_message: &str) {
        let (_, address) = random_wallet();
        let handler = Handler::default();
        let nonce = handler.builder.nonce_for(&address);
        let err = handler.invoke(Some(nonce), Some(signed_message.into())).await.expect_err("verify succeeded");
        assert!(matches!(err, ApiError::VerificationFailed(_)), "{err:?}");
    }

    #[tokio::test]
    #[rstest]
    #[case::no_nonce(None, Some("0x00".into()))]
    #[case::no_signature(Some("abc".into()), None)]
    #[case::nothing(None, None)]
    async fn missing_fields(#[case] nonce: Option<String>, #[case] signed_message: Option<String>) {
        let err = Handler::default().invoke(nonce, signed_message).await.expect_err("verify succeeded");
        assert!(matches!(err, ApiError::InvalidInput(_)), "{err:?}");
    }

    #[tokio::test]
    async fn two_verifications_issue_distinct_tokens() {
        let (key, address) = random_wallet();
        let now = Utc::now();
        let mut first = Handler::default();
        first.builder.current_time = Some(now);
        let mut second = Handler::default();
        second.builder.current_time = Some(now);
        let nonce = first.builder.nonce_for(&address);
        let signed_message = sign_message(&key, &nonce);
        let first = first.invoke(Some(nonce.clone()), Some(signed_message.clone())).await.expect("verify failed");
        let second = second.invoke(Some(nonce), Some(signed_message)).await.expect("verify failed");
        assert_ne!(first.token, second.token);
    }
}
