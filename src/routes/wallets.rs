use crate::auth::Admin;
use crate::routes::{ApiError, Json};
use crate::services::indexer::wallets_query;
use crate::state::SharedState;
use tracing::{error, info};

/// List the wallets that have been granted access.
#[utoipa::path(
    get,
    path = "/approved-wallets",
    responses(
        (status = OK, body = serde_json::Value, description = "The indexing API response, relayed verbatim"),
        (status = 401, body = String, description = "No session, or the wallet is not an admin"),
        (status = 403, body = String, description = "The session is invalid or expired"),
    ),
    security(("bearer" = []))
)]
pub(crate) async fn approved(
    state: SharedState,
    admin: Admin,
) -> Result<Json<serde_json::Value>, ApiError> {
    list(&state, admin, true).await
}

/// List the wallets that submitted a request and are still pending.
#[utoipa::path(
    get,
    path = "/submitted-wallets",
    responses(
        (status = OK, body = serde_json::Value, description = "The indexing API response, relayed verbatim"),
        (status = 401, body = String, description = "No session, or the wallet is not an admin"),
        (status = 403, body = String, description = "The session is invalid or expired"),
    ),
    security(("bearer" = []))
)]
pub(crate) async fn submitted(
    state: SharedState,
    admin: Admin,
) -> Result<Json<serde_json::Value>, ApiError> {
    list(&state, admin, false).await
}

async fn list(
    state: &SharedState,
    Admin(claims): Admin,
    granted: bool,
) -> Result<Json<serde_json::Value>, ApiError> {
    info!("Admin {} listing wallets with granted = {granted}", claims.wallet_address);
    let response = state.services.index.query(&wallets_query(granted)).await.map_err(|e| {
        error!("Indexer query failed: {e}");
        ApiError::OracleQueryFailed
    })?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::indexer::IndexerError;
    use crate::session::SessionClaims;
    use crate::tests::{random_wallet, AppStateBuilder};
    use axum::extract::State;
    use serde_json::json;

    fn admin() -> Admin {
        let (_, wallet_address) = random_wallet();
        Admin(SessionClaims { wallet_address, iat: 0, exp: 0, jti: String::new() })
    }

    #[tokio::test]
    async fn approved_wallets() {
        let mut builder = AppStateBuilder::default();
        let expected = json!({ "data": { "wallets": [{ "id": "1", "granted": true }] } });
        let response = expected.clone();
        builder
            .index
            .expect_query()
            .withf(|query| query.to_string() == wallets_query(true))
            .return_once(move |_| Ok(response));
        let output = approved(State(builder.build()), admin()).await.expect("query failed");
        assert_eq!(output.0, expected);
    }

    #[tokio::test]
    async fn submitted_wallets() {
        let mut builder = AppStateBuilder::default();
        builder
            .index
            .expect_query()
            .withf(|query| query.to_string() == wallets_query(false))
            .return_once(|_| Ok(json!({ "data": { "wallets": [] } })));
        let output = submitted(State(builder.build()), admin()).await.expect("query failed");
        assert_eq!(output.0["data"]["wallets"], json!([]));
    }

    #[tokio::test]
    async fn indexer_failure() {
        let mut builder = AppStateBuilder::default();
        builder.index.expect_query().return_once(|_| {
            Err(IndexerError::MalformedResponse(serde_json::from_str::<()>("{").unwrap_err()))
        });
        let err = approved(State(builder.build()), admin()).await.expect_err("query succeeded");
        assert!(matches!(err, ApiError::OracleQueryFailed), "{err:?}");
    }
}
