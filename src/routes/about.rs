use crate::routes::Json;
use crate::state::SharedState;
use crate::wallet::WalletAddress;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct About {
    #[schema(examples("0.1.0"))]
    version: &'static str,

    /// The allow-list contract membership is checked against.
    #[schema(value_type = String, examples(crate::docs::wallet_address))]
    contract_address: WalletAddress,

    started: DateTime<Utc>,
}

/// Get general information about this instance.
#[utoipa::path(get, path = "/about", responses((status = OK, body = About, description = "Information about this instance")))]
pub(crate) async fn handler(state: SharedState) -> Json<About> {
    Json(About {
        version: env!("CARGO_PKG_VERSION"),
        contract_address: state.parameters.contract_address,
        started: state.parameters.started_at,
    })
}
