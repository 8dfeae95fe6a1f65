use crate::{
    nonce::NonceGenerator,
    services::{indexer::WalletIndex, oracle::MembershipOracle, storage::StorageGateway},
    session::SessionIssuer,
    time::TimeService,
    wallet::WalletAddress,
};
use axum::extract::State;
use chrono::{DateTime, Utc};
use std::sync::Arc;

pub(crate) type SharedState = State<Arc<AppState>>;

/// Services used by the application.
pub struct Services {
    /// The allow-list oracle.
    pub oracle: Box<dyn MembershipOracle>,

    /// The indexing API.
    pub index: Box<dyn WalletIndex>,

    /// The storage node requests are forwarded to.
    pub storage: StorageGateway,

    /// A service that provides the current time.
    pub time: Box<dyn TimeService>,
}

/// Parameters fixed at startup.
pub struct Parameters {
    /// Derives challenge nonces.
    pub nonces: NonceGenerator,

    /// Issues and validates session tokens.
    pub sessions: SessionIssuer,

    /// The allow-list contract address.
    pub contract_address: WalletAddress,

    /// The timestamp at which the service was started.
    pub started_at: DateTime<Utc>,
}

/// The state to be shared across all routes.
pub struct AppState {
    /// The parameters the application uses.
    pub parameters: Parameters,

    /// The services the application uses.
    pub services: Services,
}
