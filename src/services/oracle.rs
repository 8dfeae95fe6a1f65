use crate::{config::ChainConfig, wallet::WalletAddress};
use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, warn};

mod abi {
    alloy_sol_types::sol! {
        function isGranted(address account) external view returns (bool);
        function isAdmin(address account) external view returns (bool);
    }
}

/// The on-chain allow-list, queried live on every check.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MembershipOracle: Send + Sync + 'static {
    /// Whether the wallet has been granted access.
    async fn is_granted(&self, address: &WalletAddress) -> Result<bool, OracleError>;

    /// Whether the wallet holds the admin role.
    async fn is_admin(&self, address: &WalletAddress) -> Result<bool, OracleError>;
}

/// A membership oracle backed by `eth_call`s against the allow-list contract.
pub struct ContractMembershipOracle {
    client: reqwest::Client,
    rpc_url: Url,
    contract: Address,
}

impl ContractMembershipOracle {
    pub fn new(config: &ChainConfig) -> Result<Self, ContractInitError> {
        let rpc_url = Url::parse(&config.rpc_url)
            .map_err(|e| ContractInitError::InvalidRpcUrl(e.to_string()))?;
        let contract: WalletAddress = config
            .contract_address
            .parse()
            .map_err(|_| ContractInitError::InvalidContractAddress(config.contract_address.clone()))?;
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(ContractInitError::Client)?;
        Ok(Self { client, rpc_url, contract: *contract.as_address() })
    }

    async fn call<C: SolCall>(&self, call: C) -> Result<C::Return, OracleError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "eth_call",
            params: (CallParams { to: self.contract, data: call.abi_encode().into() }, "latest"),
        };
        let now = Instant::now();
        let response = self
            .client
            .post(self.rpc_url.clone())
            .json(&request)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let response = match response {
            Ok(response) => response.json::<JsonRpcResponse>().await.map_err(OracleError::Transport),
            Err(e) => Err(OracleError::Transport(e)),
        };
        histogram!("oracle_call_duration_seconds", "method" => C::SIGNATURE)
            .record(now.elapsed().as_secs_f64());
        let output = response.and_then(decode_response::<C>);
        if let Err(e) = &output {
            counter!("oracle_call_failures_total", "method" => C::SIGNATURE).increment(1);
            warn!("Call to {} failed: {e}", C::SIGNATURE);
        }
        output
    }
}

#[async_trait]
impl MembershipOracle for ContractMembershipOracle {
    async fn is_granted(&self, address: &WalletAddress) -> Result<bool, OracleError> {
        let granted = self.call(abi::isGrantedCall { account: *address.as_address() }).await?;
        debug!("Wallet {address} granted: {granted}");
        Ok(granted)
    }

    async fn is_admin(&self, address: &WalletAddress) -> Result<bool, OracleError> {
        let admin = self.call(abi::isAdminCall { account: *address.as_address() }).await?;
        debug!("Wallet {address} admin: {admin}");
        Ok(admin)
    }
}

fn decode_response<C: SolCall>(response: JsonRpcResponse) -> Result<C::Return, OracleError> {
    match response {
        JsonRpcResponse { error: Some(error), .. } => {
            Err(OracleError::Rpc { code: error.code, message: error.message })
        }
        JsonRpcResponse { result: Some(data), .. } => C::abi_decode_returns(&data)
            .map_err(|e| OracleError::MalformedResponse(e.to_string())),
        _ => Err(OracleError::MalformedResponse("response has neither result nor error".into())),
    }
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: (CallParams, &'static str),
}

#[derive(Serialize)]
struct CallParams {
    to: Address,
    data: Bytes,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<Bytes>,

    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("transport: {0}")]
    Transport(reqwest::Error),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ContractInitError {
    #[error("invalid RPC URL: {0}")]
    InvalidRpcUrl(String),

    #[error("invalid contract address: {0}")]
    InvalidContractAddress(String),

    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
}
