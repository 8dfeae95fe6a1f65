use anyhow::Context;
use serde::Deserialize;
use serde_with::serde_as;
use std::{fs, net::SocketAddr, path::PathBuf, time::Duration};

/// The configuration for the gateway service.
#[derive(Deserialize)]
pub struct Config {
    /// The server configuration.
    pub server: ServerConfig,

    /// Configuration for metrics.
    pub metrics: MetricsConfig,

    /// The secrets used to derive nonces and sign sessions.
    pub secrets: SecretsConfig,

    /// The chain holding the allow-list contract.
    pub chain: ChainConfig,

    /// The storage gateway requests are forwarded to.
    pub storage: StorageConfig,

    /// The indexing API used to list wallets.
    pub indexer: IndexerConfig,
}

impl Config {
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Environment::with_prefix("WALLETGATE").separator("__"));
        if let Some(path) = path {
            builder = builder.add_source(config::File::new(path, config::FileFormat::Yaml));
        }
        let config = builder.build()?;
        let config = config.try_deserialize()?;
        Ok(config)
    }
}

/// The server configuration.
#[derive(Deserialize)]
pub struct ServerConfig {
    /// The endpoint to bind to.
    pub bind_endpoint: SocketAddr,
}

/// The configuration for metrics.
#[derive(Deserialize)]
pub struct MetricsConfig {
    /// The address to bind to.
    pub bind_endpoint: SocketAddr,
}

/// The service secrets.
#[derive(Deserialize)]
pub struct SecretsConfig {
    /// The secret used to sign session tokens.
    pub token: SecretConfig,

    /// The secret mixed into every nonce.
    pub nonce: SecretConfig,
}

/// A secret, either inline or read from a file.
#[derive(Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretConfig {
    /// The raw secret.
    Value(String),

    /// The path to a file containing the secret.
    Path(PathBuf),
}

impl SecretConfig {
    /// Load the secret using this configuration.
    pub fn load(&self) -> anyhow::Result<String> {
        let secret = match self {
            SecretConfig::Value(value) => value.clone(),
            SecretConfig::Path(path) => fs::read_to_string(path)
                .with_context(|| format!("failed to read secret from {}", path.display()))?
                .trim_end()
                .to_string(),
        };
        if secret.is_empty() {
            anyhow::bail!("secret is empty");
        }
        Ok(secret)
    }
}

/// The chain configuration.
#[serde_as]
#[derive(Deserialize)]
pub struct ChainConfig {
    /// The JSON-RPC endpoint.
    pub rpc_url: String,

    /// The address of the allow-list contract.
    pub contract_address: String,

    /// The timeout for every RPC call.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(rename = "request_timeout_seconds", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

/// The storage gateway configuration.
#[serde_as]
#[derive(Deserialize)]
pub struct StorageConfig {
    /// The storage node host.
    pub host: String,

    /// The storage node API port.
    pub port: u16,

    /// The timeout for every forwarded request.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(rename = "request_timeout_seconds", default = "default_storage_timeout")]
    pub request_timeout: Duration,
}

/// The indexing API configuration.
#[serde_as]
#[derive(Deserialize)]
pub struct IndexerConfig {
    /// The query endpoint.
    pub url: String,

    /// The timeout for every query.
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(rename = "request_timeout_seconds", default = "default_request_timeout")]
    pub request_timeout: Duration,
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_storage_timeout() -> Duration {
    Duration::from_secs(120)
}
