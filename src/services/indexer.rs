use crate::config::IndexerConfig;
use anyhow::Context;
use async_trait::async_trait;
use metrics::histogram;
use serde::Serialize;
use tokio::time::Instant;
use tracing::info;

/// A read-only query endpoint over indexed on-chain events.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WalletIndex: Send + Sync + 'static {
    /// Run a query and return the raw JSON response.
    async fn query(&self, query: &str) -> Result<serde_json::Value, IndexerError>;
}

/// Build the query that lists wallets by their granted status.
pub(crate) fn wallets_query(granted: bool) -> String {
    format!("{{ wallets(where: {{ granted: {granted} }}) {{ id address granted }} }}")
}

/// A GraphQL indexing API client.
pub struct GraphIndexer {
    client: reqwest::Client,
    url: String,
}

impl GraphIndexer {
    pub fn new(config: &IndexerConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build indexer client")?;
        Ok(Self { client, url: config.url.clone() })
    }
}

#[async_trait]
impl WalletIndex for GraphIndexer {
    async fn query(&self, query: &str) -> Result<serde_json::Value, IndexerError> {
        info!("Querying indexer at {}", self.url);
        let now = Instant::now();
        let response = self
            .client
            .post(&self.url)
            .json(&QueryRequest { query })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(IndexerError::Transport)?;
        // Read the whole body before parsing so a truncated response is a transport error.
        let body = response.bytes().await.map_err(IndexerError::Transport)?;
        histogram!("indexer_query_duration_seconds").record(now.elapsed().as_secs_f64());
        serde_json::from_slice(&body).map_err(IndexerError::MalformedResponse)
    }
}

#[derive(Serialize)]
struct QueryRequest<'a> {
    query: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum IndexerError {
    #[error("transport: {0}")]
    Transport(reqwest::Error),

    #[error("malformed response: {0}")]
    MalformedResponse(serde_json::Error),
}
