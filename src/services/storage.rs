use crate::config::StorageConfig;
use anyhow::Context;
use axum::{
    body::{Body, HttpBody},
    extract::Request,
    http::{
        header::{CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, HOST, TRANSFER_ENCODING},
        HeaderName,
    },
    response::Response,
};
use tracing::info;

/// The only request headers relayed to the storage node. Credentials never leave the gateway.
const RELAYED_REQUEST_HEADERS: [HeaderName; 2] = [CONTENT_TYPE, CONTENT_LENGTH];

/// Hop-by-hop headers that must not be relayed back to the caller.
const HOP_HEADERS: [HeaderName; 3] = [CONNECTION, HOST, TRANSFER_ENCODING];

/// Relays requests to the content storage node's HTTP API.
pub struct StorageGateway {
    client: reqwest::Client,
    base_url: String,
}

impl StorageGateway {
    pub fn new(config: &StorageConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build storage client")?;
        Ok(Self { client, base_url: format!("http://{}:{}", config.host, config.port) })
    }

    /// Forward a request to `path` on the storage node and stream its response back.
    ///
    /// The method, query string, content headers and body are relayed as is.
    pub async fn forward(&self, path: &str, request: Request) -> Result<Response, StorageError> {
        let (parts, body) = request.into_parts();
        let mut url = format!("{}{path}", self.base_url);
        if let Some(query) = parts.uri.query() {
            url.push('?');
            url.push_str(query);
        }
        info!("Forwarding {} request to {url}", parts.method);

        let mut upstream = self.client.request(parts.method, url);
        for (name, value) in &parts.headers {
            if RELAYED_REQUEST_HEADERS.contains(name) {
                upstream = upstream.header(name, value);
            }
        }
        if body.size_hint().exact() != Some(0) {
            upstream = upstream.body(reqwest::Body::wrap_stream(body.into_data_stream()));
        }
        let response = upstream
            .send()
            .await
            .map_err(StorageError::Transport)?;

        let mut builder = Response::builder().status(response.status());
        for (name, value) in response.headers() {
            if !HOP_HEADERS.contains(name) {
                builder = builder.header(name, value);
            }
        }
        builder
            .body(Body::from_stream(response.bytes_stream()))
            .map_err(StorageError::Response)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("transport: {0}")]
    Transport(reqwest::Error),

    #[error("invalid response: {0}")]
    Response(axum::http::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::to_bytes,
        http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
        routing::any,
        Router,
    };
    use std::time::Duration;
    use tokio::net::TcpListener;

    async fn upstream() -> u16 {
        let router = Router::new()
            .route(
                "/api/v0/add",
                any(|method: Method, uri: axum::http::Uri, body: String| async move {
                    (
                        StatusCode::CREATED,
                        [("x-upstream", "yes")],
                        format!("{method} {} {body}", uri.query().unwrap_or_default()),
                    )
                }),
            )
            .route(
                "/headers",
                any(|headers: HeaderMap| async move {
                    let mut names: Vec<_> = headers.keys().map(|name| name.to_string()).collect();
                    names.sort();
                    format!(
                        "{} | {}",
                        names.join(","),
                        headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).unwrap_or_default()
                    )
                }),
            );
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind failed");
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move { axum::serve(listener, router).await });
        port
    }

    fn gateway(port: u16) -> StorageGateway {
        StorageGateway::new(&StorageConfig {
            host: "127.0.0.1".into(),
            port,
            request_timeout: Duration::from_secs(5),
        })
        .expect("failed to build gateway")
    }

    #[tokio::test]
    async fn relays_request_and_response() {
        let gateway = gateway(upstream().await);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/v0/add?pin=true")
            .body(Body::from("hello"))
            .unwrap();
        let response = gateway.forward("/api/v0/add", request).await.expect("forward failed");
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-upstream"], "yes");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "POST pin=true hello");
    }

    #[tokio::test]
    async fn only_content_headers_are_relayed() {
        let gateway = gateway(upstream().await);
        let request = Request::builder()
            .method(Method::POST)
            .uri("/headers")
            .header(AUTHORIZATION, "Bearer session-token")
            .header("cookie", "a=b")
            .header(CONTENT_TYPE, "multipart/form-data; boundary=x")
            .header(CONTENT_LENGTH, "5")
            .body(Body::from("hello"))
            .unwrap();
        let response = gateway.forward("/headers", request).await.expect("forward failed");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        let (names, content_type) = body.split_once(" | ").expect("unexpected body");
        assert!(!names.contains("authorization"), "{names}");
        assert!(!names.contains("cookie"), "{names}");
        assert!(names.contains("content-length"), "{names}");
        assert_eq!(content_type, "multipart/form-data; boundary=x");
    }

    #[tokio::test]
    async fn unreachable_node() {
        let gateway = gateway(9);
        let request = Request::builder().uri("/api/v0/cat").body(Body::empty()).unwrap();
        let err = gateway.forward("/api/v0/cat", request).await.expect_err("forward succeeded");
        assert!(matches!(err, StorageError::Transport(_)), "{err:?}");
    }
}
