use reqwest::header::ACCEPT;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::Result;

/// One outgoing call: a JSON POST to `url` with `query` appended.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub body: Value,
}

/// Carries a [`TransportRequest`] to the service and hands back the decoded
/// response body, or `None` when there was no usable body.
///
/// Errors raised here reach the caller unchanged.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, request: TransportRequest) -> Result<Option<Value>>;
}

/// The production transport, backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
        })
    }
}

#[async_trait::async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, request: TransportRequest) -> Result<Option<Value>> {
        let resp = self
            .http
            .post(&request.url)
            .query(&request.query)
            .header(ACCEPT, "application/json")
            .json(&request.body)
            .send()
            .await?
            .error_for_status()?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            tracing::debug!(%status, "empty response body");
            return Ok(None);
        }

        match serde_json::from_slice(&bytes) {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                tracing::debug!(%status, error = %e, "response body is not JSON");
                Ok(None)
            }
        }
    }
}
