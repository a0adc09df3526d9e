//! HTTP plumbing shared by the algod and indexer clients.
//!
//! # Responsibilities
//! - Attach the API-key header to every request
//! - Enforce per-request deadlines where the caller asks for one
//! - Fail reads over across endpoints; writes go to the primary only
//! - Turn error bodies into `NodeError::Status` with the service's message

use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::blockchain::types::{ErrorBody, NodeError, NodeResult};

/// A set of endpoints for one service plus the client used to reach them.
#[derive(Clone)]
pub(crate) struct ApiTransport {
    http: Client,
    /// Primary endpoint first, then failovers.
    endpoints: Vec<Url>,
    api_key_header: HeaderName,
    api_key: HeaderValue,
    timeout_duration: Duration,
}

impl ApiTransport {
    pub(crate) fn new(
        primary: &str,
        failovers: &[String],
        api_key_header: &str,
        api_key: &str,
        timeout_secs: u64,
    ) -> NodeResult<Self> {
        let primary_url = Url::parse(primary)
            .map_err(|e| NodeError::Config(format!("Invalid endpoint '{}': {}", primary, e)))?;
        let mut endpoints = vec![primary_url];

        for url_str in failovers {
            match Url::parse(url_str) {
                Ok(url) => endpoints.push(url),
                Err(_) => tracing::warn!(url = %url_str, "Ignoring invalid failover endpoint"),
            }
        }

        let api_key_header = HeaderName::from_bytes(api_key_header.as_bytes())
            .map_err(|e| NodeError::Config(format!("Invalid API key header: {}", e)))?;
        let mut api_key = HeaderValue::from_str(api_key)
            .map_err(|e| NodeError::Config(format!("Invalid API key: {}", e)))?;
        api_key.set_sensitive(true);

        let http = Client::builder()
            .build()
            .map_err(|e| NodeError::Config(e.to_string()))?;

        Ok(Self {
            http,
            endpoints,
            api_key_header,
            api_key,
            timeout_duration: Duration::from_secs(timeout_secs),
        })
    }

    pub(crate) fn primary(&self) -> &Url {
        &self.endpoints[0]
    }

    /// GET with the configured request timeout.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> NodeResult<T> {
        self.get_with_deadline(path, Some(self.timeout_duration)).await
    }

    /// GET without a deadline, for calls the server holds open on purpose.
    pub(crate) async fn get_blocking<T: DeserializeOwned>(&self, path: &str) -> NodeResult<T> {
        self.get_with_deadline(path, None).await
    }

    async fn get_with_deadline<T: DeserializeOwned>(
        &self,
        path: &str,
        deadline: Option<Duration>,
    ) -> NodeResult<T> {
        let mut last_error = NodeError::Transport("No endpoints configured".to_string());

        for (i, base) in self.endpoints.iter().enumerate() {
            let url = join(base, path)?;
            let mut request = self
                .http
                .get(url)
                .header(self.api_key_header.clone(), self.api_key.clone());
            if let Some(deadline) = deadline {
                request = request.timeout(deadline);
            }

            match request.send().await {
                Ok(response) => return decode(response).await,
                Err(e) => {
                    let err = self.transport_error(e);
                    tracing::warn!(endpoint_idx = i, error = %err, "Request failed, trying next endpoint");
                    last_error = err;
                }
            }
        }

        Err(last_error)
    }

    /// POST raw bytes to the primary endpoint.
    pub(crate) async fn post_bytes<T: DeserializeOwned>(
        &self,
        path: &str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> NodeResult<T> {
        let url = join(self.primary(), path)?;
        let response = self
            .http
            .post(url)
            .header(self.api_key_header.clone(), self.api_key.clone())
            .header(CONTENT_TYPE, content_type)
            .timeout(self.timeout_duration)
            .body(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;
        decode(response).await
    }

    fn transport_error(&self, e: reqwest::Error) -> NodeError {
        if e.is_timeout() {
            NodeError::Timeout(self.timeout_duration.as_secs())
        } else {
            NodeError::Transport(e.to_string())
        }
    }
}

fn join(base: &Url, path: &str) -> NodeResult<Url> {
    let joined = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&joined).map_err(|e| NodeError::Config(format!("Invalid URL '{}': {}", joined, e)))
}

async fn decode<T: DeserializeOwned>(response: Response) -> NodeResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| NodeError::Transport(e.to_string()))?;

    if !status.is_success() {
        return Err(NodeError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| NodeError::Decode(e.to_string()))
}

/// The service's `message` field, or the raw body when it is not JSON.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
