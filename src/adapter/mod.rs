//! One-shot HTTP POST → JSON adapter.
//!
//! Sends a JSON payload with a subscription-key header, drains the streamed
//! response into a buffer, and parses the buffer as JSON. Every way the
//! exchange can end is folded into an [`Outcome`]; [`HttpJsonAdapter::execute`]
//! never returns an error, so the conversation always continues with either
//! data or an inline error marker.

pub mod error;

use std::time::Duration;

use anyhow::Result;
use futures::{Stream, StreamExt};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::consts::{DEFAULT_TIMEOUT, SUBSCRIPTION_KEY_HEADER};
use crate::host::{Destination, Host};

pub use error::{AdapterError, FailureKind};

/// A single outbound call, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonRequest {
    /// Bare host (`westeurope.api.cognitive.microsoft.com`) or a full origin
    /// (`http://127.0.0.1:8080`). Bare hosts are reached over https.
    pub endpoint: String,
    pub path: String,
    pub api_key: String,
    pub payload: Value,
}

impl JsonRequest {
    pub fn new(
        endpoint: impl Into<String>,
        path: impl Into<String>,
        api_key: impl Into<String>,
        payload: Value,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            path: path.into(),
            api_key: api_key.into(),
            payload,
        }
    }

    pub fn url(&self) -> String {
        let origin = self.endpoint.trim_end_matches('/');
        if origin.contains("://") {
            format!("{}{}", origin, self.path)
        } else {
            format!("https://{}{}", origin, self.path)
        }
    }

    /// The exact bytes sent on the wire.
    pub fn body(&self) -> Result<Vec<u8>, AdapterError> {
        serde_json::to_vec(&self.payload)
            .map_err(|e| AdapterError::InvalidRequest(format!("payload is not serializable: {e}")))
    }
}

/// Terminal result of one exchange. Errors are data, not failures.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Failure { kind: FailureKind, error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The value a host store receives: the parsed body, or `{"error": msg}`.
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Success(value) => value,
            Outcome::Failure { error, .. } => json!({ "error": error }),
        }
    }

    /// Hand the outcome to its sink. Consumes self, so delivery happens once.
    pub async fn deliver(self, host: &dyn Host, destination: &Destination) -> Result<()> {
        destination.write(host, self.into_value()).await
    }
}

impl From<AdapterError> for Outcome {
    fn from(err: AdapterError) -> Self {
        Outcome::Failure {
            kind: err.kind(),
            error: err.to_string(),
        }
    }
}

/// Issues [`JsonRequest`]s. Cheap to clone; the inner client pools connections.
#[derive(Debug, Clone)]
pub struct HttpJsonAdapter {
    client: reqwest::Client,
    timeout: Duration,
}

impl Default for HttpJsonAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl HttpJsonAdapter {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the exchange under the deadline. Resolves exactly once.
    #[tracing::instrument(name = "adapter.execute", skip_all, fields(url = %request.url()))]
    pub async fn execute(&self, request: &JsonRequest) -> Outcome {
        let outcome = match tokio::time::timeout(self.timeout, self.exchange(request)).await {
            Ok(Ok(value)) => Outcome::Success(value),
            Ok(Err(err)) => err.into(),
            Err(_) => AdapterError::Timeout(self.timeout).into(),
        };

        match &outcome {
            Outcome::Success(_) => debug!("exchange succeeded"),
            Outcome::Failure { kind, error } => warn!(?kind, %error, "exchange failed"),
        }
        outcome
    }

    async fn exchange(&self, request: &JsonRequest) -> Result<Value, AdapterError> {
        if request.endpoint.trim().is_empty() {
            return Err(AdapterError::InvalidRequest("endpoint is empty".into()));
        }
        if request.api_key.is_empty() {
            return Err(AdapterError::InvalidRequest("api key is empty".into()));
        }

        let body = request.body()?;

        let resp = self
            .client
            .post(request.url())
            .header(SUBSCRIPTION_KEY_HEADER, &request.api_key)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            // The body is still parsed; vendor error payloads are data too.
            warn!(%status, "endpoint returned non-success status");
        }

        let bytes = accumulate(resp.bytes_stream()).await?;
        debug!(bytes = bytes.len(), "response body received");

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Drain a chunk stream in order. A stream error discards what was collected.
pub async fn accumulate<S, B, E>(stream: S) -> Result<Vec<u8>, AdapterError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<AdapterError>,
{
    let mut stream = std::pin::pin!(stream);
    let mut body = Vec::new();
    while let Some(chunk) = stream.next().await {
        body.extend_from_slice(chunk.map_err(Into::into)?.as_ref());
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn request(endpoint: &str) -> JsonRequest {
        JsonRequest::new(endpoint, "/v1/things", "secret", json!({"a": 1}))
    }

    #[test]
    fn url_defaults_to_https_for_bare_host() {
        assert_eq!(
            request("eastus.example.com").url(),
            "https://eastus.example.com/v1/things"
        );
    }

    #[test]
    fn url_keeps_explicit_scheme() {
        assert_eq!(
            request("http://127.0.0.1:9000/").url(),
            "http://127.0.0.1:9000/v1/things"
        );
    }

    #[test]
    fn failure_becomes_error_object() {
        let outcome = Outcome::Failure {
            kind: FailureKind::Parse,
            error: "bad".into(),
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.into_value(), json!({"error": "bad"}));
    }

    #[test]
    fn success_passes_value_through() {
        let outcome = Outcome::Success(json!([1, 2]));
        assert!(outcome.is_success());
        assert_eq!(outcome.into_value(), json!([1, 2]));
    }

    #[tokio::test]
    async fn accumulate_preserves_chunk_order() {
        let chunks: Vec<Result<Vec<u8>, AdapterError>> = vec![
            Ok(b"{\"a\":".to_vec()),
            Ok(b" [1,".to_vec()),
            Ok(b"2]}".to_vec()),
        ];
        let body = accumulate(stream::iter(chunks)).await.unwrap();
        assert_eq!(body, b"{\"a\": [1,2]}");
    }

    #[tokio::test]
    async fn accumulate_discards_partial_body_on_error() {
        let chunks: Vec<Result<Vec<u8>, AdapterError>> = vec![
            Ok(b"{\"partial\"".to_vec()),
            Err(AdapterError::Transport("connection reset".into())),
            Ok(b"}".to_vec()),
        ];
        let err = accumulate(stream::iter(chunks)).await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
        assert_eq!(err.to_string(), "connection reset");
    }

    #[tokio::test]
    async fn empty_api_key_fails_without_network() {
        let adapter = HttpJsonAdapter::default();
        let mut req = request("http://127.0.0.1:1");
        req.api_key.clear();

        match adapter.execute(&req).await {
            Outcome::Failure { kind, error } => {
                assert_eq!(kind, FailureKind::InvalidRequest);
                assert!(error.contains("api key"));
            }
            other => panic!("expected Failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_endpoint_fails_without_network() {
        let adapter = HttpJsonAdapter::default();
        let outcome = adapter.execute(&request("")).await;
        assert!(matches!(
            outcome,
            Outcome::Failure {
                kind: FailureKind::InvalidRequest,
                ..
            }
        ));
    }
}
