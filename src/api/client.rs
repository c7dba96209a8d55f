//! HTTP transport to the node API.
//!
//! Every node request is one verb against one base endpoint with a
//! `requestType` discriminator and flat string parameters. The node
//! reports failures in-band as `{errorCode, errorDescription}`; that
//! shape is decoded exactly once here, so everything above the
//! transport sees a tagged result instead of sniffing payloads.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// HTTP verb for a node API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
}

/// Flat request parameters: `(name, value)` pairs, `requestType` included.
pub type Params = Vec<(String, String)>;

/// The transport seam. Implemented by [`ApiClient`] for real nodes and
/// by scripted doubles in tests.
#[async_trait]
pub trait RemoteCall: Send + Sync {
    /// Perform one API call and return the decoded success payload.
    async fn call(&self, verb: Verb, params: Params) -> ClientResult<Value>;
}

/// reqwest-backed node API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ApiClient {
    /// Create a client for the configured endpoint.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base_url: Url = config
            .base_url
            .parse()
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// The endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.timeout_secs)
        } else {
            ClientError::Http(e)
        }
    }
}

#[async_trait]
impl RemoteCall for ApiClient {
    async fn call(&self, verb: Verb, params: Params) -> ClientResult<Value> {
        let request = match verb {
            Verb::Get => self.http.get(self.base_url.clone()).query(&params),
            Verb::Post => self.http.post(self.base_url.clone()).form(&params),
        };

        let response = request.send().await.map_err(|e| self.map_send_error(e))?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        into_tagged(body)
    }
}

/// Decide once whether a response body is the node's error shape.
fn into_tagged(body: Value) -> ClientResult<Value> {
    let code = body.get("errorCode").and_then(Value::as_i64);
    let description = body
        .get("errorDescription")
        .and_then(Value::as_str)
        .map(str::to_string);
    match (code, description) {
        (Some(code), Some(description)) => Err(ClientError::NodeRejected { code, description }),
        _ => Ok(body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_config(url: &str) -> ClientConfig {
        ClientConfig {
            base_url: url.to_string(),
            request_timeout_secs: 2,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn test_invalid_url_rejected() {
        let result = ApiClient::new(&test_config("not a url"));
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_tagged_decode() {
        let ok = into_tagged(json!({"height": 123})).unwrap();
        assert_eq!(ok["height"], 123);

        let err = into_tagged(json!({"errorCode": 4, "errorDescription": "Incorrect \"account\""}));
        match err {
            Err(ClientError::NodeRejected { code, description }) => {
                assert_eq!(code, 4);
                assert!(description.contains("account"));
            }
            other => panic!("expected NodeRejected, got {other:?}"),
        }

        // errorCode alone is not the error shape
        let ok = into_tagged(json!({"errorCode": 4})).unwrap();
        assert_eq!(ok["errorCode"], 4);
    }

    #[tokio::test]
    async fn test_get_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/")
            .match_query(mockito::Matcher::UrlEncoded(
                "requestType".into(),
                "getBlock".into(),
            ))
            .with_body(r#"{"height": 42}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&test_config(&server.url())).unwrap();
        let body = client
            .call(
                Verb::Get,
                vec![("requestType".to_string(), "getBlock".to_string())],
            )
            .await
            .unwrap();
        assert_eq!(body["height"], 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_error_shape() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_body(r#"{"errorCode": 3, "errorDescription": "Unknown request type"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&test_config(&server.url())).unwrap();
        let result = client
            .call(
                Verb::Post,
                vec![("requestType".to_string(), "bogus".to_string())],
            )
            .await;
        assert!(matches!(
            result,
            Err(ClientError::NodeRejected { code: 3, .. })
        ));
    }

    #[tokio::test]
    async fn test_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/")
            .with_body("<html>gateway error</html>")
            .create_async()
            .await;

        let client = ApiClient::new(&test_config(&server.url())).unwrap();
        let result = client.call(Verb::Get, Vec::new()).await;
        assert!(matches!(result, Err(ClientError::Decode(_))));
    }
}
