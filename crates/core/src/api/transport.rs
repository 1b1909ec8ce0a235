//! HTTP seam between the client and the upstream service.

use std::{future::Future, time::Duration};

use reqwest::header::ACCEPT;
use serde_json::Value;
use tracing::debug;

use crate::{config::AppConfig, error::ApiError};

const USER_AGENT: &str = concat!("coverfinder/", env!("CARGO_PKG_VERSION"));
const MAX_ERROR_BODY: usize = 200;

/// Issues GET requests and returns the decoded JSON body.
pub trait Transport: Send + Sync {
    /// GET `path` (relative to the API root) with the given query pairs.
    fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    /// GET an absolute `url` and return the raw body.
    fn get_bytes(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Transport rooted at `base_url` with a per-request `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Transport configured from [`AppConfig`].
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    fn classify(&self, err: reqwest::Error) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout(self.timeout)
        } else {
            ApiError::Http(err)
        }
    }
}

impl Transport for HttpTransport {
    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "dispatching upstream request");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        let body = response.text().await.map_err(|err| self.classify(err))?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        debug!(%url, "downloading");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| self.classify(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let bytes = response.bytes().await.map_err(|err| self.classify(err))?;
        Ok(bytes.to_vec())
    }
}

/// Prefer the upstream's own `code`/`status` pair when the error body has one.
fn status_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(err) = upstream_error(&value) {
            return err;
        }
    }
    ApiError::Status {
        status,
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

/// Error for payloads whose `code` field reports a failure.
pub(crate) fn upstream_error(value: &Value) -> Option<ApiError> {
    let code = value.get("code")?.as_i64()?;
    if (200..300).contains(&code) {
        return None;
    }
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_string();
    Some(ApiError::Upstream { code, status })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    #[test]
    fn failure_codes_become_upstream_errors() {
        let err = upstream_error(&json!({ "code": 403, "status": "Invalid API key" }));
        assert!(matches!(
            err,
            Some(ApiError::Upstream { code: 403, ref status }) if status == "Invalid API key"
        ));
        assert!(upstream_error(&json!({ "code": 200, "status": "Success" })).is_none());
        assert!(upstream_error(&json!({ "data": {} })).is_none());
    }

    #[test]
    fn status_errors_keep_a_bounded_body() {
        let body = "x".repeat(1000);
        match status_error(reqwest::StatusCode::BAD_GATEWAY, &body) {
            ApiError::Status { status, body } => {
                assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
                assert_eq!(body.len(), MAX_ERROR_BODY);
            }
            other => panic!("unexpected error {other:?}"),
        }

        let json_body = r#"{"code":403,"status":"This API Key has no monthly allowance"}"#;
        assert!(matches!(
            status_error(reqwest::StatusCode::FORBIDDEN, json_body),
            ApiError::Upstream { code: 403, .. }
        ));
    }

    /// Local server answering every connection with `response`, or never
    /// answering when it is `None`.
    async fn serve(response: Option<&'static str>) -> std::io::Result<String> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                match response {
                    Some(reply) => {
                        let _ = socket.write_all(reply.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    }
                    None => held.push(socket),
                }
            }
        });
        Ok(format!("http://{addr}"))
    }

    #[tokio::test]
    async fn silent_upstream_times_out() -> anyhow::Result<()> {
        let base = serve(None).await?;
        let timeout = Duration::from_millis(200);
        let transport = HttpTransport::new(base, timeout)?;

        let err = transport
            .get_json("Games/ByGameName", &[("name", "Foo".to_string())])
            .await
            .err();
        assert!(matches!(err, Some(ApiError::Timeout(t)) if t == timeout));
        Ok(())
    }

    #[tokio::test]
    async fn bad_gateway_maps_to_status_error() -> anyhow::Result<()> {
        let base = serve(Some(concat!(
            "HTTP/1.1 502 Bad Gateway\r\n",
            "content-length: 11\r\nconnection: close\r\n\r\n",
            "proxy error",
        )))
        .await?;
        let transport = HttpTransport::new(base, Duration::from_secs(5))?;

        match transport.get_json("Platforms", &[]).await {
            Err(ApiError::Status { status, body }) => {
                assert_eq!(status, reqwest::StatusCode::BAD_GATEWAY);
                assert_eq!(body, "proxy error");
            }
            other => panic!("unexpected result {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn success_body_is_decoded() -> anyhow::Result<()> {
        let base = serve(Some(concat!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n",
            "content-length: 31\r\nconnection: close\r\n\r\n",
            r#"{"code":200,"status":"Success"}"#,
        )))
        .await?;
        let transport = HttpTransport::new(base.clone(), Duration::from_secs(5))?;

        let value = transport.get_json("Platforms", &[]).await?;
        assert_eq!(value["status"], "Success");

        let bytes = transport.get_bytes(&format!("{base}/images/a.png")).await?;
        assert_eq!(bytes, br#"{"code":200,"status":"Success"}"#.to_vec());
        Ok(())
    }

    #[test]
    fn base_url_is_normalized() -> Result<(), ApiError> {
        let transport = HttpTransport::new("http://localhost:8080/v1/", Duration::from_secs(5))?;
        assert_eq!(transport.base_url, "http://localhost:8080/v1");
        Ok(())
    }
}
