use std::future::Future;
use std::time::Duration;

use reqwest::header::HeaderMap as Headers;
use tracing::debug;

use crate::http::body::Body;
use crate::http::types::Method;

/// 传输层错误
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("{0}")]
    Other(String),
}

/// 发往传输层的请求，URL 已完成占位符替换
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Body>,
}

/// 传输层返回的原始响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

/// 执行单个 HTTP 请求的协作者
///
/// 执行器只依赖这个窄接口，不关心具体的 HTTP 客户端。重试策略（如有）属于实现方。
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<RawResponse, TransportError>> + Send;
}

/// 默认 host，当 URL 中未指定 host 时使用
const DEFAULT_HOST: &str = "localhost";
/// 默认 scheme，当 URL 中未指定 scheme 时使用
const DEFAULT_SCHEME: &str = "http";

/// 规范化简写 URL
///
/// - `:3000/users` -> `http://localhost:3000/users`
/// - `localhost:3000` -> `http://localhost:3000`
/// - `https://:8080` -> `https://localhost:8080`
pub fn normalize_url(input: &str) -> Result<url::Url, TransportError> {
    let input = input.trim();
    let normalized = if input.starts_with(':') {
        format!("{}://{}{}", DEFAULT_SCHEME, DEFAULT_HOST, input)
    } else if let Some(pos) = input.find("://") {
        let after_scheme = &input[pos + 3..];
        if after_scheme.starts_with(':') {
            format!("{}://{}{}", &input[..pos], DEFAULT_HOST, after_scheme)
        } else {
            input.to_string()
        }
    } else {
        format!("{}://{}", DEFAULT_SCHEME, input)
    };

    url::Url::parse(&normalized).map_err(|source| TransportError::InvalidUrl {
        url: input.to_string(),
        source,
    })
}

/// 基于 reqwest 的 HTTP 传输
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    timeout: Duration,
}

impl HttpTransport {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            inner: reqwest::Client::builder().timeout(timeout).build()?,
            timeout,
        })
    }

    /// 单个请求的超时
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        let inner = reqwest::Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to build HTTP client");
        Self {
            inner,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let url = normalize_url(&request.url)?;
        debug!(method = %request.method, url = %url, "sending request");

        let mut req = self
            .inner
            .request(request.method.into(), url)
            .headers(request.headers);
        if let Some(body) = request.body {
            req = req.body(body.into_bytes());
        }

        let response = req.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_transport_has_timeout() {
        assert_eq!(
            HttpTransport::default().timeout(),
            HttpTransport::DEFAULT_TIMEOUT
        );
        assert_eq!(
            HttpTransport::new().unwrap().timeout(),
            Duration::from_secs(30)
        );
        assert_eq!(
            HttpTransport::with_timeout(Duration::from_millis(200))
                .unwrap()
                .timeout(),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn test_normalize_full_url() {
        let url = normalize_url("https://api.example.com:8443/v1/users?id=1").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com:8443/v1/users?id=1");
    }

    #[test]
    fn test_normalize_port_only() {
        let url = normalize_url(":8080/users/1").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/users/1");
    }

    #[test]
    fn test_normalize_without_scheme() {
        let url = normalize_url("localhost:3000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api");
    }

    #[test]
    fn test_normalize_empty_host() {
        let url = normalize_url("https://:8080").unwrap();
        assert_eq!(url.host_str(), Some("localhost"));
        assert_eq!(url.port(), Some(8080));
    }

    #[test]
    fn test_normalize_whitespace() {
        let url = normalize_url("  http://example.com/path  ").unwrap();
        assert_eq!(url.path(), "/path");
    }

    #[test]
    fn test_normalize_invalid() {
        let err = normalize_url("http://exa mple.com").unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }
}
