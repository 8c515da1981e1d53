use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

use crate::error::{PilotError, Result};
use crate::http::{Body, Method, OutboundRequest};
use crate::runner::expect::Expect;

/// 测试计划中的单个请求
///
/// URL 是模板，占位符在执行到该请求时才会替换。
pub struct RequestSpec {
    method: Method,
    url: String,
    headers: Vec<(String, String)>,
    body: Option<Body>,
    store_key: Option<String>,
    expect: Option<Expect>,
    build_error: Option<String>,
}

impl RequestSpec {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            store_key: None,
            expect: None,
            build_error: None,
        }
    }

    pub fn body(&mut self, body: Body) -> &mut Self {
        self.body = Some(body);
        self
    }

    /// JSON 请求体；序列化失败时该请求在执行时报错且不会发送
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) -> &mut Self {
        match Body::json(value) {
            Ok(body) => self.body = Some(body),
            Err(e) => self.build_error = Some(e.to_string()),
        }
        self
    }

    pub fn form<I, K, V>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.body = Some(Body::form(pairs));
        self
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.body = Some(Body::text(text));
        self
    }

    /// 请求头，同名时后设置的覆盖先设置的
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(&mut self, headers: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.header(name, value);
        }
        self
    }

    /// 在响应存储中以 `key` 保存本次响应
    pub fn store(&mut self, key: impl Into<String>) -> &mut Self {
        self.store_key = Some(key.into());
        self
    }

    /// 本请求的期望，首次调用时创建
    pub fn expect(&mut self) -> &mut Expect {
        self.expect.get_or_insert_with(Expect::default)
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn store_key(&self) -> Option<&str> {
        self.store_key.as_deref()
    }

    pub fn expectation(&self) -> Option<&Expect> {
        self.expect.as_ref()
    }

    /// 组装发往传输层的请求
    ///
    /// 请求头优先级：默认头 < 请求体的 Content-Type < 显式设置的请求头。
    pub(crate) fn to_outbound(
        &self,
        url: String,
        default_headers: &[(String, String)],
    ) -> Result<OutboundRequest> {
        if let Some(e) = &self.build_error {
            return Err(PilotError::InvalidRequest(format!(
                "failed to encode request body: {}",
                e
            )));
        }

        let mut headers = HeaderMap::new();
        insert_headers(&mut headers, default_headers)?;
        if let Some(content_type) = self.body.as_ref().and_then(|b| b.content_type()) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        }
        insert_headers(&mut headers, &self.headers)?;

        Ok(OutboundRequest {
            method: self.method,
            url,
            headers,
            body: self.body.clone(),
        })
    }
}

fn insert_headers(map: &mut HeaderMap, headers: &[(String, String)]) -> Result<()> {
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| PilotError::InvalidRequest(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            PilotError::InvalidRequest(format!("invalid header value for '{}': {}", name, e))
        })?;
        map.insert(name, value);
    }
    Ok(())
}
