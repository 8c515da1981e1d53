use serde::Serialize;

use crate::Result;

/// 请求体：已编码的字节和默认 Content-Type
///
/// 对执行器来说是不透明的字节来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Body {
    bytes: Vec<u8>,
    content_type: Option<&'static str>,
}

impl Body {
    pub const JSON: &'static str = "application/json";
    pub const FORM: &'static str = "application/x-www-form-urlencoded";
    pub const TEXT: &'static str = "text/plain; charset=utf-8";

    /// JSON 编码
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self {
            bytes: serde_json::to_vec(value)?,
            content_type: Some(Self::JSON),
        })
    }

    /// 表单编码（application/x-www-form-urlencoded）
    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let encoded = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish();
        Self {
            bytes: encoded.into_bytes(),
            content_type: Some(Self::FORM),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            content_type: Some(Self::TEXT),
        }
    }

    /// 不带 Content-Type 的原始字节
    pub fn raw(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body() {
        let body = Body::json(&json!({"id": 1, "name": "Max"})).unwrap();
        assert_eq!(body.bytes(), br#"{"id":1,"name":"Max"}"#);
        assert_eq!(body.content_type(), Some(Body::JSON));
    }

    #[test]
    fn test_form_body() {
        let body = Body::form([("name", "Max Mustermann"), ("role", "a&b")]);
        assert_eq!(body.bytes(), b"name=Max+Mustermann&role=a%26b");
        assert_eq!(body.content_type(), Some(Body::FORM));
    }

    #[test]
    fn test_text_and_raw() {
        assert_eq!(Body::text("pong").bytes(), b"pong");
        assert_eq!(Body::raw(vec![1, 2]).content_type(), None);
    }
}
