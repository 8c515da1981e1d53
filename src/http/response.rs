use std::time::Duration;

use reqwest::header::HeaderMap as Headers;
use serde::de::DeserializeOwned;

use crate::http::types::Status;

/// 一次请求结果的不可变快照
#[derive(Debug, Clone)]
pub struct ResponseRecord {
    pub status: Status,
    pub headers: Headers,
    pub body: Vec<u8>,
    pub duration: Duration,
}

impl ResponseRecord {
    pub fn new(status: Status, headers: Headers, body: Vec<u8>, duration: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// 响应体文本（非 UTF-8 字节以替换字符显示）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// 将响应体解码为 `T`
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
