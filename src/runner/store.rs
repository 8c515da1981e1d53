use std::collections::HashMap;

use crate::http::ResponseRecord;

/// 一个测试计划独占的响应存储
///
/// `last` 在每个请求完成后被覆盖；按 key 存储的响应在整个计划期间保留，
/// 同一 key 再次存储时覆盖旧值。
#[derive(Debug, Clone, Default)]
pub struct ResponseStore {
    last: Option<ResponseRecord>,
    named: HashMap<String, ResponseRecord>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次响应，并在指定 key 时同时按 key 存储
    pub fn record(&mut self, record: ResponseRecord, key: Option<&str>) {
        if let Some(key) = key {
            self.named.insert(key.to_string(), record.clone());
        }
        self.last = Some(record);
    }

    /// 最近一次响应
    pub fn last(&self) -> Option<&ResponseRecord> {
        self.last.as_ref()
    }

    /// 按 key 存储的响应
    pub fn get(&self, key: &str) -> Option<&ResponseRecord> {
        self.named.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.named.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Status;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn record(status: u16, body: &str) -> ResponseRecord {
        ResponseRecord::new(
            Status::new(status).unwrap(),
            HeaderMap::new(),
            body.as_bytes().to_vec(),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_last_is_overwritten() {
        let mut store = ResponseStore::new();
        store.record(record(201, "a"), Some("first"));
        store.record(record(200, "b"), None);

        assert_eq!(store.last().unwrap().body, b"b");
        assert_eq!(store.get("first").unwrap().body, b"a");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_same_key_overwrites() {
        let mut store = ResponseStore::new();
        store.record(record(200, "old"), Some("user"));
        store.record(record(200, "new"), Some("user"));

        assert_eq!(store.get("user").unwrap().text(), "new");
        assert_eq!(store.keys().collect::<Vec<_>>(), vec!["user"]);
    }

    #[test]
    fn test_empty_store() {
        let store = ResponseStore::new();
        assert!(store.last().is_none());
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }
}
