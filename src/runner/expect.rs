use crate::assertion::{AssertError, AssertionFn};
use crate::http::ResponseRecord;
use crate::runner::store::ResponseStore;

/// 可访问已存储响应的响应体断言
pub type StoreAssertionFn =
    Box<dyn Fn(&[u8], &ResponseStore) -> Result<(), AssertError> + Send + Sync>;

/// 响应头断言
pub type HeaderPredicate = Box<dyn Fn(String) -> Result<(), AssertError> + Send + Sync>;

/// 单个请求未满足的期望
#[derive(Debug, thiserror::Error)]
pub enum ExpectationFailure {
    #[error("expected response code {expected} got {actual}")]
    Status { expected: u16, actual: u16 },

    #[error("header '{name}': {source}")]
    Header { name: String, source: AssertError },

    #[error("{0}")]
    Body(AssertError),
}

/// 请求的期望集合
#[derive(Default)]
pub struct Expect {
    status: Option<u16>,
    bodies: Vec<StoreAssertionFn>,
    headers: Vec<(String, HeaderPredicate)>,
}

impl Expect {
    /// 期望的状态码
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    /// 响应体断言，可多次调用，全部需要通过
    pub fn body(&mut self, assertion: AssertionFn) -> &mut Self {
        self.bodies
            .push(Box::new(move |body: &[u8], _: &ResponseStore| assertion(body)));
        self
    }

    /// 可读取已存储响应的响应体断言（包括本次请求刚存储的响应）
    pub fn body_with<F>(&mut self, assertion: F) -> &mut Self
    where
        F: Fn(&[u8], &ResponseStore) -> Result<(), AssertError> + Send + Sync + 'static,
    {
        self.bodies.push(Box::new(assertion));
        self
    }

    /// 响应头断言；响应中缺少该头时断言失败
    pub fn header<F>(&mut self, name: impl Into<String>, predicate: F) -> &mut Self
    where
        F: Fn(String) -> Result<(), AssertError> + Send + Sync + 'static,
    {
        self.headers.push((name.into(), Box::new(predicate)));
        self
    }

    pub fn expected_status(&self) -> Option<u16> {
        self.status
    }

    /// 检查全部期望，收集所有失败而不是在第一个失败处停止
    pub(crate) fn check(
        &self,
        record: &ResponseRecord,
        store: &ResponseStore,
    ) -> Vec<ExpectationFailure> {
        let mut failures = Vec::new();

        if let Some(expected) = self.status {
            let actual = record.status.code();
            if expected != actual {
                failures.push(ExpectationFailure::Status { expected, actual });
            }
        }

        for (name, predicate) in &self.headers {
            let result = match record.headers.get(name.as_str()) {
                None => Err(AssertError::Failed("header not present".to_string())),
                Some(value) => match value.to_str() {
                    Ok(text) => predicate(text.to_string()),
                    Err(e) => Err(AssertError::Failed(format!(
                        "header value is not visible ASCII: {}",
                        e
                    ))),
                },
            };
            if let Err(source) = result {
                failures.push(ExpectationFailure::Header {
                    name: name.clone(),
                    source,
                });
            }
        }

        for assertion in &self.bodies {
            if let Err(e) = assertion(&record.body, store) {
                failures.push(ExpectationFailure::Body(e));
            }
        }

        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assertion::{assert_path, contains, equal};
    use crate::http::Status;
    use reqwest::header::HeaderMap;
    use std::time::Duration;

    fn record(status: u16, content_type: &str, body: &str) -> ResponseRecord {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", content_type.parse().unwrap());
        ResponseRecord::new(
            Status::new(status).unwrap(),
            headers,
            body.as_bytes().to_vec(),
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_all_expectations_pass() {
        let mut expect = Expect::default();
        expect
            .status(200)
            .header("content-type", contains("json"))
            .body(assert_path("id", equal(1)));

        let failures = expect.check(
            &record(200, "application/json", r#"{"id":1}"#),
            &ResponseStore::new(),
        );
        assert!(failures.is_empty());
    }

    #[test]
    fn test_collects_every_failure() {
        let mut expect = Expect::default();
        expect
            .status(201)
            .header("content-type", equal("text/plain".to_string()))
            .header("x-request-id", contains(""))
            .body(assert_path("id", equal(2)));

        let failures = expect.check(
            &record(200, "application/json", r#"{"id":1}"#),
            &ResponseStore::new(),
        );
        assert_eq!(failures.len(), 4);
        assert!(matches!(
            failures[0],
            ExpectationFailure::Status {
                expected: 201,
                actual: 200
            }
        ));
        assert_eq!(
            failures[0].to_string(),
            "expected response code 201 got 200"
        );
        assert!(matches!(&failures[2], ExpectationFailure::Header { name, .. } if name == "x-request-id"));
        assert!(matches!(failures[3], ExpectationFailure::Body(_)));
    }

    #[test]
    fn test_body_with_reads_store() {
        let mut store = ResponseStore::new();
        store.record(record(201, "application/json", r#"{"id":1}"#), Some("user"));

        let mut expect = Expect::default();
        expect.body_with(|body, store| {
            let stored = store
                .get("user")
                .ok_or_else(|| AssertError::Failed("user not stored".to_string()))?;
            if stored.body == body {
                Ok(())
            } else {
                Err(AssertError::Failed("body differs from stored user".to_string()))
            }
        });

        let same = record(200, "application/json", r#"{"id":1}"#);
        assert!(expect.check(&same, &store).is_empty());

        let other = record(200, "application/json", r#"{"id":2}"#);
        assert_eq!(expect.check(&other, &store).len(), 1);
    }
}
