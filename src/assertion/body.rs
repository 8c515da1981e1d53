use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::assertion::diff::diff_values;
use crate::assertion::types::{AssertError, AssertionFn, BodyMismatch};
use crate::coerce::Coerce;
use crate::json::{JsonPath, navigate};

type Decoder = fn(&[u8]) -> Result<Value, serde_json::Error>;

/// 期望的响应体，在构造断言时确定比较方式
#[derive(Debug, Clone)]
pub enum ExpectedBody {
    /// 结构化期望：响应体按期望值的类型解码后逐字段比较
    Structured { expected: Value, decode: Decoder },
    /// 标量期望：与去除首尾空白的响应文本比较
    Scalar(String),
}

/// 以 `T` 的形状解码响应体，再转回 JSON 树，`T` 不认识的键因此被丢弃
fn decode_as<T: Serialize + DeserializeOwned>(body: &[u8]) -> Result<Value, serde_json::Error> {
    let typed: T = serde_json::from_slice(body)?;
    serde_json::to_value(typed)
}

impl ExpectedBody {
    /// 根据期望值的 JSON 形态选择比较方式：对象和数组按结构比较，其余按文本比较
    pub fn of<T: Serialize + DeserializeOwned>(expected: &T) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::to_value(expected)? {
            Value::String(text) => ExpectedBody::Scalar(text),
            value @ (Value::Object(_) | Value::Array(_)) => ExpectedBody::Structured {
                expected: value,
                decode: decode_as::<T>,
            },
            scalar => ExpectedBody::Scalar(scalar.to_string()),
        })
    }

    pub fn check(&self, body: &[u8]) -> Result<(), AssertError> {
        match self {
            ExpectedBody::Structured { expected, decode } => {
                let actual = decode(body)?;
                if *expected == actual {
                    return Ok(());
                }
                Err(AssertError::BodyMismatch(Box::new(BodyMismatch {
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                    diff: diff_values(expected, &actual),
                })))
            }
            ExpectedBody::Scalar(expected) => {
                let actual = String::from_utf8_lossy(body);
                let actual = actual.trim();
                if expected == actual {
                    return Ok(());
                }
                let expected_value = Value::String(expected.clone());
                let actual_value = Value::String(actual.to_string());
                Err(AssertError::BodyMismatch(Box::new(BodyMismatch {
                    expected: expected.clone(),
                    actual: actual.to_string(),
                    diff: diff_values(&expected_value, &actual_value),
                })))
            }
        }
    }
}

/// 断言响应体等于期望值
///
/// 对象、数组、结构体按期望值的类型解码响应体后深度比较；
/// 字符串、数字、布尔值与去除空白后的响应文本比较。不一致时附带结构差异。
pub fn assert_equal<T>(expected: T) -> AssertionFn
where
    T: Serialize + DeserializeOwned,
{
    match ExpectedBody::of(&expected) {
        Ok(expected) => Box::new(move |body: &[u8]| expected.check(body)),
        Err(e) => {
            let message = format!("expected body cannot be encoded as JSON: {}", e);
            Box::new(move |_: &[u8]| Err(AssertError::Failed(message.clone())))
        }
    }
}

/// 断言响应文本（去除首尾空白）等于期望文本
pub fn assert_text(expected: impl Into<String>) -> AssertionFn {
    let expected = ExpectedBody::Scalar(expected.into());
    Box::new(move |body: &[u8]| expected.check(body))
}

/// 断言响应体中路径处的值满足谓词
///
/// 路径以点号分隔，开头的 `.` 可省略，例如 `data.users.0.name`。
/// 依次执行解码、导航、类型转换和谓词，返回第一个失败。
pub fn assert_path<T, F>(path: &str, predicate: F) -> AssertionFn
where
    T: Coerce + 'static,
    F: Fn(T) -> Result<(), AssertError> + Send + Sync + 'static,
{
    let path = JsonPath::parse(path);
    Box::new(move |body: &[u8]| {
        let data: Value = serde_json::from_slice(body)?;
        let value = navigate(&data, &path)?;
        let typed = T::coerce(value)?;
        predicate(typed)
    })
}

/// 断言响应体中存在该路径
pub fn assert_exists(path: &str) -> AssertionFn {
    let path = JsonPath::parse(path);
    Box::new(move |body: &[u8]| {
        let data: Value = serde_json::from_slice(body)?;
        navigate(&data, &path)?;
        Ok(())
    })
}
