use std::fmt;

use serde_json::Value;

use crate::json::path::JsonPath;

/// JSON 值的种类，用于错误信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonKind {
    Null,
    Bool,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Bool,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Bool => "boolean",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 路径段无法解析的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundReason {
    /// 对象中不存在该键
    MissingKey,
    /// 下标越界
    IndexOutOfRange { index: usize, len: usize },
    /// 数组只能用非负整数下标访问
    NotAnIndex,
    /// 当前节点是标量，无法继续深入
    NotAContainer(JsonKind),
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotFoundReason::MissingKey => write!(f, "key not found"),
            NotFoundReason::IndexOutOfRange { index, len } => {
                write!(f, "index {} out of range for array of length {}", index, len)
            }
            NotFoundReason::NotAnIndex => write!(f, "arrays can only be indexed by integers"),
            NotFoundReason::NotAContainer(kind) => write!(f, "cannot index into {}", kind),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("path segment '{segment}' (position {position}) not found: {reason}")]
pub struct NavigationError {
    pub segment: String,
    pub position: usize,
    pub reason: NotFoundReason,
}

/// 沿路径逐段深入 JSON 值
///
/// 当前节点是数组且段可解析为下标时按下标取值；是对象时按键取值（包括数字形式的键）；
/// 其余组合均失败。空路径原样返回输入。
pub fn navigate<'a>(value: &'a Value, path: &JsonPath) -> Result<&'a Value, NavigationError> {
    let mut current = value;
    for (position, segment) in path.segments().iter().enumerate() {
        let fail = |reason| NavigationError {
            segment: segment.to_string(),
            position,
            reason,
        };

        current = match current {
            Value::Array(items) => {
                let index = segment.as_index().ok_or_else(|| fail(NotFoundReason::NotAnIndex))?;
                items.get(index).ok_or_else(|| {
                    fail(NotFoundReason::IndexOutOfRange {
                        index,
                        len: items.len(),
                    })
                })?
            }
            Value::Object(map) => map
                .get(segment.as_str())
                .ok_or_else(|| fail(NotFoundReason::MissingKey))?,
            scalar => return Err(fail(NotFoundReason::NotAContainer(JsonKind::of(scalar)))),
        };
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn nav(value: &Value, path: &str) -> Result<Value, NavigationError> {
        navigate(value, &JsonPath::parse(path)).cloned()
    }

    #[test]
    fn test_empty_path_is_identity() {
        for value in [
            json!({"a": {"b": [1, 2, {"c": null}]}}),
            json!([1, "two", false]),
            json!("scalar"),
            json!(null),
        ] {
            assert_eq!(nav(&value, "").unwrap(), value);
        }
    }

    #[test]
    fn test_nested_object() {
        let value = json!({"a": {"b": 1}});
        assert_eq!(nav(&value, "a.b").unwrap(), json!(1));
    }

    #[test]
    fn test_array_index() {
        let value = json!({"a": [10, 20]});
        assert_eq!(nav(&value, "a.1").unwrap(), json!(20));
        assert_eq!(nav(&json!([{"id": 7}]), ".0.id").unwrap(), json!(7));
    }

    #[test]
    fn test_missing_key() {
        let err = nav(&json!({"a": 1}), "b").unwrap_err();
        assert_eq!(err.segment, "b");
        assert_eq!(err.position, 0);
        assert_eq!(err.reason, NotFoundReason::MissingKey);
    }

    #[test]
    fn test_index_out_of_range() {
        let err = nav(&json!({"a": [10, 20]}), "a.2").unwrap_err();
        assert_eq!(err.position, 1);
        assert_eq!(
            err.reason,
            NotFoundReason::IndexOutOfRange { index: 2, len: 2 }
        );
    }

    #[test]
    fn test_key_into_array() {
        let err = nav(&json!({"a": [1]}), "a.first").unwrap_err();
        assert_eq!(err.reason, NotFoundReason::NotAnIndex);

        let err = nav(&json!([1]), "-1").unwrap_err();
        assert_eq!(err.reason, NotFoundReason::NotAnIndex);
    }

    #[test]
    fn test_numeric_key_on_object() {
        let value = json!({"0": "zero"});
        assert_eq!(nav(&value, "0").unwrap(), json!("zero"));

        let err = nav(&json!({"a": 1}), "0").unwrap_err();
        assert_eq!(err.reason, NotFoundReason::MissingKey);
    }

    #[test]
    fn test_index_into_scalar() {
        let err = nav(&json!({"a": 1}), "a.b").unwrap_err();
        assert_eq!(err.segment, "b");
        assert_eq!(err.reason, NotFoundReason::NotAContainer(JsonKind::Number));
    }

    #[test]
    fn test_error_message() {
        let err = nav(&json!({"a": 1}), "b").unwrap_err();
        assert_eq!(
            err.to_string(),
            "path segment 'b' (position 0) not found: key not found"
        );
    }
}
