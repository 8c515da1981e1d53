use serde_json::Value;

use crate::json::JsonKind;

/// 转换错误
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("cannot convert {found} to {target}")]
    Incompatible {
        found: JsonKind,
        target: &'static str,
    },

    #[error("cannot convert {value} to {target} without loss")]
    Lossy { value: String, target: &'static str },

    #[error("field '{field}' of {target}: {source}")]
    Field {
        target: &'static str,
        field: &'static str,
        source: Box<ConversionError>,
    },

    #[error("element {index} of {target}: {source}")]
    Element {
        target: &'static str,
        index: usize,
        source: Box<ConversionError>,
    },

    #[error("entry '{key}' of {target}: {source}")]
    Entry {
        target: &'static str,
        key: String,
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    pub(crate) fn incompatible(value: &Value, target: &'static str) -> Self {
        ConversionError::Incompatible {
            found: JsonKind::of(value),
            target,
        }
    }
}

/// 从 JSON 值构造自身
///
/// 只做无损转换；无法无损转换时返回错误，不会 panic。
pub trait Coerce: Sized {
    fn coerce(value: &Value) -> Result<Self, ConversionError>;
}

/// 将 JSON 值转换为 `T`
pub fn coerce<T: Coerce>(value: &Value) -> Result<T, ConversionError> {
    T::coerce(value)
}
