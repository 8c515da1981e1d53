use std::fmt;

use crate::json::{JsonKind, JsonPath, NavigationError};

/// 占位符引用的响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `{.path}`：紧邻的上一个响应
    Last(JsonPath),
    /// `{key.path}`：以 key 存储的响应
    Stored { key: String, path: JsonPath },
}

impl Reference {
    pub fn path(&self) -> &JsonPath {
        match self {
            Reference::Last(path) | Reference::Stored { path, .. } => path,
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Last(path) => write!(f, "{{.{}}}", path),
            Reference::Stored { key, path } => write!(f, "{{{}.{}}}", key, path),
        }
    }
}

/// 模板中的一个占位符及其在模板中的字节位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// 含花括号的原始文本
    pub text: &'a str,
    pub start: usize,
    pub reference: Reference,
}

impl Placeholder<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// 扫描结果：原样保留的文本或占位符
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Literal(&'a str),
    Placeholder(Placeholder<'a>),
}

/// 占位符解析错误
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    #[error("malformed placeholder at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    #[error("no previous response to resolve {placeholder}")]
    NoPreviousResponse { placeholder: String },

    #[error("key not found in response store: {key} (placeholder {placeholder})")]
    KeyNotFound { key: String, placeholder: String },

    #[error("response referenced by {placeholder} is not valid JSON: {source}")]
    Decode {
        placeholder: String,
        source: serde_json::Error,
    },

    #[error("cannot resolve {placeholder} (path '{path}'): {source}")]
    Navigation {
        placeholder: String,
        path: String,
        source: NavigationError,
    },

    #[error("{placeholder} resolved to {kind}, expected a string, number or boolean")]
    NonScalar { placeholder: String, kind: JsonKind },
}
