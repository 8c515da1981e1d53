use thiserror::Error;

use crate::coerce::ConversionError;
use crate::http::TransportError;
use crate::json::NavigationError;
use crate::placeholder::ResolutionError;
use crate::runner::ExpectationFailure;

#[derive(Error, Debug)]
pub enum PilotError {
    #[error("JSON 解析错误: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("路径错误: {0}")]
    Navigation(#[from] NavigationError),

    #[error("类型转换错误: {0}")]
    Conversion(#[from] ConversionError),

    #[error("占位符错误: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("{0}")]
    Expectation(#[from] ExpectationFailure),

    #[error("无效的请求: {0}")]
    InvalidRequest(String),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("请求已取消")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for PilotError {
    fn from(err: anyhow::Error) -> Self {
        PilotError::Other(err.to_string())
    }
}

/// Result type for testpilot crate
pub type Result<T> = std::result::Result<T, PilotError>;
