use std::fmt;

use crate::assertion::diff::{DiffEntry, render_diff};
use crate::coerce::ConversionError;
use crate::json::NavigationError;

/// 断言函数：接收原始响应体，返回通过或失败详情
pub type AssertionFn = Box<dyn Fn(&[u8]) -> Result<(), AssertError> + Send + Sync>;

/// 消息中单个值的最大显示长度
pub(crate) const MAX_DISPLAY_LEN: usize = 64 * 1024 - 100;

/// 截断过长的显示文本
pub(crate) fn truncate(text: String) -> String {
    if text.len() <= MAX_DISPLAY_LEN {
        return text;
    }
    let mut end = MAX_DISPLAY_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// 断言错误类型
#[derive(Debug, thiserror::Error)]
pub enum AssertError {
    #[error("response body is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Navigation(#[from] NavigationError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("{0}")]
    BodyMismatch(Box<BodyMismatch>),

    #[error("expected {expected} got {actual}")]
    Mismatch { expected: String, actual: String },

    #[error("{0}")]
    Failed(String),
}

/// 响应体与期望值不一致
#[derive(Debug, Clone)]
pub struct BodyMismatch {
    pub expected: String,
    pub actual: String,
    pub diff: Vec<DiffEntry>,
}

impl fmt::Display for BodyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "response body does not match.")?;
        writeln!(f, " expected: {}", truncate(self.expected.clone()))?;
        writeln!(f, " got     : {}", truncate(self.actual.clone()))?;
        writeln!(f)?;
        writeln!(f, " Diff:")?;
        write!(f, "{}", render_diff(&self.diff))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("short".to_string()), "short");
    }

    #[test]
    fn test_truncate_long_text_on_char_boundary() {
        let text = "é".repeat(MAX_DISPLAY_LEN);
        let truncated = truncate(text);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= MAX_DISPLAY_LEN + 3);
    }

    #[test]
    fn test_mismatch_message() {
        let err = AssertError::Mismatch {
            expected: "1".to_string(),
            actual: "2".to_string(),
        };
        assert_eq!(err.to_string(), "expected 1 got 2");
    }
}
