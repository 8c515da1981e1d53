use serde_json::Value;
use tracing::debug;

use crate::json::{JsonKind, navigate};
use crate::placeholder::scanner::scan;
use crate::placeholder::types::{Placeholder, Reference, ResolutionError, Token};
use crate::runner::ResponseStore;

/// 将 JSON 标量渲染为 URL 中的文本
///
/// 整数原样输出；没有小数部分的浮点数按整数输出；字符串不带引号。
/// null、数组和对象没有文本形式，返回 None。
pub fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if n.is_f64() {
                let f = n.as_f64()?;
                // 2^53 以内的整数值浮点数可以精确表示为 i64
                if f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                    return Some((f as i64).to_string());
                }
            }
            Some(n.to_string())
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn resolve_placeholder(
    placeholder: &Placeholder<'_>,
    store: &ResponseStore,
) -> Result<String, ResolutionError> {
    let name = || placeholder.text.to_string();

    let record = match &placeholder.reference {
        Reference::Last(_) => store
            .last()
            .ok_or_else(|| ResolutionError::NoPreviousResponse { placeholder: name() })?,
        Reference::Stored { key, .. } => {
            store
                .get(key)
                .ok_or_else(|| ResolutionError::KeyNotFound {
                    key: key.clone(),
                    placeholder: name(),
                })?
        }
    };

    let data: Value =
        serde_json::from_slice(&record.body).map_err(|source| ResolutionError::Decode {
            placeholder: name(),
            source,
        })?;

    let path = placeholder.reference.path();
    let value = navigate(&data, path).map_err(|source| ResolutionError::Navigation {
        placeholder: name(),
        path: path.to_string(),
        source,
    })?;

    render_value(value).ok_or_else(|| ResolutionError::NonScalar {
        placeholder: name(),
        kind: JsonKind::of(value),
    })
}

/// 替换 URL 模板中的全部占位符
///
/// 每个占位符按出现顺序解析，并只替换它自己所在的位置。
/// 任何一个占位符解析失败都会中止整个替换。
pub fn resolve(template: &str, store: &ResponseStore) -> Result<String, ResolutionError> {
    let mut resolved = String::with_capacity(template.len());
    for token in scan(template)? {
        match token {
            Token::Literal(text) => resolved.push_str(text),
            Token::Placeholder(placeholder) => {
                let value = resolve_placeholder(&placeholder, store)?;
                debug!(reference = %placeholder.reference, value = %value, "resolved placeholder");
                resolved.push_str(&value);
            }
        }
    }
    Ok(resolved)
}
