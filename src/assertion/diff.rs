use std::fmt;

use colored::Colorize;
use serde_json::Value;

/// 单条结构差异
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    /// 仅存在于期望值中
    Removed { path: String, value: Value },
    /// 仅存在于实际值中
    Added { path: String, value: Value },
    /// 两边都存在但不相等
    Changed {
        path: String,
        expected: Value,
        actual: Value,
    },
}

impl DiffEntry {
    pub fn path(&self) -> &str {
        match self {
            DiffEntry::Removed { path, .. }
            | DiffEntry::Added { path, .. }
            | DiffEntry::Changed { path, .. } => path,
        }
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffEntry::Removed { path, value } => {
                let line = format!("- {}: {}", display_path(path), value);
                write!(f, "{}", line.red())
            }
            DiffEntry::Added { path, value } => {
                let line = format!("+ {}: {}", display_path(path), value);
                write!(f, "{}", line.green())
            }
            DiffEntry::Changed {
                path,
                expected,
                actual,
            } => {
                let removed = format!("- {}: {}", display_path(path), expected);
                let added = format!("+ {}: {}", display_path(path), actual);
                write!(f, "{}\n{}", removed.red(), added.green())
            }
        }
    }
}

/// 计算两个 JSON 值之间的结构差异
///
/// 路径使用与导航器相同的点号语法，数组元素以下标表示。
pub fn diff_values(expected: &Value, actual: &Value) -> Vec<DiffEntry> {
    let mut entries = Vec::new();
    walk(String::new(), expected, actual, &mut entries);
    entries
}

fn child(parent: &str, segment: impl fmt::Display) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", parent, segment)
    }
}

fn walk(path: String, expected: &Value, actual: &Value, out: &mut Vec<DiffEntry>) {
    match (expected, actual) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, value) in left {
                match right.get(key) {
                    Some(other) => walk(child(&path, key), value, other, out),
                    None => out.push(DiffEntry::Removed {
                        path: child(&path, key),
                        value: value.clone(),
                    }),
                }
            }
            for (key, value) in right {
                if !left.contains_key(key) {
                    out.push(DiffEntry::Added {
                        path: child(&path, key),
                        value: value.clone(),
                    });
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            for (index, (a, b)) in left.iter().zip(right).enumerate() {
                walk(child(&path, index), a, b, out);
            }
            for (index, value) in left.iter().enumerate().skip(right.len()) {
                out.push(DiffEntry::Removed {
                    path: child(&path, index),
                    value: value.clone(),
                });
            }
            for (index, value) in right.iter().enumerate().skip(left.len()) {
                out.push(DiffEntry::Added {
                    path: child(&path, index),
                    value: value.clone(),
                });
            }
        }
        (a, b) if a != b => out.push(DiffEntry::Changed {
            path,
            expected: a.clone(),
            actual: b.clone(),
        }),
        _ => {}
    }
}

/// 将差异渲染为多行文本：`-` 行为期望值独有，`+` 行为实际值独有
pub fn render_diff(entries: &[DiffEntry]) -> String {
    entries
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_equal_values_have_no_diff() {
        let value = json!({"a": [1, {"b": null}], "c": "d"});
        assert!(diff_values(&value, &value).is_empty());
    }

    #[test]
    fn test_changed_field() {
        let diff = diff_values(&json!({"key": "value"}), &json!({"key": "value1"}));
        assert_eq!(
            diff,
            vec![DiffEntry::Changed {
                path: "key".to_string(),
                expected: json!("value"),
                actual: json!("value1"),
            }]
        );
    }

    #[test]
    fn test_removed_and_added_keys() {
        let diff = diff_values(
            &json!({"user": {"id": 1, "name": "Max"}}),
            &json!({"user": {"id": 1, "email": "max@example.com"}}),
        );
        assert_eq!(diff.len(), 2);
        assert!(matches!(&diff[0], DiffEntry::Removed { path, .. } if path == "user.name"));
        assert!(matches!(&diff[1], DiffEntry::Added { path, .. } if path == "user.email"));
    }

    #[test]
    fn test_array_length_difference() {
        let diff = diff_values(&json!([1, 2, 3]), &json!([1, 5]));
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[0].path(), "1");
        assert!(matches!(&diff[1], DiffEntry::Removed { path, value } if path == "2" && *value == json!(3)));

        let diff = diff_values(&json!([]), &json!([true]));
        assert!(matches!(&diff[0], DiffEntry::Added { path, .. } if path == "0"));
    }

    #[test]
    fn test_render_separates_sides() {
        colored::control::set_override(false);
        let diff = diff_values(&json!({"a": 1, "b": 2}), &json!({"a": 1, "c": 3}));
        let rendered = render_diff(&diff);
        assert_eq!(rendered, "- b: 2\n+ c: 3");
    }

    #[test]
    fn test_root_scalar_change() {
        colored::control::set_override(false);
        let diff = diff_values(&json!("pong"), &json!("ping"));
        assert_eq!(render_diff(&diff), "- (root): \"pong\"\n+ (root): \"ping\"");
    }
}
