use crate::json::{JsonPath, Segment};
use crate::placeholder::types::{Placeholder, Reference, ResolutionError, Token};

fn is_reference_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

fn malformed(position: usize, reason: impl Into<String>) -> ResolutionError {
    ResolutionError::Malformed {
        position,
        reason: reason.into(),
    }
}

/// 按 `.` 切分路径；开头的 `.` 已由调用方去掉，这里不再处理，
/// 因此 `..id` 会得到一个空段并在导航时失败
fn split_path(path: &str) -> JsonPath {
    JsonPath::from_segments(path.split('.').map(Segment::new).collect())
}

/// 解析花括号内的引用：`.path` 指向上一个响应，`key.path` 指向存储的响应
fn parse_reference(inner: &str, position: usize) -> Result<Reference, ResolutionError> {
    if let Some(path) = inner.strip_prefix('.') {
        if path.is_empty() {
            return Err(malformed(position, "empty path"));
        }
        return Ok(Reference::Last(split_path(path)));
    }

    match inner.split_once('.') {
        Some((key, path)) if !path.is_empty() => Ok(Reference::Stored {
            key: key.to_string(),
            path: split_path(path),
        }),
        _ => Err(malformed(
            position,
            format!("'{}' names a stored response but no path into it", inner),
        )),
    }
}

/// 将 URL 模板切分为文本和占位符
///
/// 占位符语法：`{` 可选的 `.`，然后是一个或多个 `[A-Za-z0-9_.]`，最后是 `}`。
/// 不支持嵌套花括号；未闭合、为空或含非法字符的花括号都视为错误。
/// 单独的 `}` 作为普通文本保留。
pub fn scan(template: &str) -> Result<Vec<Token<'_>>, ResolutionError> {
    let mut tokens = Vec::new();
    let mut literal_start = 0;
    let mut rest = template;
    let mut offset = 0;

    while let Some(open) = rest.find('{') {
        let start = offset + open;
        let after_open = &template[start + 1..];

        let close = match after_open.find(['{', '}']) {
            Some(i) if after_open.as_bytes()[i] == b'}' => i,
            Some(i) => return Err(malformed(start + 1 + i, "nested '{' is not supported")),
            None => return Err(malformed(start, "unterminated placeholder")),
        };

        let inner = &after_open[..close];
        if inner.is_empty() {
            return Err(malformed(start, "empty placeholder"));
        }
        if let Some((i, c)) = inner.char_indices().find(|(_, c)| !is_reference_char(*c)) {
            return Err(malformed(
                start + 1 + i,
                format!("invalid character {:?} in placeholder", c),
            ));
        }

        if literal_start < start {
            tokens.push(Token::Literal(&template[literal_start..start]));
        }
        let end = start + close + 2;
        tokens.push(Token::Placeholder(Placeholder {
            text: &template[start..end],
            start,
            reference: parse_reference(inner, start)?,
        }));

        literal_start = end;
        offset = end;
        rest = &template[end..];
    }

    if literal_start < template.len() {
        tokens.push(Token::Literal(&template[literal_start..]));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholders(template: &str) -> Vec<(String, Reference)> {
        scan(template)
            .unwrap()
            .into_iter()
            .filter_map(|t| match t {
                Token::Placeholder(p) => Some((p.text.to_string(), p.reference)),
                Token::Literal(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_scan_plain_text() {
        let tokens = scan("http://localhost/users").unwrap();
        assert_eq!(tokens, vec![Token::Literal("http://localhost/users")]);
        assert!(scan("").unwrap().is_empty());
    }

    #[test]
    fn test_scan_last_reference() {
        let found = placeholders("/users/{.id}");
        assert_eq!(
            found,
            vec![("{.id}".to_string(), Reference::Last(JsonPath::parse("id")))]
        );
    }

    #[test]
    fn test_scan_stored_reference() {
        let found = placeholders("/users/{user.data.0.id}/posts");
        assert_eq!(
            found[0].1,
            Reference::Stored {
                key: "user".to_string(),
                path: JsonPath::parse("data.0.id"),
            }
        );
    }

    #[test]
    fn test_scan_double_dot_keeps_empty_segment() {
        let found = placeholders("/{..id}/{user..id}");
        assert_eq!(
            found[0].1,
            Reference::Last(JsonPath::from_segments(vec![
                Segment::new(""),
                Segment::new("id")
            ]))
        );
        match &found[1].1 {
            Reference::Stored { key, path } => {
                assert_eq!(key, "user");
                assert_eq!(path.len(), 2);
                assert_eq!(path.segments()[0].as_str(), "");
            }
            other => panic!("unexpected reference: {:?}", other),
        }
    }

    #[test]
    fn test_reference_display() {
        let found = placeholders("/{user.data.0.id}/{.id}");
        assert_eq!(found[0].1.to_string(), "{user.data.0.id}");
        assert_eq!(found[1].1.to_string(), "{.id}");
    }

    #[test]
    fn test_scan_positions() {
        let tokens = scan("/a/{x.id}/b/{.n}").unwrap();
        assert_eq!(tokens.len(), 4);
        match (&tokens[1], &tokens[3]) {
            (Token::Placeholder(first), Token::Placeholder(second)) => {
                assert_eq!(first.start, 3);
                assert_eq!(first.end(), 9);
                assert_eq!(second.start, 12);
                assert_eq!(second.text, "{.n}");
            }
            other => panic!("unexpected tokens: {:?}", other),
        }
        assert_eq!(tokens[2], Token::Literal("/b/"));
    }

    #[test]
    fn test_scan_adjacent_placeholders() {
        let found = placeholders("{a.x}{b.y}");
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].0, "{b.y}");
    }

    #[test]
    fn test_scan_stray_closing_brace_is_literal() {
        let tokens = scan("/a}b").unwrap();
        assert_eq!(tokens, vec![Token::Literal("/a}b")]);
    }

    #[test]
    fn test_scan_malformed() {
        for (template, position) in [
            ("/users/{}", 7),
            ("/users/{user.id", 7),
            ("/users/{a{b}}", 9),
            ("/users/{user id}", 12),
            ("/users/{.}", 7),
            ("/users/{user}", 7),
            ("/users/{user.}", 7),
        ] {
            match scan(template) {
                Err(ResolutionError::Malformed { position: p, .. }) => {
                    assert_eq!(p, position, "template {}", template)
                }
                other => panic!("expected malformed for {}: {:?}", template, other),
            }
        }
    }
}
