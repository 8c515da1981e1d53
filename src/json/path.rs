use std::fmt;

/// 路径中的一段：字段名或数组下标
///
/// 段本身不区分两者，由导航时当前节点的类型决定如何解释。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment(String);

impl Segment {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 作为非负整数下标解析
    pub fn as_index(&self) -> Option<usize> {
        if self.0.is_empty() || !self.0.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        self.0.parse().ok()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 点号分隔的 JSON 路径，例如 `data.users.0.name`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct JsonPath {
    segments: Vec<Segment>,
}

impl JsonPath {
    /// 解析路径字符串
    ///
    /// 开头的一个 `.` 表示"相对于整个响应"，会被去掉；剩余部分为空时得到空路径。
    pub fn parse(path: &str) -> Self {
        let path = path.strip_prefix('.').unwrap_or(path);
        if path.is_empty() {
            return Self::default();
        }
        Self {
            segments: path.split('.').map(Segment::new).collect(),
        }
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_single_leading_dot() {
        let path = JsonPath::parse(".data.items");
        assert_eq!(path.len(), 2);
        assert_eq!(path.to_string(), "data.items");

        // 只去掉一个点，第二个点变成空段
        let path = JsonPath::parse("..a");
        assert_eq!(path.segments()[0].as_str(), "");
        assert_eq!(path.segments()[1].as_str(), "a");
    }

    #[test]
    fn test_parse_empty() {
        assert!(JsonPath::parse("").is_empty());
        assert!(JsonPath::parse(".").is_empty());
    }

    #[test]
    fn test_segment_as_index() {
        assert_eq!(Segment::new("0").as_index(), Some(0));
        assert_eq!(Segment::new("42").as_index(), Some(42));
        assert_eq!(Segment::new("-1").as_index(), None);
        assert_eq!(Segment::new("+1").as_index(), None);
        assert_eq!(Segment::new("id").as_index(), None);
        assert_eq!(Segment::new("").as_index(), None);
    }
}
