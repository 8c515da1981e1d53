mod body;
mod diff;
mod predicate;
/// 断言模块 - 针对响应体的相等断言和路径断言
mod types;

pub use body::{ExpectedBody, assert_equal, assert_exists, assert_path, assert_text};
pub use diff::{DiffEntry, diff_values, render_diff};
pub use predicate::{contains, equal, exists, not_equal};
pub use types::{AssertError, AssertionFn, BodyMismatch};
