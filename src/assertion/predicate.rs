use std::fmt::Debug;

use crate::assertion::types::AssertError;

/// 值等于期望值
pub fn equal<T>(expected: T) -> impl Fn(T) -> Result<(), AssertError> + Send + Sync + 'static
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    move |actual: T| {
        if actual == expected {
            Ok(())
        } else {
            Err(AssertError::Mismatch {
                expected: format!("{:?}", expected),
                actual: format!("{:?}", actual),
            })
        }
    }
}

/// 值不等于给定值
pub fn not_equal<T>(unexpected: T) -> impl Fn(T) -> Result<(), AssertError> + Send + Sync + 'static
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    move |actual: T| {
        if actual != unexpected {
            Ok(())
        } else {
            Err(AssertError::Failed(format!(
                "expected value other than {:?}",
                unexpected
            )))
        }
    }
}

/// 值不是类型的零值（空字符串、0、false 等）
pub fn exists<T>() -> impl Fn(T) -> Result<(), AssertError> + Send + Sync + 'static
where
    T: Default + PartialEq + Debug + 'static,
{
    |actual: T| {
        if actual != T::default() {
            Ok(())
        } else {
            Err(AssertError::Failed(format!(
                "expected a value, got {:?}",
                actual
            )))
        }
    }
}

/// 字符串包含子串
pub fn contains(needle: impl Into<String>) -> impl Fn(String) -> Result<(), AssertError> + Send + Sync + 'static {
    let needle = needle.into();
    move |actual: String| {
        if actual.contains(&needle) {
            Ok(())
        } else {
            Err(AssertError::Failed(format!(
                "expected {:?} to contain {:?}",
                actual, needle
            )))
        }
    }
}
