use serde_json::Value;

use crate::coerce::types::ConversionError;

/// 记录类型的一个字段：JSON 键名和赋值函数
pub struct Field<T> {
    pub name: &'static str,
    pub assign: fn(&mut T, &Value) -> Result<(), ConversionError>,
}

/// 可由 JSON 对象逐字段填充的结构体
///
/// 字段表是显式声明的：键名精确匹配；对象中缺失的键保留默认值；
/// 对象中多余的键被忽略。通常通过 [`record!`](crate::record) 宏实现。
pub trait Record: Default + 'static {
    const NAME: &'static str;

    fn fields() -> &'static [Field<Self>];
}

/// 按字段表将 JSON 对象转换为记录类型
///
/// 任一字段转换失败即中止，错误中带有字段名。
pub fn coerce_record<T: Record>(value: &Value) -> Result<T, ConversionError> {
    let Value::Object(map) = value else {
        return Err(ConversionError::incompatible(value, T::NAME));
    };

    let mut record = T::default();
    for field in T::fields() {
        if let Some(entry) = map.get(field.name) {
            (field.assign)(&mut record, entry).map_err(|e| ConversionError::Field {
                target: T::NAME,
                field: field.name,
                source: Box::new(e),
            })?;
        }
    }
    Ok(record)
}

/// 为结构体声明 JSON 字段表，同时实现 `Record` 与 `Coerce`
///
/// ```
/// use testpilot::record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// record!(User { id, name => "Name" });
///
/// let user: User = testpilot::coerce::coerce(&serde_json::json!({"id": 1, "Name": "Max"})).unwrap();
/// assert_eq!(user, User { id: 1, name: "Max".to_string() });
/// ```
#[macro_export]
macro_rules! record {
    ($name:ident { $($field:ident $(=> $key:literal)?),+ $(,)? }) => {
        impl $crate::coerce::Record for $name {
            const NAME: &'static str = stringify!($name);

            fn fields() -> &'static [$crate::coerce::Field<Self>] {
                const FIELDS: &[$crate::coerce::Field<$name>] = &[
                    $($crate::coerce::Field {
                        name: $crate::record!(@key $field $($key)?),
                        assign: |target: &mut $name, value: &$crate::serde_json::Value| {
                            target.$field = $crate::coerce::Coerce::coerce(value)?;
                            Ok(())
                        },
                    }),+
                ];
                FIELDS
            }
        }

        impl $crate::coerce::Coerce for $name {
            fn coerce(
                value: &$crate::serde_json::Value,
            ) -> ::std::result::Result<Self, $crate::coerce::ConversionError> {
                $crate::coerce::coerce_record(value)
            }
        }
    };
    (@key $field:ident) => {
        stringify!($field)
    };
    (@key $field:ident $key:literal) => {
        $key
    };
}
