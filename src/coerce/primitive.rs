use std::collections::{BTreeMap, HashMap};

use serde_json::{Number, Value};

use crate::coerce::types::{Coerce, ConversionError};

/// JSON 数字的整数值；带小数部分或非有限值时返回 None
fn integral(number: &Number) -> Option<i128> {
    if let Some(i) = number.as_i64() {
        return Some(i as i128);
    }
    if let Some(u) = number.as_u64() {
        return Some(u as i128);
    }
    let f = number.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 {
        Some(f as i128)
    } else {
        None
    }
}

macro_rules! coerce_integer {
    ($($ty:ty),+ $(,)?) => {$(
        impl Coerce for $ty {
            fn coerce(value: &Value) -> Result<Self, ConversionError> {
                let Value::Number(number) = value else {
                    return Err(ConversionError::incompatible(value, stringify!($ty)));
                };
                integral(number)
                    .and_then(|n| <$ty>::try_from(n).ok())
                    .ok_or_else(|| ConversionError::Lossy {
                        value: number.to_string(),
                        target: stringify!($ty),
                    })
            }
        }
    )+};
}

coerce_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Coerce for f64 {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_f64()
            .ok_or_else(|| ConversionError::incompatible(value, "f64"))
    }
}

impl Coerce for f32 {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        let wide = value
            .as_f64()
            .ok_or_else(|| ConversionError::incompatible(value, "f32"))?;
        let narrow = wide as f32;
        if narrow.is_finite() {
            Ok(narrow)
        } else {
            Err(ConversionError::Lossy {
                value: wide.to_string(),
                target: "f32",
            })
        }
    }
}

impl Coerce for bool {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_bool()
            .ok_or_else(|| ConversionError::incompatible(value, "bool"))
    }
}

impl Coerce for String {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| ConversionError::incompatible(value, "String"))
    }
}

impl Coerce for Value {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        Ok(value.clone())
    }
}

impl<T: Coerce> Coerce for Option<T> {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::coerce(other).map(Some),
        }
    }
}

impl<T: Coerce> Coerce for Vec<T> {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        let target = std::any::type_name::<Self>();
        let Value::Array(items) = value else {
            return Err(ConversionError::incompatible(value, target));
        };
        items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                T::coerce(item).map_err(|e| ConversionError::Element {
                    target,
                    index,
                    source: Box::new(e),
                })
            })
            .collect()
    }
}

fn coerce_entries<T, C>(value: &Value, target: &'static str) -> Result<C, ConversionError>
where
    T: Coerce,
    C: FromIterator<(String, T)>,
{
    let Value::Object(map) = value else {
        return Err(ConversionError::incompatible(value, target));
    };
    map.iter()
        .map(|(key, item)| {
            T::coerce(item)
                .map(|v| (key.clone(), v))
                .map_err(|e| ConversionError::Entry {
                    target,
                    key: key.clone(),
                    source: Box::new(e),
                })
        })
        .collect()
}

impl<T: Coerce> Coerce for HashMap<String, T> {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        coerce_entries(value, std::any::type_name::<Self>())
    }
}

impl<T: Coerce> Coerce for BTreeMap<String, T> {
    fn coerce(value: &Value) -> Result<Self, ConversionError> {
        coerce_entries(value, std::any::type_name::<Self>())
    }
}
