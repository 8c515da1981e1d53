/// 类型转换模块 - 将无类型的 JSON 值转换为静态类型
mod primitive;
mod record;
mod types;

pub use record::{Field, Record, coerce_record};
pub use types::{Coerce, ConversionError, coerce};
