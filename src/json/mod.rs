/// JSON 路径导航 - 按点号分隔的路径在解码后的 JSON 中取值
mod navigator;
mod path;

pub use navigator::{JsonKind, NavigationError, NotFoundReason, navigate};
pub use path::{JsonPath, Segment};
