/// 占位符模块 - 用之前响应中的数据替换 URL 模板里的 `{...}`
mod resolver;
mod scanner;
mod types;

pub use resolver::{render_value, resolve};
pub use scanner::scan;
pub use types::{Placeholder, Reference, ResolutionError, Token};
