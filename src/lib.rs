pub mod assertion;
pub mod coerce;
pub mod config;
pub mod error;
pub mod http;
pub mod json;
pub mod logger;
pub mod placeholder;
pub mod runner;

// `record!` 宏展开时通过 `$crate::serde_json` 引用
pub use serde_json;

// Re-export commonly used types
pub use assertion::{
    AssertError, AssertionFn, assert_equal, assert_exists, assert_path, assert_text, contains,
    equal, exists, not_equal,
};
pub use coerce::{Coerce, ConversionError, coerce};
pub use config::{ConfigLoader, Settings};
pub use error::{PilotError, Result};
pub use http::{Body, HttpTransport, Method, ResponseRecord, Status, Transport};
pub use json::{JsonPath, navigate};
pub use runner::{Expect, PlanFile, PlanReport, RequestSpec, ResponseStore, TestPlan};
