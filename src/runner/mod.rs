pub mod expect;
pub mod file;
pub mod plan;
pub mod reporter;
pub mod request;
pub mod store;
pub mod types;

pub use expect::{Expect, ExpectationFailure, HeaderPredicate, StoreAssertionFn};
pub use file::{ExpectDef, PlanFile, StepDef};
pub use plan::{CancelHandle, PlanState, TestPlan};
pub use reporter::TestReporter;
pub use request::RequestSpec;
pub use store::ResponseStore;
pub use types::{PlanReport, StepOutcome, TestSummary};
