pub mod check;
pub mod executor;
pub mod reporter;
pub mod types;

pub use check::Check;
pub use executor::TestRunner;
pub use reporter::TestReporter;
pub use types::{RunOutcome, TestResult, TestSummary};
