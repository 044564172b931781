//! Validation runner architecture
//!
//! A [`ValidationRunner`] walks one target through [`Step::ALL`](crate::Step::ALL),
//! driving a [`RunState`] machine. A [`SuiteRunner`] fans many targets out
//! across worker threads.

pub mod options;
pub mod report;
pub mod retry;
pub mod state;
pub mod suite_runner;
pub mod validation_runner;

// Re-export main types
pub use options::RunnerOptions;
pub use report::{StepRecord, SuiteReport, TargetReport};
pub use retry::RetryPolicy;
pub use state::{RunState, StepEvent};
pub use suite_runner::SuiteRunner;
pub use validation_runner::ValidationRunner;
