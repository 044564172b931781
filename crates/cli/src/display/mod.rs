pub mod formatter;

pub use formatter::{format_dry_run, format_suite_report, format_target_report};
