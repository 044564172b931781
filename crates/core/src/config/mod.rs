//! Configuration management for tfcheck

mod settings;
pub mod retry_config;
pub mod validation;

// Re-export main types
pub use retry_config::RetryConfig;
pub use settings::{CONFIG_FILE_NAMES, Config};
pub use validation::validate_config;
