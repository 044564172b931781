pub mod step;
pub mod target;

// Re-export commonly used types
pub use step::Step;
pub use target::ValidationTarget;
