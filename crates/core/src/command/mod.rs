//! Tool invocations and the executors that run them

pub mod executor;
pub mod tool_command;

pub use executor::{CommandExecutor, CommandOutput, ProcessExecutor};
pub use tool_command::ToolCommand;
