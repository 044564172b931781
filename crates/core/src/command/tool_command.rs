use std::path::{Path, PathBuf};
use std::process::Command;

/// A single invocation of the external tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// First argument, i.e. the tool subcommand (`init`, `fmt`, ...)
    pub fn subcommand(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn to_shell_command(&self) -> String {
        let mut cmd = quote(&self.program);
        for arg in &self.args {
            cmd.push(' ');
            cmd.push_str(&quote(arg));
        }
        cmd
    }

    /// Build the std process for this invocation. Stdio is left to the caller.
    pub fn to_process(&self) -> Command {
        let mut process = Command::new(&self.program);
        process.args(&self.args);

        if let Some(ref dir) = self.working_dir {
            process.current_dir(dir);
        }

        for (key, value) in &self.env {
            process.env(key, value);
        }

        process
    }
}

fn quote(arg: &str) -> String {
    if arg.contains(' ') {
        format!("'{arg}'")
    } else {
        arg.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_command_quotes_spaces() {
        let cmd = ToolCommand::new("terraform", vec!["init".into(), "-backend=false".into()])
            .with_arg("-var-file=dev vars.tfvars");
        insta::assert_snapshot!(
            cmd.to_shell_command(),
            @"terraform init -backend=false '-var-file=dev vars.tfvars'"
        );
    }

    #[test]
    fn test_builder_sets_dir_and_env() {
        let cmd = ToolCommand::new("terraform", vec!["validate".into()])
            .with_working_dir("terraform/core")
            .with_env("TF_IN_AUTOMATION", "1");

        assert_eq!(cmd.subcommand(), Some("validate"));
        assert_eq!(cmd.working_dir(), Some(Path::new("terraform/core")));
        assert_eq!(cmd.env, vec![("TF_IN_AUTOMATION".to_string(), "1".to_string())]);

        let process = cmd.to_process();
        assert_eq!(process.get_program(), "terraform");
        assert_eq!(process.get_current_dir(), Some(Path::new("terraform/core")));
    }
}
