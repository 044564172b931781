//! Options shared by every command the runner builds

/// How the runner invokes the tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerOptions {
    /// Program to run, `terraform` unless configured otherwise
    pub terraform_binary: String,
    /// Append `-no-color` to every command
    pub no_color: bool,
    /// Extra environment passed to every command
    pub env: Vec<(String, String)>,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            terraform_binary: "terraform".to_string(),
            no_color: false,
            env: Vec::new(),
        }
    }
}

impl RunnerOptions {
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.terraform_binary = binary.into();
        self
    }

    pub fn with_no_color(mut self, no_color: bool) -> Self {
        self.no_color = no_color;
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}
