use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

/// A directory holding a Terraform module or root configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidationTarget {
    pub dir: PathBuf,
    /// Initialize with `-backend=false` so no remote state is touched
    #[serde(default)]
    pub backend_disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ValidationTarget {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            backend_disabled: false,
            name: None,
        }
    }

    /// A target initialized without its backend
    pub fn offline(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir).with_backend_disabled(true)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_backend_disabled(mut self, disabled: bool) -> Self {
        self.backend_disabled = disabled;
        self
    }

    pub fn backend_enabled(&self) -> bool {
        !self.backend_disabled
    }

    /// Human readable name used in logs and reports
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.dir.display().to_string(),
        }
    }

    /// Whether a `--target` style filter selects this target.
    ///
    /// Matches the name exactly, or the directory ignoring trailing slashes
    /// and leading `./`.
    pub fn matches(&self, filter: &str) -> bool {
        if self.name.as_deref() == Some(filter) {
            return true;
        }
        normalize(&self.dir) == normalize(Path::new(filter))
    }

    /// Join a relative directory onto `base`; absolute directories are kept.
    pub fn resolve_against(&self, base: &Path) -> Self {
        if self.dir.is_absolute() {
            return self.clone();
        }
        Self {
            dir: normalize(&base.join(&self.dir)),
            ..self.clone()
        }
    }

    /// Key identifying the on-disk directory, used to keep two runs out of
    /// the same `.terraform` state.
    pub fn directory_key(&self) -> PathBuf {
        self.dir
            .canonicalize()
            .unwrap_or_else(|_| normalize(&self.dir))
    }
}

/// Lexically clean a path: drop `.` components and fold `..` where possible.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
