//! Host integration seam.
//!
//! The kernel never touches the filesystem or the UI directly; everything
//! goes through `HostEnv` so the editor host (or a test) supplies workspace
//! paths, file primitives, the modal approval dialog, and a diagnostic
//! channel.

use crate::core::scope::normalize_posix;
use std::io;
use std::path::{Path, PathBuf};

/// Outcome of the modal approval dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Approval {
    Approve,
    Reject,
    /// The dialog was closed without an explicit choice.
    Dismissed,
}

/// Environment supplied by the editor host.
pub trait HostEnv: Send + Sync {
    fn workspace_root(&self) -> &Path;

    fn file_exists(&self, path: &Path) -> bool;

    fn read_text(&self, path: &Path) -> io::Result<String>;

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()>;

    fn append_text(&self, path: &Path, content: &str) -> io::Result<()>;

    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Presents a blocking approval dialog to the user.
    fn request_approval(&self, message: &str) -> Approval;

    /// Diagnostic channel. Observability failures land here and nowhere else.
    fn diag(&self, message: &str);
}

/// Resolves a tool-supplied path against the workspace root.
#[must_use]
pub fn resolve_workspace_path(root: &Path, raw: &str) -> PathBuf {
    let candidate = Path::new(raw);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        root.join(candidate)
    }
}

/// Converts a tool-supplied path into a workspace-relative POSIX path.
#[must_use]
pub fn workspace_relative(root: &Path, raw: &str) -> String {
    let normalized = normalize_posix(raw);
    let root_posix = normalize_posix(&root.to_string_lossy());
    let root_prefix = if root_posix.ends_with('/') {
        root_posix
    } else {
        format!("{root_posix}/")
    };
    normalized
        .strip_prefix(&root_prefix)
        .map_or(normalized.clone(), std::string::ToString::to_string)
}

/// Approval callback used by [`NativeHost`].
pub type ApprovalFn = Box<dyn Fn(&str) -> Approval + Send + Sync>;

/// `HostEnv` over the local filesystem.
///
/// The default approval callback reports `Dismissed`: without a UI wired in,
/// destructive calls must not silently pass.
pub struct NativeHost {
    root: PathBuf,
    approval: ApprovalFn,
}

impl NativeHost {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            approval: Box::new(|_| Approval::Dismissed),
        }
    }

    #[must_use]
    pub fn with_approval(mut self, approval: ApprovalFn) -> Self {
        self.approval = approval;
        self
    }
}

impl HostEnv for NativeHost {
    fn workspace_root(&self) -> &Path {
        &self.root
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_text(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_text(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn append_text(&self, path: &Path, content: &str) -> io::Result<()> {
        use std::io::Write;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        file.write_all(content.as_bytes())
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn request_approval(&self, message: &str) -> Approval {
        (self.approval)(message)
    }

    fn diag(&self, message: &str) {
        eprintln!("warden: {message}");
    }
}
