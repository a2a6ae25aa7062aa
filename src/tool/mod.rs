//! External architecture-merge tool invocation.
//!
//! Combining two single-architecture images into one universal binary is
//! delegated to an external tool (`lipo` on Apple platforms, `llvm-lipo`
//! elsewhere). The trait keeps that process boundary narrow: one blocking
//! operation per matched pair, so the traversal can run against a recording
//! stand-in in tests.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

/// Runs the external merge for one matched pair of binaries.
pub trait MergeTool {
    /// Combine `primary` and `secondary` into a universal image at `output`.
    ///
    /// Blocks until the tool exits. Any error aborts the surrounding run.
    fn combine(&self, primary: &Path, secondary: &Path, output: &Path) -> Result<(), ToolError>;
}

impl<T: MergeTool + ?Sized> MergeTool for &T {
    fn combine(&self, primary: &Path, secondary: &Path, output: &Path) -> Result<(), ToolError> {
        (**self).combine(primary, secondary, output)
    }
}

/// Merge-tool errors
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("failed to launch {tool:?}: {source}")]
    Launch {
        tool: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{tool:?} exited with {status} while merging {primary:?}")]
    Merge {
        tool: PathBuf,
        status: ExitStatus,
        primary: PathBuf,
    },
}

/// Production tool: invokes `<tool> -create <primary> <secondary> -output <output>`.
///
/// The child inherits stdio, so the tool's own diagnostics reach the user
/// unmodified.
pub struct Lipo {
    tool: PathBuf,
}

impl Lipo {
    pub fn new(tool: impl Into<PathBuf>) -> Self {
        Self { tool: tool.into() }
    }
}

impl Default for Lipo {
    fn default() -> Self {
        Self::new("lipo")
    }
}

impl MergeTool for Lipo {
    fn combine(&self, primary: &Path, secondary: &Path, output: &Path) -> Result<(), ToolError> {
        debug!(
            tool = %self.tool.display(),
            primary = %primary.display(),
            secondary = %secondary.display(),
            output = %output.display(),
            "invoking merge tool"
        );

        let status = Command::new(&self.tool)
            .arg("-create")
            .arg(primary)
            .arg(secondary)
            .arg("-output")
            .arg(output)
            .status()
            .map_err(|source| ToolError::Launch { tool: self.tool.clone(), source })?;

        if !status.success() {
            return Err(ToolError::Merge {
                tool: self.tool.clone(),
                status,
                primary: primary.to_path_buf(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_failure_is_reported_with_tool_name() {
        let lipo = Lipo::new("/nonexistent/lipo-tool");
        let err = lipo
            .combine(Path::new("a"), Path::new("b"), Path::new("c"))
            .expect_err("launch should fail");
        match err {
            ToolError::Launch { tool, .. } => {
                assert_eq!(tool, PathBuf::from("/nonexistent/lipo-tool"))
            }
            other => panic!("expected launch error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_merge_error() {
        let lipo = Lipo::new("false");
        let err = lipo
            .combine(Path::new("a"), Path::new("b"), Path::new("c"))
            .expect_err("false(1) exits nonzero");
        match err {
            ToolError::Merge { status, primary, .. } => {
                assert!(!status.success());
                assert_eq!(primary, PathBuf::from("a"));
            }
            other => panic!("expected merge error, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn zero_exit_is_success() {
        let lipo = Lipo::new("true");
        lipo.combine(Path::new("a"), Path::new("b"), Path::new("c"))
            .expect("true(1) exits zero");
    }
}
