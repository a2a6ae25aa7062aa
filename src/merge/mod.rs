//! Directory-tree merge driven by the primary source tree.
//!
//! The walk visits every entry under the primary root and mirrors its
//! relative path into the output tree: directories are created (empty ones
//! included), binary artifacts are combined with their secondary counterpart
//! through the merge tool, and everything else is copied verbatim. Files that
//! exist only in the secondary tree are never visited.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;
use walkdir::WalkDir;

use crate::classify::ArtifactDetector;
use crate::tool::MergeTool;

/// Counters for one merge run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeStats {
    /// Binary pairs combined by the merge tool.
    pub merged: usize,
    /// Plain files copied verbatim from the primary tree.
    pub copied: usize,
    /// Binary artifacts skipped because the secondary counterpart is missing.
    pub skipped: usize,
}

/// Walks the primary tree and mirrors it into the output tree, merging
/// binary artifacts with their secondary counterparts along the way.
pub struct DirectoryMerger<D, T> {
    primary_root: PathBuf,
    secondary_root: PathBuf,
    output_root: PathBuf,
    detector: D,
    tool: T,
    stats: MergeStats,
}

impl<D: ArtifactDetector, T: MergeTool> DirectoryMerger<D, T> {
    pub fn new(
        primary_root: impl Into<PathBuf>,
        secondary_root: impl Into<PathBuf>,
        output_root: impl Into<PathBuf>,
        detector: D,
        tool: T,
    ) -> Self {
        Self {
            primary_root: primary_root.into(),
            secondary_root: secondary_root.into(),
            output_root: output_root.into(),
            detector,
            tool,
            stats: MergeStats::default(),
        }
    }

    /// Run the merge.
    ///
    /// A binary artifact with no secondary counterpart is reported on stdout
    /// and skipped; the walk continues. Every other failure (unwalkable
    /// input, uncreatable output, merge-tool failure) is fatal and returned
    /// as an error with the offending path attached. If the output root
    /// already exists the run merges into it, overwriting colliding files.
    pub fn merge(&mut self) -> Result<MergeStats> {
        self.stats = MergeStats::default();

        fs::create_dir_all(&self.output_root).with_context(|| {
            format!("failed to create output directory {}", self.output_root.display())
        })?;

        // Entries are sorted per directory so runs are deterministic and the
        // merge-tool invocation order is reproducible.
        for entry in WalkDir::new(&self.primary_root).min_depth(1).sort_by_file_name() {
            let entry = entry.with_context(|| {
                format!("failed to walk primary source {}", self.primary_root.display())
            })?;
            let relative = entry.path().strip_prefix(&self.primary_root)?;
            let secondary = self.secondary_root.join(relative);
            let output = self.output_root.join(relative);

            if entry.file_type().is_dir() {
                debug!(path = %relative.display(), "mirroring directory");
                fs::create_dir_all(&output).with_context(|| {
                    format!("failed to create output directory {}", output.display())
                })?;
            } else if self.detector.is_artifact(entry.path()) {
                self.merge_artifact(entry.path(), &secondary, &output)?;
            } else {
                self.copy_plain(entry.path(), &output)?;
            }
        }

        Ok(self.stats.clone())
    }

    pub fn stats(&self) -> &MergeStats {
        &self.stats
    }

    fn merge_artifact(&mut self, primary: &Path, secondary: &Path, output: &Path) -> Result<()> {
        if !secondary.exists() {
            println!("Lib not found in secondary source: {}", secondary.display());
            self.stats.skipped += 1;
            return Ok(());
        }

        ensure_parent(output)?;
        debug!(primary = %primary.display(), "merging binary pair");
        self.tool.combine(primary, secondary, output)?;
        self.stats.merged += 1;
        Ok(())
    }

    fn copy_plain(&mut self, primary: &Path, output: &Path) -> Result<()> {
        ensure_parent(output)?;
        debug!(primary = %primary.display(), "copying plain file");
        fs::copy(primary, output).with_context(|| {
            format!("failed to copy {} to {}", primary.display(), output.display())
        })?;
        self.stats.copied += 1;
        Ok(())
    }
}

/// Merge `primary_root` and `secondary_root` into `output_root`.
///
/// Convenience wrapper over [`DirectoryMerger`] for one-shot runs.
pub fn merge_trees<D: ArtifactDetector, T: MergeTool>(
    primary_root: impl Into<PathBuf>,
    secondary_root: impl Into<PathBuf>,
    output_root: impl Into<PathBuf>,
    detector: D,
    tool: T,
) -> Result<MergeStats> {
    DirectoryMerger::new(primary_root, secondary_root, output_root, detector, tool).merge()
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory {}", parent.display()))?;
    }
    Ok(())
}
