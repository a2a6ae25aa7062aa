//! Command-line interface for lipomerge
//!
//! Three positional directories: primary source, secondary source, output.
//! The primary tree drives the merge; see [`crate::merge`].

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::classify::MachODetector;
use crate::merge::DirectoryMerger;
use crate::tool::Lipo;

/// Merge two single-architecture directory trees into a universal-binary tree
#[derive(Parser)]
#[command(name = "lipomerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Primary source tree; drives the walk and wins for non-binary files
    #[arg(value_name = "PRIMARY_DIR")]
    primary_dir: PathBuf,

    /// Secondary source tree holding the other architecture of each binary
    #[arg(value_name = "SECONDARY_DIR")]
    secondary_dir: PathBuf,

    /// Output tree; created on demand, merged into if it already exists
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Architecture-merge tool to invoke for each matched binary pair
    #[arg(long, value_name = "PATH", default_value = "lipo")]
    lipo: PathBuf,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long)]
    verbose: bool,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Wire verbose flag to the tracing log level.
    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    validate_source_root(&cli.primary_dir, "primary")?;
    validate_source_root(&cli.secondary_dir, "secondary")?;

    let mut merger = DirectoryMerger::new(
        cli.primary_dir,
        cli.secondary_dir,
        cli.output_dir,
        MachODetector,
        Lipo::new(cli.lipo),
    );
    let stats = merger.merge()?;

    println!(
        "Merged {} binaries, copied {} files, skipped {} missing in secondary",
        stats.merged, stats.copied, stats.skipped
    );
    Ok(())
}

fn validate_source_root(path: &Path, role: &str) -> Result<()> {
    if !path.exists() {
        bail!("{role} source does not exist: {}", path.display());
    }
    if !path.is_dir() {
        bail!("{role} source is not a directory: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::validate_source_root;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn accepts_existing_directory() {
        let temp = TempDir::new().expect("temp dir");
        validate_source_root(temp.path(), "primary").expect("directory is valid");
    }

    #[test]
    fn rejects_missing_path() {
        let temp = TempDir::new().expect("temp dir");
        let err = validate_source_root(&temp.path().join("missing"), "primary")
            .expect_err("missing path is invalid");
        assert!(err.to_string().contains("primary source does not exist"));
    }

    #[test]
    fn rejects_plain_file() {
        let temp = TempDir::new().expect("temp dir");
        let file = temp.path().join("file.txt");
        fs::write(&file, "not a directory").expect("write file");
        let err = validate_source_root(&file, "secondary")
            .expect_err("a file is not a valid source root");
        assert!(err.to_string().contains("secondary source is not a directory"));
    }
}
