//! Transpile a source document and write the generated files

use std::fs;
use std::path::PathBuf;

use super::CliError;
use crate::{TranspileOptions, TranspileStats, parse, transpile};

/// Options for the build command
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// The source document to transpile
    pub source: String,
    /// Directory the generated tree is written under
    pub out_dir: PathBuf,
    /// Treat unresolved mutations and target-less handler contracts as
    /// errors
    pub strict: bool,
}

/// Result of a successful build
#[derive(Debug)]
pub struct BuildReport {
    /// Paths written, relative to the output directory
    pub files_written: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: TranspileStats,
}

/// Execute a build operation
pub fn execute_build(options: &BuildOptions) -> Result<BuildReport, CliError> {
    let app = parse(&options.source)?;

    let transpile_options = TranspileOptions {
        strict: options.strict,
        source_lines: Some(options.source.lines().count()),
    };
    let output = transpile(&app, &transpile_options)?;

    let mut files_written = Vec::new();
    for file in &output.files {
        let dest = options.out_dir.join(&file.path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, &file.content)?;
        files_written.push(file.path.clone());
    }

    Ok(BuildReport {
        files_written,
        warnings: output.warnings,
        stats: output.stats,
    })
}
