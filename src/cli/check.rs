//! Validate source documents without writing output

use super::CliError;
use crate::{TranspileOptions, TranspileStats, parse, transpile};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The source document to validate
    pub source: String,
    /// Only validate syntax, don't run the pipeline
    pub syntax_only: bool,
    /// Treat unresolved mutations and target-less handler contracts as
    /// errors
    pub strict: bool,
}

/// Result of a check operation
#[derive(Debug)]
pub enum CheckResult {
    /// Syntax validation passed
    SyntaxValid,
    /// Full pipeline ran; no files were written
    Checked {
        warnings: Vec<String>,
        stats: TranspileStats,
    },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let app = parse(&options.source)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid);
    }

    let transpile_options = TranspileOptions {
        strict: options.strict,
        source_lines: Some(options.source.lines().count()),
    };
    let output = transpile(&app, &transpile_options)?;

    Ok(CheckResult::Checked {
        warnings: output.warnings,
        stats: output.stats,
    })
}
