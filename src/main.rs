use clap::{Parser as ClapParser, Subcommand};
use facet_lang::cli::{self, BuildOptions, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use std::path::PathBuf;

#[derive(ClapParser)]
#[command(name = "facet")]
#[command(about = "Facet - transpile compact app descriptions into a working web app")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a source document without writing output
    Check {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Only validate syntax, don't run the pipeline
        #[arg(long)]
        syntax_only: bool,

        /// Treat unresolved mutations and target-less handlers as errors
        #[arg(long)]
        strict: bool,
    },

    /// Transpile a source document and write the generated files
    Build {
        /// Source file (reads from stdin if not provided)
        file: Option<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "out")]
        out: PathBuf,

        /// Treat unresolved mutations and target-less handlers as errors
        #[arg(long)]
        strict: bool,

        /// Print stats as JSON instead of the human-readable summary
        #[arg(long)]
        stats_json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            file,
            syntax_only,
            strict,
        } => run_check(file, syntax_only, strict),
        Commands::Build {
            file,
            out,
            strict,
            stats_json,
        } => run_build(file, out, strict, stats_json),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn read_source(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path).map_err(CliError::Io)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(CliError::Io)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}

fn run_check(file: Option<PathBuf>, syntax_only: bool, strict: bool) -> Result<(), CliError> {
    let source = read_source(file)?;
    let options = CheckOptions {
        source,
        syntax_only,
        strict,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Syntax is valid"),
        CheckResult::Checked { warnings, stats } => {
            for warning in &warnings {
                eprintln!("warning: {}", warning);
            }
            println!(
                "ok: {} file(s), {} page(s), {} model(s), {} route(s)",
                stats.file_count, stats.page_count, stats.model_count, stats.route_count
            );
        }
    }
    Ok(())
}

fn run_build(
    file: Option<PathBuf>,
    out: PathBuf,
    strict: bool,
    stats_json: bool,
) -> Result<(), CliError> {
    let source = read_source(file)?;
    let options = BuildOptions {
        source,
        out_dir: out,
        strict,
    };

    let report = cli::execute_build(&options)?;

    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }

    if stats_json {
        let stats = serde_json::json!({
            "files": report.stats.file_count,
            "generated_lines": report.stats.generated_lines,
            "source_lines": report.stats.source_lines,
            "expansion_ratio": report.stats.expansion_ratio,
            "pages": report.stats.page_count,
            "models": report.stats.model_count,
            "routes": report.stats.route_count,
        });
        println!("{}", serde_json::to_string_pretty(&stats).map_err(io::Error::other)?);
    } else {
        for path in &report.files_written {
            println!("wrote {}", path);
        }
        println!(
            "{} file(s), {} generated line(s){}",
            report.stats.file_count,
            report.stats.generated_lines,
            report
                .stats
                .expansion_ratio
                .map(|r| format!(", {:.1}x expansion", r))
                .unwrap_or_default()
        );
    }
    Ok(())
}
