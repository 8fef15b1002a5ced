//! pdfoutline CLI - PDF heading outline extraction tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfoutline::batch::scan_pdfs;
use pdfoutline::{
    extract_from_source, render, BatchOptions, BatchRunner, IngestOptions, JsonFormat,
    OutlineConfig, OutlineExtractor, PdfSource,
};

#[derive(Parser)]
#[command(name = "pdfoutline")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract title and H1/H2/H3 outlines from PDF files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines of every PDF in a directory
    Batch {
        /// Directory containing PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Directory for the JSON outlines
        #[arg(value_name = "OUTPUT_DIR")]
        output: PathBuf,

        /// Heuristic configuration (JSON)
        #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
        config: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Process documents one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Extract the outline of a single PDF
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Heuristic configuration (JSON)
        #[arg(long, value_name = "FILE", env = "PDFOUTLINE_CONFIG")]
        config: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the default heuristic configuration
    Defaults,

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Batch {
            input,
            output,
            config,
            compact,
            sequential,
        } => cmd_batch(&input, &output, config.as_deref(), compact, sequential),
        Commands::Extract {
            input,
            output,
            config,
            compact,
        } => cmd_extract(&input, output.as_deref(), config.as_deref(), compact),
        Commands::Defaults => cmd_defaults(),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

/// Validation happens when the extractor is built from the config.
fn load_config(path: Option<&Path>) -> Result<OutlineConfig, Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            let json = fs::read_to_string(p)
                .map_err(|e| format!("Cannot read config {}: {}", p.display(), e))?;
            Ok(OutlineConfig::from_json(&json)?)
        }
        None => Ok(OutlineConfig::default()),
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn cmd_batch(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    compact: bool,
    sequential: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let options = BatchOptions::new()
        .with_parallel(!sequential)
        .with_format(json_format(compact))
        .with_ingest_options(IngestOptions::new().lenient());
    let runner = BatchRunner::new(config, options)?;

    let total = scan_pdfs(input)?.len();
    if total == 0 {
        println!("{} {}", "No PDF files found in".yellow(), input.display());
        return Ok(());
    }

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = runner.run_with_progress(input, output, |path, _ok| {
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        pb.set_message(name.to_string());
        pb.inc(1);
    })?;
    pb.finish_with_message("Done!");

    println!("\n{}", "Outlines written:".green().bold());
    let count = report.succeeded.len();
    for (i, success) in report.succeeded.iter().enumerate() {
        let branch = if i + 1 == count { "└─" } else { "├─" };
        let name = success.output.file_name().unwrap_or_default().to_string_lossy();
        println!(
            "  {} {} ({} headings)",
            branch.dimmed(),
            name,
            success.headings
        );
    }

    if !report.failed.is_empty() {
        println!("\n{}", "Failed:".red().bold());
        for failure in &report.failed {
            println!("  {} {}: {}", "✗".red(), failure.input.display(), failure.error);
        }
    }

    println!(
        "\n{} {} succeeded, {} failed in {:.2}s",
        "Summary:".cyan().bold(),
        report.succeeded.len().to_string().green(),
        report.failed.len().to_string().red(),
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    config: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::new(load_config(config)?)?;

    // Lenient so one broken page does not lose the rest of the outline
    let source = PdfSource::open_with_options(input, IngestOptions::new().lenient())?;
    let outline = extract_from_source(&source, &extractor)?;
    let format = json_format(compact);

    if let Some(path) = output {
        render::write_json(&outline, path, format)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", render::to_json(&outline, format)?);
    }

    Ok(())
}

fn cmd_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string_pretty(&OutlineConfig::default())?;
    println!("{}", json);
    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfoutline".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}
