//! aciss - chapter page renderer and EPUB restructuring tool

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use aciss::preserve::{verify_content_regions, verify_files};
use aciss::{
    Chapter, ChapterFrontMatter, Config, Strategy, from_roman, process_directory, process_epub,
    process_part_file, read_document, render_chapter_document, render_mockup, to_roman,
    transform_file, validate_directory,
};

#[derive(Parser)]
#[command(name = "aciss")]
#[command(version, about = "Chapter page renderer and EPUB restructuring tool", long_about = None)]
#[command(after_help = "EXAMPLES:
    aciss mockup -o mockup.html                  Render the design mockup
    aciss transform in.xhtml out.xhtml           Restructure one chapter
    aciss batch text/ out/                       Process a text directory
    aciss check text/ out/ --json                Validate processed pages
    aciss roman 6 XIV                            Convert numerals")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the annotated design mockup as standalone HTML
    Mockup {
        /// Front-matter fixture (JSON or TOML); defaults to the chapter VI sample
        #[arg(short, long)]
        fixture: Option<PathBuf>,
        /// Output file; defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render a chapter document from a front-matter fixture
    Render {
        #[arg(short, long)]
        fixture: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Transform one legacy chapter page
    Transform {
        input: PathBuf,
        output: PathBuf,
        /// Defaults to the configured strategy
        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,
    },
    /// Clean one part divider page
    Part { input: PathBuf, output: PathBuf },
    /// Check that a processed page kept the text of the original
    Validate {
        original: PathBuf,
        processed: PathBuf,
        /// Leave out the regenerated title chrome (for rebuilt pages)
        #[arg(long)]
        regions: bool,
    },
    /// Process every chapter and part divider in a directory
    Batch { input_dir: PathBuf, output_dir: PathBuf },
    /// Validate a processed directory against its originals
    Check {
        input_dir: PathBuf,
        output_dir: PathBuf,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Process the chapter pages inside an EPUB
    Epub { input: PathBuf, output: PathBuf },
    /// Convert between numbers and roman numerals
    Roman {
        #[arg(required = true)]
        values: Vec<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

/// Run a command. `Ok(false)` means it ran but the result did not pass.
fn run(cli: Cli) -> aciss::Result<bool> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Mockup { fixture, output } => {
            let front = load_fixture(fixture.as_deref())?;
            emit(&render_mockup(&front), output.as_deref())?;
            Ok(true)
        }
        Command::Render { fixture, output } => {
            let front = load_fixture(fixture.as_deref())?;
            let chapter = Chapter::new(front);
            emit(&render_chapter_document(&chapter, &config.render), output.as_deref())?;
            Ok(true)
        }
        Command::Transform {
            input,
            output,
            strategy,
        } => {
            let strategy = strategy.unwrap_or(config.batch.strategy);
            let outcome = transform_file(&input, &output, strategy, &config.render)?;
            println!("{}: {}", output.display(), outcome.preservation.summary());
            Ok(outcome.preserved())
        }
        Command::Part { input, output } => {
            let outcome = process_part_file(&input, &output)?;
            println!("{}: {}", output.display(), outcome.preservation.summary());
            Ok(outcome.preserved())
        }
        Command::Validate {
            original,
            processed,
            regions,
        } => {
            let report = if regions {
                verify_content_regions(&read_document(&original)?, &read_document(&processed)?)?
            } else {
                verify_files(&original, &processed)?
            };
            println!("{}", report.summary());
            for word in &report.removed_words {
                println!("  - {word}");
            }
            for word in &report.added_words {
                println!("  + {word}");
            }
            Ok(report.is_preserved())
        }
        Command::Batch {
            input_dir,
            output_dir,
        } => {
            let summary = process_directory(&input_dir, &output_dir, &config)?;
            for file in &summary.files {
                println!("{:<60} {:?}", file.name, file.status);
            }
            println!(
                "{} files: {} preserved, {} failed",
                summary.total(),
                summary.preserved(),
                summary.failed()
            );
            Ok(summary.is_success())
        }
        Command::Check {
            input_dir,
            output_dir,
            json,
        } => {
            let summary = validate_directory(&input_dir, &output_dir, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                for file in &summary.files {
                    let content = if file.content_preserved { "ok" } else { "CHANGED" };
                    let compliance = if file.compliant { "ok" } else { "ISSUES" };
                    println!("{:<60} content {content:<8} compliance {compliance}", file.name);
                    for issue in file.issues.iter().take(3) {
                        println!("    - {issue}");
                    }
                    if file.issues.len() > 3 {
                        println!("    ... and {} more issues", file.issues.len() - 3);
                    }
                }
                println!(
                    "Content preservation: {:.1}% (target {:.0}%)",
                    summary.content_rate, summary.content_threshold
                );
                println!(
                    "Compliance: {:.1}% (target {:.0}%)",
                    summary.compliance_rate, summary.compliance_threshold
                );
            }
            Ok(summary.passed())
        }
        Command::Epub { input, output } => {
            let summary = process_epub(&input, &output, &config)?;
            println!(
                "{}: {} pages, {} preserved, {} failed",
                output.display(),
                summary.total(),
                summary.preserved(),
                summary.failed()
            );
            Ok(summary.is_success())
        }
        Command::Roman { values } => {
            let mut ok = true;
            for value in &values {
                if let Ok(n) = value.parse::<u32>() {
                    println!("{n} = {}", to_roman(n));
                } else if let Some(n) = from_roman(value) {
                    println!("{} = {n}", value.to_uppercase());
                } else {
                    eprintln!("error: not a number or roman numeral: {value}");
                    ok = false;
                }
            }
            Ok(ok)
        }
    }
}

fn load_fixture(path: Option<&Path>) -> aciss::Result<ChapterFrontMatter> {
    match path {
        Some(path) => ChapterFrontMatter::load(path),
        None => Ok(ChapterFrontMatter::sample()),
    }
}

fn emit(content: &str, output: Option<&Path>) -> aciss::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output");
        }
        None => print!("{content}"),
    }
    Ok(())
}
