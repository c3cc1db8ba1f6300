//! Command-line interface for the converter.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::{parse_source_file_name, Settings, DEFAULT_SOURCE_DIR};
use crate::converter::{discover_sources, Converter};
use crate::error::{ConverterError, Result};
use crate::output::generate_json;
use crate::pattern::compile_matcher;
use crate::schema::SchemaRegistry;
use crate::types::Collection;

/// Century of Lawmaking converter - Turn bill and resolution metadata into CSV and JSON.
#[derive(Parser)]
#[command(name = "lawmaking-converter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Options for replacing the built-in configuration.
#[derive(Args, Debug, Default)]
pub struct ConfigArgs {
    /// Converter settings file (YAML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field schema file (YAML)
    #[arg(long)]
    pub schemas: Option<PathBuf>,
}

impl ConfigArgs {
    fn converter(&self) -> Result<Converter> {
        Ok(Converter::new(
            Settings::load(self.config.as_deref())?,
            SchemaRegistry::load(self.schemas.as_deref())?,
        ))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert every source file into CSV and JSON.
    Convert {
        /// Directory with the source metadata files
        #[arg(short, long, default_value = DEFAULT_SOURCE_DIR)]
        source: PathBuf,

        /// Directory receiving the csv/ and json/ output directories
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Parse one source file and print its documents as JSON.
    Parse {
        /// Source file (e.g., source/llhb041.txt)
        file: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Print the compiled line pattern of a collection.
    Pattern {
        /// Collection identifier (llhb, llsb or llsr)
        collection: String,

        /// Field schema file (YAML)
        #[arg(long)]
        schemas: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            source,
            output,
            config,
        } => convert_command(&source, &output, &config),
        Commands::Parse { file, config } => parse_command(&file, &config),
        Commands::Pattern {
            collection,
            schemas,
        } => pattern_command(&collection, schemas.as_deref()),
    }
}

/// Execute the convert command.
fn convert_command(source_dir: &Path, output: &Path, config: &ConfigArgs) -> Result<()> {
    if !source_dir.is_dir() {
        return Err(ConverterError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Source directory does not exist: {}", source_dir.display()),
        )));
    }

    // Configuration problems abort before any file is written
    let converter = config.converter()?;
    let sources = discover_sources(source_dir)?;

    println!(
        "{} {} files from {}",
        style("Converting").bold(),
        style(sources.len()).cyan(),
        style(source_dir.display()).green()
    );
    println!();

    let pb = ProgressBar::new(sources.len() as u64);
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .expect("valid template"),
    );

    let report = converter.convert_all(&sources, output, |source| {
        pb.set_message(source.stem());
        pb.inc(1);
    });

    pb.finish_and_clear();

    println!("  Files: {}", report.converted.len());
    println!("  Rows: {}", report.rows());
    println!("  Documents: {}", report.documents());
    if report.diagnostics() > 0 {
        println!(
            "  Warnings: {}",
            style(report.diagnostics()).yellow().bold()
        );
    }

    if !report.is_success() {
        println!("  Failed: {}", style(report.failures.len()).red().bold());
        for failure in &report.failures {
            eprintln!("  {} {failure}", style("✗").red());
        }
        return Err(ConverterError::BatchFailed {
            failed: report.failures.len(),
            total: sources.len(),
        });
    }

    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        output.display()
    );

    Ok(())
}

/// Execute the parse command.
fn parse_command(file: &Path, config: &ConfigArgs) -> Result<()> {
    let source = parse_source_file_name(file)?;
    let converter = config.converter()?;
    let conversion = converter.convert_source(&source)?;

    for diagnostic in &conversion.parsed.diagnostics {
        eprintln!("{} {diagnostic}", style("warning:").yellow().bold());
    }

    let json = generate_json(&conversion.documents)?;
    std::io::stdout().write_all(json.as_bytes())?;
    Ok(())
}

/// Execute the pattern command.
fn pattern_command(collection: &str, schemas: Option<&Path>) -> Result<()> {
    let collection: Collection = collection.parse()?;
    let registry = SchemaRegistry::load(schemas)?;
    let matcher = compile_matcher(collection, registry.schema(collection)?)?;

    println!("{}", matcher.as_str());
    Ok(())
}
