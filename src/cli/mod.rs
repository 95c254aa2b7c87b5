//! Command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;

use crate::config::{self, Settings, DEFAULT_BIND};
use crate::extract::{language_by_code, tools, TextExtractor, LANGUAGES};

#[derive(Parser)]
#[command(name = "textcount")]
#[command(about = "Extract and count text from PDFs and images")]
#[command(version)]
pub struct Cli {
    /// Path to a TOML settings file
    #[arg(long, global = true, env = "TEXTCOUNT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the upload web server
    Serve {
        /// Address to bind to: PORT, HOST, or HOST:PORT
        #[arg(default_value = DEFAULT_BIND)]
        bind: String,
    },

    /// Run the extraction pipeline on a file and print the result
    Extract {
        /// PDF or image file
        file: PathBuf,
        /// Comma-separated OCR language codes (e.g. "por,eng")
        #[arg(short, long)]
        languages: Option<String>,
    },

    /// Check that the required external tools are installed
    Check,
}

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => cmd_serve(settings, &bind).await,
        Commands::Extract { file, languages } => cmd_extract(&settings, &file, languages.as_deref()),
        Commands::Check => cmd_check(),
    }
}

async fn cmd_serve(settings: Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;
    println!(
        "{} Serving on http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    crate::server::serve(settings, &host, port).await
}

fn cmd_extract(settings: &Settings, file: &PathBuf, languages: Option<&str>) -> anyhow::Result<()> {
    let codes = parse_language_codes(languages)?;
    let extractor = TextExtractor::new(settings, codes);
    let result = extractor.extract(file)?;

    println!("{}", style("Extraction result").bold());
    println!("  pages:                {}", result.qt_pages);
    println!("  images with text:     {}", result.qt_images);
    println!("  words:                {}", result.qt_words);
    println!("  characters extracted: {}", result.qt_char_extracted);
    println!("  characters cleaned:   {}", result.qt_char_cleaned);
    if result.qt_page_errors > 0 {
        println!(
            "  {} pages failed OCR and were skipped: {}",
            style("!").yellow(),
            result.qt_page_errors
        );
    }
    println!("\n{}", result.text_extracted.trim());
    Ok(())
}

fn cmd_check() -> anyhow::Result<()> {
    println!("\n{}", style("External tool status").bold());
    println!("{}", "-".repeat(40));

    let mut all_found = true;
    for (tool, available) in tools::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<12} {}", tool, status);
    }

    if all_found {
        println!("\n{} All required tools are installed", style("✓").green());
        Ok(())
    } else {
        println!(
            "\n{} Install poppler-utils, exiftool, and tesseract-ocr",
            style("✗").red()
        );
        anyhow::bail!("required external tools are missing");
    }
}

/// Resolve a comma-separated code list against the language catalog.
fn parse_language_codes(languages: Option<&str>) -> anyhow::Result<Vec<String>> {
    let Some(raw) = languages else {
        return Ok(Vec::new());
    };

    let mut codes = Vec::new();
    for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        if language_by_code(code).is_none() {
            let known: Vec<_> = LANGUAGES.iter().map(|l| l.code).collect();
            anyhow::bail!("unknown language code '{}' (known: {})", code, known.join(", "));
        }
        if !codes.contains(&code.to_string()) {
            codes.push(code.to_string());
        }
    }
    Ok(codes)
}

/// Accepts "PORT", "HOST", or "HOST:PORT".
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok(("127.0.0.1".to_string(), port));
    }
    match bind.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid port in bind address '{}'", bind))?;
            Ok((host.to_string(), port))
        }
        None => Ok((bind.to_string(), 3030)),
    }
}
