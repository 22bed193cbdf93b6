//! pdfsift CLI - encoded payload detection for extracted PDF text

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfsift::{
    analyze, load_request, split_document, AnalysisConfig, AnalysisRequest, Document,
    DocumentReport, JsonFormat, Metadata,
};

#[derive(Parser)]
#[command(name = "pdfsift")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Find encoded and obfuscated payloads in extracted PDF text", long_about = None)]
struct Cli {
    /// Input request or document JSON
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a JSON request or document
    Analyze {
        /// Input request or document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Show how a document would be split into chunks
    Split {
        /// Input request or document JSON
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the chunk plan as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Analyze a plain text file as a one-page document
    Scan {
        /// Input text file
        #[arg(value_name = "TEXT_FILE")]
        input: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Show version information
    Version,
}

#[derive(Args, Debug, Default)]
struct OutputArgs {
    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// Print a text summary instead of JSON
    #[arg(long, conflicts_with = "compact")]
    summary: bool,
}

/// Overrides for the request configuration.
#[derive(Args, Debug, Default)]
struct TuningArgs {
    /// Pages per chunk
    #[arg(long, value_name = "N", env = "PDFSIFT_CHUNK_PAGES")]
    chunk_pages: Option<usize>,

    /// Maximum chunk text size in bytes
    #[arg(long, value_name = "BYTES")]
    max_chunk_bytes: Option<usize>,

    /// Detection window size in characters
    #[arg(long, value_name = "CHARS")]
    window_size: Option<usize>,

    /// Window overlap fraction in [0, 1)
    #[arg(long, value_name = "FRACTION")]
    window_overlap: Option<f64>,

    /// Entropy threshold in bits per character
    #[arg(long, value_name = "BITS")]
    entropy_threshold: Option<f64>,

    /// Number of worker threads
    #[arg(short = 'j', long, value_name = "N", env = "PDFSIFT_CONCURRENCY")]
    concurrency: Option<usize>,

    /// Per-chunk timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Request deadline in milliseconds
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Score at which the document is flagged
    #[arg(long, value_name = "SCORE")]
    threshold: Option<f64>,
}

impl TuningArgs {
    fn apply(&self, mut config: AnalysisConfig) -> AnalysisConfig {
        if let Some(pages) = self.chunk_pages {
            config.chunk_target_pages = pages;
        }
        if let Some(bytes) = self.max_chunk_bytes {
            config.max_chunk_bytes = Some(bytes);
        }
        if let Some(size) = self.window_size {
            config.window_size = size;
        }
        if let Some(overlap) = self.window_overlap {
            config.window_overlap = overlap;
        }
        if let Some(threshold) = self.entropy_threshold {
            config.entropy_threshold = threshold;
        }
        if let Some(workers) = self.concurrency {
            config.max_concurrency = workers;
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_chunk_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.deadline_ms {
            config = config.with_deadline(Duration::from_millis(ms));
        }
        if let Some(threshold) = self.threshold {
            config.suspicion_threshold = threshold;
        }
        config
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Analyze {
            input,
            output,
            tuning,
        }) => cmd_analyze(&input, &output, &tuning),
        Some(Commands::Split {
            input,
            json,
            tuning,
        }) => cmd_split(&input, json, &tuning),
        Some(Commands::Scan {
            input,
            output,
            tuning,
        }) => cmd_scan(&input, &output, &tuning),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: analyze and summarize if input is provided
            if let Some(input) = cli.input {
                let output = OutputArgs {
                    summary: true,
                    ..Default::default()
                };
                cmd_analyze(&input, &output, &TuningArgs::default())
            } else {
                println!("{}", "Usage: pdfsift <FILE>".yellow());
                println!("       pdfsift --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn read_request(input: &Path, tuning: &TuningArgs) -> pdfsift::Result<AnalysisRequest> {
    let mut request = load_request(input)?;
    request.config = tuning.apply(request.config);
    log::debug!(
        "loaded {} with {} pages",
        input.display(),
        request.document.page_count()
    );
    Ok(request)
}

fn cmd_analyze(
    input: &Path,
    output: &OutputArgs,
    tuning: &TuningArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(input, tuning)?;
    let report = run_with_spinner(&request.document, &request.config)?;
    write_report(&report, output)
}

fn cmd_scan(
    input: &Path,
    output: &OutputArgs,
    tuning: &TuningArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let mut document = Document::from_texts([text]);
    document.metadata = Metadata {
        title: input.file_name().map(|n| n.to_string_lossy().into_owned()),
        page_count: Some(1),
        ..Default::default()
    };

    let config = tuning.apply(AnalysisConfig::default());
    let report = run_with_spinner(&document, &config)?;
    write_report(&report, output)
}

fn cmd_split(input: &Path, json: bool, tuning: &TuningArgs) -> Result<(), Box<dyn std::error::Error>> {
    let request = read_request(input, tuning)?;
    request.config.validate()?;
    let chunks = split_document(&request.document, &request.config.chunking())?;

    if json {
        let bounds: Vec<_> = chunks.iter().map(|c| c.bounds()).collect();
        println!("{}", serde_json::to_string_pretty(&bounds)?);
        return Ok(());
    }

    println!("{}", "Chunk Plan".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for chunk in &chunks {
        println!(
            "{} {:>3}: pages {}..{} ({} bytes)",
            "chunk".bold(),
            chunk.index,
            chunk.start_page,
            chunk.end_page,
            chunk.text_len()
        );
    }
    println!(
        "\n{} pages in {} chunks",
        request.document.page_count(),
        chunks.len()
    );

    Ok(())
}

fn run_with_spinner(
    document: &Document,
    config: &AnalysisConfig,
) -> Result<DocumentReport, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Analyzing {} pages...", document.page_count()));

    let result = analyze(document, config);
    pb.finish_and_clear();
    let report = result?;

    if report.is_partial() {
        eprintln!(
            "{} {} of {} chunks could not be analyzed",
            "Warning:".yellow().bold(),
            report.stats.failed_chunks,
            report.stats.chunk_count
        );
    }
    Ok(report)
}

fn write_report(report: &DocumentReport, output: &OutputArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rendered = if output.summary {
        pdfsift::render::to_summary(report)
    } else {
        let format = if output.compact {
            JsonFormat::Compact
        } else {
            JsonFormat::Pretty
        };
        pdfsift::render::to_json(report, format)?
    };

    if let Some(path) = &output.output {
        fs::write(path, &rendered)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", rendered);
    }

    if output.summary || output.output.is_some() {
        let verdict = if report.suspicious {
            "SUSPICIOUS".red().bold()
        } else {
            "clean".green().bold()
        };
        println!(
            "{} {} (score {:.3})",
            "Verdict:".bold(),
            verdict,
            report.document_suspicion_score
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pdfsift".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Encoded payload detection for extracted PDF text");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/pdfsift".dimmed());
    println!("License: MIT");
}
