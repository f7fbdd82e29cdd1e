//! pdfstruct CLI - structural parsing of PDF reports

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdfstruct::render::write_outputs;
use pdfstruct::{
    BatchOptions, BatchProcessor, DocumentParser, FileStatus, ParseOptions, ParsedDocument,
    StyleMatch,
};

#[derive(Parser)]
#[command(name = "pdfstruct")]
#[command(version)]
#[command(about = "Rebuild paragraphs, footnotes and the table of contents of PDF reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse one PDF and write content, meta and preview files
    Parse {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "PDFSTRUCT_OUTPUT", default_value = "parsed")]
        output: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Parse every PDF in a directory
    Batch {
        /// Directory with PDF files
        #[arg(value_name = "INPUT_DIR")]
        input: PathBuf,

        /// Output directory
        #[arg(value_name = "OUTPUT_DIR", env = "PDFSTRUCT_OUTPUT", default_value = "parsed")]
        output: PathBuf,

        /// Keep documents that already have a content file
        #[arg(long, env = "PDFSTRUCT_SKIP_EXISTING")]
        skip_existing: bool,

        /// Seconds allowed per document
        #[arg(long, value_name = "SECS", env = "PDFSTRUCT_TIMEOUT", default_value_t = 120)]
        timeout: u64,

        /// Worker threads (default: one per core)
        #[arg(short = 'j', long, env = "PDFSTRUCT_THREADS")]
        threads: Option<usize>,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Print the table of contents
    Toc {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print entries as JSON Lines
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        parse: ParseArgs,
    },

    /// Show document information and parse statistics
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print parse statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Options shared by every parsing command.
#[derive(Args)]
struct ParseArgs {
    /// Decimal places kept when grouping font sizes
    #[arg(long, value_name = "N", env = "PDFSTRUCT_FONT_SIZE_REMAINDER")]
    font_size_remainder: Option<u32>,

    /// Classify fonts by (size, font name) instead of size alone
    #[arg(long, env = "PDFSTRUCT_GRANULARITY")]
    granularity: bool,

    /// Style agreement required between page numbers: exact, rough or any
    #[arg(long, value_name = "MODE", env = "PDFSTRUCT_STYLE_MATCH", default_value = "any")]
    style_match: StyleMatch,

    /// Skip pages whose content cannot be decoded
    #[arg(long, env = "PDFSTRUCT_LENIENT")]
    lenient: bool,

    /// Match score below which the TOC page is searched (0-100)
    #[arg(long, value_name = "SCORE", env = "PDFSTRUCT_SIMILARITY_CUTOFF")]
    similarity_cutoff: Option<u32>,

    /// Last page searched for a table of contents
    #[arg(long, value_name = "PAGE", env = "PDFSTRUCT_TOC_PAGE_LIMIT")]
    toc_page_limit: Option<usize>,
}

impl ParseArgs {
    fn options(&self) -> ParseOptions {
        let mut options = ParseOptions::new()
            .with_granularity(self.granularity)
            .with_style_match(self.style_match);
        if let Some(places) = self.font_size_remainder {
            options = options.with_font_size_remainder(places);
        }
        if self.lenient {
            options = options.lenient();
        }
        let mut thresholds = options.thresholds.clone();
        if let Some(cutoff) = self.similarity_cutoff {
            thresholds.similarity_cutoff = cutoff.min(100);
        }
        if let Some(limit) = self.toc_page_limit {
            thresholds.toc_page_limit = limit;
        }
        options.with_thresholds(thresholds)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse {
            input,
            output,
            parse,
        } => cmd_parse(&input, &output, parse.options()),
        Commands::Batch {
            input,
            output,
            skip_existing,
            timeout,
            threads,
            parse,
        } => {
            let mut options = BatchOptions::new()
                .with_parse_options(parse.options())
                .with_replace(!skip_existing)
                .with_timeout(Duration::from_secs(timeout));
            if let Some(n) = threads {
                options = options.with_threads(n);
            }
            cmd_batch(&input, &output, options)
        }
        Commands::Toc { input, json, parse } => cmd_toc(&input, json, parse.options()),
        Commands::Info { input, json } => cmd_info(&input, json),
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

fn parse_document(input: &Path, options: ParseOptions) -> Result<ParsedDocument, Box<dyn std::error::Error>> {
    let name = pdfstruct::batch::document_name(input);
    let doc = DocumentParser::open_with_options(input, options)?
        .with_name(name)
        .parse()?;
    Ok(doc)
}

fn cmd_parse(input: &Path, output: &Path, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Parsing {}...", input.display()));

    let doc = parse_document(input, options)?;
    pb.set_message("Writing output...");
    let paths = write_outputs(&doc, output)?;
    pb.finish_and_clear();

    print_stats(&doc);

    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), paths.content.display());
    println!("  {} {}", "├─".dimmed(), paths.meta.display());
    println!("  {} {}", "└─".dimmed(), paths.markdown.display());

    Ok(())
}

fn cmd_batch(input: &Path, output: &Path, options: BatchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let total = BatchProcessor::collect_inputs(input)?.len();
    log::debug!("batch options: {:?}", options);
    println!("{} {} PDF files in {}", "Found".cyan(), total, input.display());

    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let processor = BatchProcessor::new(options);
    let summary = processor.run_with_progress(input, output, |report| {
        pb.set_message(report.file.clone());
        if report.status == FileStatus::Failed || report.status == FileStatus::TimedOut {
            pb.println(format!(
                "{} {}: {}",
                "✗".red(),
                report.file,
                report.error.as_deref().unwrap_or("unknown error")
            ));
        }
        pb.inc(1);
    })?;
    pb.finish_and_clear();

    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Parsed".bold(), summary.parsed.to_string().green());
    println!("{}: {}", "Skipped".bold(), summary.skipped);
    println!("{}: {}", "Failed".bold(), summary.failed.to_string().red());
    println!("{}: {}", "Timed out".bold(), summary.timed_out.to_string().yellow());
    println!("{}: {}", "With TOC".bold(), summary.toc_count);
    println!(
        "{}: {} / {}",
        "Perfect matches".bold(),
        summary.perfect_matches,
        summary.toc_count
    );
    if let Some(accuracy) = summary.accuracy {
        println!("{}: {:.3}", "Mean accuracy".bold(), accuracy);
    }
    println!(
        "\n{} {}",
        "Summary written to".green(),
        output
            .join(pdfstruct::batch::SUMMARY_DIR)
            .join(pdfstruct::batch::SUMMARY_FILE)
            .display()
    );

    Ok(())
}

fn cmd_toc(input: &Path, json: bool, options: ParseOptions) -> Result<(), Box<dyn std::error::Error>> {
    let doc = parse_document(input, options)?;

    if json {
        print!("{}", pdfstruct::render::to_meta_jsonl(&doc)?);
        return Ok(());
    }

    if doc.toc.is_empty() {
        println!("{}", "No table of contents identified".yellow());
        return Ok(());
    }

    for entry in &doc.toc {
        let indent = "  ".repeat(entry.section_level as usize);
        let score = entry
            .toc_match
            .map(|m| format!("[{:>3}]", m.token_sort_ratio))
            .unwrap_or_else(|| "[  -]".to_string());
        println!(
            "{} {}{} {}",
            score.dimmed(),
            indent,
            entry.text,
            format!("p. {}", entry.page_number).cyan()
        );
    }
    println!(
        "\n{}: {:.3}",
        "Accuracy".bold(),
        doc.stats.toc_accuracy
    );

    Ok(())
}

fn cmd_info(input: &Path, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let parser = DocumentParser::open_with_options(input, ParseOptions::new().lenient())?;

    if json {
        let doc = parser.with_name(pdfstruct::batch::document_name(input)).parse()?;
        println!("{}", serde_json::to_string_pretty(&doc.stats)?);
        return Ok(());
    }

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), parser.version());
    println!("{}: {}", "Pages".bold(), parser.page_count());
    println!(
        "{}: {}",
        "Encrypted".bold(),
        if parser.is_encrypted() { "Yes" } else { "No" }
    );
    if let Some(title) = parser.title() {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    let doc = parser.with_name(pdfstruct::batch::document_name(input)).parse()?;
    print_stats(&doc);

    Ok(())
}

fn print_stats(doc: &ParsedDocument) {
    let stats = &doc.stats;
    println!("{}", "Parse Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Spans".bold(), stats.spans);
    println!("{}: {}", "Size tags".bold(), stats.size_tags);
    println!("{}: {}", "Body size".bold(), doc.size_tags.body_size());
    println!("{}: {}", "Page numbers".bold(), stats.page_numbers);
    println!("{}: {}", "Footnotes".bold(), stats.footnotes);
    println!("{}: {}", "Blocks".bold(), stats.blocks);
    println!("{}: {}", "TOC entries".bold(), stats.toc_entries);
    if stats.toc_entries > 0 {
        println!("{}: {:.3}", "TOC accuracy".bold(), stats.toc_accuracy);
    }
}

fn cmd_version() {
    println!("{} {}", "pdfstruct".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Structural parsing of PDF reports");
    println!();
    println!("License: MIT");
}
