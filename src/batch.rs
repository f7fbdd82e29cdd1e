//! Directory batch processing.
//!
//! Every PDF in the input directory is parsed on the rayon pool. Each
//! document runs on its own worker thread under a wall-clock budget, so one
//! pathological file cannot stall the batch. Results are collected into a
//! summary written to `summary/parsing_results.json`.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::RecvTimeoutError;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, Stage};
use crate::model::DocumentStats;
use crate::parser::{DocumentParser, ParseOptions};
use crate::render::{write_outputs, OutputPaths};

/// Default wall-clock budget per document.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Summary directory inside the output directory.
pub const SUMMARY_DIR: &str = "summary";

/// Summary file name inside [`SUMMARY_DIR`].
pub const SUMMARY_FILE: &str = "parsing_results.json";

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Options passed to every document parse
    pub parse: ParseOptions,

    /// Re-parse documents that already have a content file
    pub replace: bool,

    /// Wall-clock budget per document
    pub timeout: Duration,

    /// Worker threads; `None` uses the global rayon pool
    pub threads: Option<usize>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            parse: ParseOptions::default(),
            replace: true,
            timeout: DEFAULT_TIMEOUT,
            threads: None,
        }
    }
}

impl BatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Skip documents whose content file already exists when `replace` is false.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads.max(1));
        self
    }
}

/// Outcome of one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Ok,
    Failed,
    TimedOut,
    Skipped,
}

/// Per-file entry of the batch summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stats: Option<DocumentStats>,
    /// Mean TOC match score; absent without a TOC
    pub accuracy_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub elapsed_ms: u64,
}

impl FileReport {
    fn new(file: &str, status: FileStatus, elapsed: Duration) -> Self {
        Self {
            file: file.to_string(),
            status,
            stats: None,
            accuracy_score: None,
            error: None,
            stage: None,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }

    fn failed(file: &str, err: &Error, elapsed: Duration) -> Self {
        let status = match err.root() {
            Error::Timeout(_) => FileStatus::TimedOut,
            _ => FileStatus::Failed,
        };
        Self {
            error: Some(err.root().to_string()),
            stage: err.stage().map(|s| s.to_string()),
            ..Self::new(file, status, elapsed)
        }
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Reports keyed by file name
    pub files: BTreeMap<String, FileReport>,
    pub parsed: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub skipped: usize,
    /// Documents with a non-empty TOC
    pub toc_count: usize,
    /// Documents whose TOC matched perfectly
    pub perfect_matches: usize,
    /// Mean accuracy over documents with a TOC
    pub accuracy: Option<f64>,
}

impl BatchSummary {
    fn from_reports(reports: Vec<FileReport>, started_at: DateTime<Utc>) -> Self {
        let count = |status| reports.iter().filter(|r| r.status == status).count();
        let scores: Vec<f64> = reports.iter().filter_map(|r| r.accuracy_score).collect();
        let accuracy = (!scores.is_empty()).then(|| scores.iter().sum::<f64>() / scores.len() as f64);

        Self {
            started_at,
            finished_at: Utc::now(),
            parsed: count(FileStatus::Ok),
            failed: count(FileStatus::Failed),
            timed_out: count(FileStatus::TimedOut),
            skipped: count(FileStatus::Skipped),
            toc_count: scores.len(),
            perfect_matches: scores.iter().filter(|&&s| s >= 1.0).count(),
            accuracy,
            files: reports.into_iter().map(|r| (r.file.clone(), r)).collect(),
        }
    }

    pub fn total(&self) -> usize {
        self.files.len()
    }
}

/// Parses a directory of PDFs.
pub struct BatchProcessor {
    options: BatchOptions,
}

impl BatchProcessor {
    pub fn new(options: BatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// PDF files directly inside `dir`, sorted by name.
    pub fn collect_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_pdf_extension(p))
            .collect();
        files.sort();
        Ok(files)
    }

    /// Parse every PDF in `input_dir` into `output_dir` and write the summary.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchSummary> {
        self.run_with_progress(input_dir, output_dir, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_done` as each document finishes.
    pub fn run_with_progress<F>(&self, input_dir: &Path, output_dir: &Path, on_done: F) -> Result<BatchSummary>
    where
        F: Fn(&FileReport) + Sync,
    {
        let started_at = Utc::now();
        let inputs = Self::collect_inputs(input_dir)?;
        fs::create_dir_all(output_dir.join(SUMMARY_DIR))?;
        log::info!("{} documents in {}", inputs.len(), input_dir.display());

        let work = || -> Vec<FileReport> {
            inputs
                .par_iter()
                .map(|path| {
                    let report = self.process_file(path, output_dir);
                    on_done(&report);
                    report
                })
                .collect()
        };
        let reports = match self.options.threads {
            Some(n) => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| Error::Io(io::Error::other(e.to_string())))?
                .install(work),
            None => work(),
        };

        let summary = BatchSummary::from_reports(reports, started_at);
        write_summary(&summary, output_dir)?;
        log::info!(
            "batch done: {} parsed, {} failed, {} timed out, {} skipped",
            summary.parsed,
            summary.failed,
            summary.timed_out,
            summary.skipped
        );
        Ok(summary)
    }

    /// Parse one document under the time budget. Never fails: errors end up
    /// in the report.
    pub fn process_file(&self, path: &Path, output_dir: &Path) -> FileReport {
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = document_name(path);
        let start = Instant::now();

        if !self.options.replace && OutputPaths::new(output_dir, &name).content.exists() {
            log::info!("{}: already parsed", file);
            return FileReport::new(&file, FileStatus::Skipped, start.elapsed());
        }

        match self.parse_with_timeout(path, output_dir) {
            Ok(stats) => {
                let accuracy_score = (stats.toc_entries > 0).then_some(stats.toc_accuracy);
                FileReport {
                    stats: Some(stats),
                    accuracy_score,
                    ..FileReport::new(&file, FileStatus::Ok, start.elapsed())
                }
            }
            Err(e) => {
                match e.stage() {
                    Some(stage) => log::error!("{}: {} stage failed: {}", file, stage, e.root()),
                    None => log::error!("{}: {}", file, e),
                }
                FileReport::failed(&file, &e, start.elapsed())
            }
        }
    }

    /// Run the parse on a dedicated thread and wait at most `timeout`.
    ///
    /// A document that runs over is abandoned; its thread finishes in the
    /// background and its result is dropped.
    fn parse_with_timeout(&self, path: &Path, output_dir: &Path) -> Result<DocumentStats> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let path_buf = path.to_path_buf();
        let out = output_dir.to_path_buf();
        let options = self.options.parse.clone();

        thread::Builder::new()
            .name(format!("parse-{}", document_name(path)))
            .spawn(move || {
                let _ = tx.send(parse_and_write(&path_buf, &out, options));
            })?;

        match rx.recv_timeout(self.options.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout(self.options.timeout.as_secs())),
            Err(RecvTimeoutError::Disconnected) => Err(Error::DocumentOpen(
                "parser thread exited without a result".to_string(),
            )
            .at(Stage::Extract)),
        }
    }
}

fn parse_and_write(path: &Path, output_dir: &Path, options: ParseOptions) -> Result<DocumentStats> {
    let doc = DocumentParser::open_with_options(path, options)?
        .with_name(document_name(path))
        .parse()?;
    write_outputs(&doc, output_dir)?;
    Ok(doc.stats)
}

/// Output name of a document: its file name up to the first dot.
pub fn document_name(path: &Path) -> String {
    let file = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    file.split('.').next().unwrap_or_default().to_string()
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn write_summary(summary: &BatchSummary, output_dir: &Path) -> Result<()> {
    let path = output_dir.join(SUMMARY_DIR).join(SUMMARY_FILE);
    let file = fs::File::create(&path).map_err(|e| Error::from(e).at(Stage::Write))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary).map_err(|e| Error::from(e).at(Stage::Write))
}
