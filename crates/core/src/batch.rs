//! File level processing.
//! This module wires SRT reading, the retiming engine and output writing,
//! and runs independent files side by side for batch jobs.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tracing::{info, trace, warn};

use crate::engine::{Engine, ProcessReport, RetimeConfig};
use crate::srt::{self, Extraction, SkippedBlock};

/// Outcome of processing one file successfully.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub skipped: Vec<SkippedBlock>,
    pub report: ProcessReport,
}

/// Per-file result of a batch run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Done(FileReport),
    Failed { input: PathBuf, error: String },
}

/// Results of [`process_files`] in the order the inputs were given.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub files: Vec<FileOutcome>,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f, FileOutcome::Failed { .. }))
            .count()
    }

    pub fn succeeded(&self) -> usize {
        self.files.len() - self.failed()
    }
}

/// Where the processed copy of `input` is written inside `out_dir`.
pub fn output_path_for(input: &Path, out_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    out_dir.join(format!("{stem}_processed.srt"))
}

/// Read `input`, retime and reflow its cues, and write them to `output`.
pub fn process_file(input: &Path, output: &Path, engine: &Engine) -> Result<FileReport> {
    trace!(
        "process_file input={} output={}",
        input.display(),
        output.display()
    );
    let content = fs::read_to_string(input)
        .with_context(|| format!("failed reading {}", input.display()))?;
    let Extraction { cues, skipped } = srt::parse(&content);
    for s in &skipped {
        warn!(
            file = %input.display(),
            block = s.block,
            reason = %s.reason,
            "skipped malformed block"
        );
    }
    let (cues, report) = engine.process_with_report(cues);
    fs::write(output, srt::format(&cues))
        .with_context(|| format!("failed writing {}", output.display()))?;
    info!("wrote {}", output.display());
    Ok(FileReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        skipped,
        report,
    })
}

/// Process every file in `inputs` into `out_dir`, at most `jobs` at a time.
///
/// The configuration is validated once up front. Each file gets its own
/// blocking task and shares nothing but the immutable engine. A failing
/// file is recorded and the rest of the batch carries on.
pub async fn process_files(
    inputs: Vec<PathBuf>,
    out_dir: &Path,
    config: RetimeConfig,
    jobs: usize,
) -> Result<BatchSummary> {
    trace!(
        "process_files count={} out_dir={} jobs={}",
        inputs.len(),
        out_dir.display(),
        jobs
    );
    let engine = Engine::new(config)?;
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed creating {}", out_dir.display()))?;

    let total = inputs.len();
    let limit = Arc::new(Semaphore::new(jobs.max(1)));
    let (tx, mut rx) = mpsc::channel(total.max(1));
    for (pos, input) in inputs.iter().enumerate() {
        spawn_file(
            pos,
            input.clone(),
            out_dir.to_path_buf(),
            engine.clone(),
            limit.clone(),
            tx.clone(),
        );
    }
    drop(tx);

    let mut slots: Vec<Option<FileOutcome>> = vec![None; total];
    let mut done = 0;
    while let Some((pos, outcome)) = rx.recv().await {
        done += 1;
        if let FileOutcome::Failed { input, error } = &outcome {
            warn!("failed to process {}: {}", input.display(), error);
        }
        info!("processed {done}/{total} files ({}%)", done * 100 / total);
        slots[pos] = Some(outcome);
    }

    let files = slots
        .into_iter()
        .zip(inputs)
        .map(|(slot, input)| {
            slot.unwrap_or_else(|| FileOutcome::Failed {
                input,
                error: "job ended without reporting".to_string(),
            })
        })
        .collect();
    Ok(BatchSummary { files })
}

/// Spawn the job for one file and send its outcome back to the collector.
fn spawn_file(
    pos: usize,
    input: PathBuf,
    out_dir: PathBuf,
    engine: Engine,
    limit: Arc<Semaphore>,
    tx: mpsc::Sender<(usize, FileOutcome)>,
) {
    tokio::spawn(async move {
        let outcome = match limit.acquire_owned().await {
            Ok(_permit) => {
                let output = output_path_for(&input, &out_dir);
                let job_input = input.clone();
                let res = tokio::task::spawn_blocking(move || {
                    process_file(&job_input, &output, &engine)
                })
                .await;
                match res {
                    Ok(Ok(report)) => FileOutcome::Done(report),
                    Ok(Err(err)) => FileOutcome::Failed {
                        input,
                        error: format!("{err:#}"),
                    },
                    Err(err) => FileOutcome::Failed {
                        input,
                        error: err.to_string(),
                    },
                }
            }
            Err(err) => FileOutcome::Failed {
                input,
                error: err.to_string(),
            },
        };
        let _ = tx.send((pos, outcome)).await;
    });
}
