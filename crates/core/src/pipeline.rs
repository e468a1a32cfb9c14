//! Batch pipeline: read questions, ask each one, write a timestamped copy.
//!
//! Rows are processed strictly in input order, one fully-awaited API call
//! at a time. A row's failure never aborts the run; the output file always
//! contains every input row, answered or not.

use std::future::Future;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, instrument, warn};

use askglean_shared::{AnswerResponse, Result, RunConfig};

use crate::csv_io::{output_path_for, read_records, write_records};

// ---------------------------------------------------------------------------
// Provider port
// ---------------------------------------------------------------------------

/// Source of answers, one question at a time. Implemented by the Glean
/// client and by stubs in tests.
pub trait AnswerProvider {
    /// Ask one question and return its parsed answer artifacts.
    fn ask(&self, question: &str) -> impl Future<Output = Result<AnswerResponse>> + Send;
}

impl AnswerProvider for askglean_client::GleanClient {
    async fn ask(&self, question: &str) -> Result<AnswerResponse> {
        self.chat(question).await
    }
}

// ---------------------------------------------------------------------------
// Run summary
// ---------------------------------------------------------------------------

/// Totals for a completed run.
#[derive(Debug)]
pub struct RunSummary {
    /// Path the records were written to.
    pub output_path: PathBuf,
    /// Number of rows in the input file.
    pub total_rows: usize,
    /// Rows answered in this run.
    pub answered: usize,
    /// Rows whose API call failed; left unchanged in the output.
    pub failed: usize,
    /// Rows skipped because the question field was blank.
    pub skipped_empty: usize,
    /// Rows skipped because they already carried an answer.
    pub skipped_answered: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before each row is handled.
    fn question_started(&self, qid: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn question_started(&self, _qid: &str, _current: usize, _total: usize) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run the full batch.
///
/// 1. Read and validate the input CSV
/// 2. Ask each question in input order, tolerating per-row failures
/// 3. Write every row to a timestamped output file
#[instrument(skip_all, fields(input = %config.questions_csv.display()))]
pub async fn run<P: AnswerProvider>(
    config: &RunConfig,
    provider: &P,
    progress: &dyn ProgressReporter,
) -> Result<RunSummary> {
    let start = Instant::now();
    let started_at = Local::now();

    progress.phase("Reading questions");
    let mut records = read_records(&config.questions_csv)?;
    let total = records.len();
    let output_path = output_path_for(&config.questions_csv, started_at, config.user.as_deref());

    info!(
        input = %config.questions_csv.display(),
        output = %output_path.display(),
        rows = total,
        debug = config.debug,
        "starting question run"
    );

    progress.phase("Asking questions");
    let mut answered = 0usize;
    let mut failed = 0usize;
    let mut skipped_empty = 0usize;
    let mut skipped_answered = 0usize;

    for i in 0..total {
        progress.question_started(&records[i].qid, i + 1, total);

        if records[i].question_is_empty() {
            warn!(qid = %records[i].qid, "empty question, skipping row");
            skipped_empty += 1;
            continue;
        }

        if records[i].has_answer() && !config.reprocess_answered {
            info!(qid = %records[i].qid, "already answered, skipping row");
            skipped_answered += 1;
            continue;
        }

        if config.debug {
            debug!(
                qid = %records[i].qid,
                question = %records[i].question,
                "debug mode: would send chat request"
            );
            continue;
        }

        info!(qid = %records[i].qid, question = %records[i].question, "asking question");

        let result = provider.ask(&records[i].question).await;
        match result {
            Ok(response) => {
                records[i].apply_answer(&response, Local::now());
                answered += 1;

                if config.sync_incremental {
                    debug!(output = %output_path.display(), "syncing output after answer");
                    write_records(&output_path, &records)?;
                }
            }
            Err(e) => {
                warn!(qid = %records[i].qid, error = %e, "question failed, leaving row unanswered");
                failed += 1;
            }
        }

        // Pause between consecutive API calls.
        if config.rate_limit_ms > 0 && i + 1 < total {
            tokio::time::sleep(Duration::from_millis(config.rate_limit_ms)).await;
        }
    }

    progress.phase("Writing output");
    write_records(&output_path, &records)?;

    let summary = RunSummary {
        output_path,
        total_rows: total,
        answered,
        failed,
        skipped_empty,
        skipped_answered,
        elapsed: start.elapsed(),
    };

    progress.done(&summary);

    info!(
        output = %summary.output_path.display(),
        answered,
        failed,
        skipped_empty,
        skipped_answered,
        elapsed_ms = summary.elapsed.as_millis(),
        "run complete"
    );

    Ok(summary)
}
