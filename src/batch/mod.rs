// Batch runner
// Watermarks a list of images one after another, recording a result per image

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use crate::output::OutputPolicy;
use crate::watermark::{WatermarkProcessor, WatermarkSpec};

/// Result of one image in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Saved { input: PathBuf, output: PathBuf },
    Failed { input: PathBuf, message: String },
}

impl ItemOutcome {
    pub fn input(&self) -> &Path {
        match self {
            ItemOutcome::Saved { input, .. } | ItemOutcome::Failed { input, .. } => input,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ItemOutcome::Saved { .. })
    }
}

/// Summary of a finished (or cancelled) batch
#[derive(Debug, Default, Clone)]
pub struct BatchReport {
    pub succeeded: Vec<ItemOutcome>,
    pub failed: Vec<ItemOutcome>,
    /// True when the cancel flag stopped the batch early
    pub cancelled: bool,
}

impl BatchReport {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    pub fn processed(&self) -> usize {
        self.success_count() + self.failure_count()
    }
}

type ProgressCallback<'a> = Box<dyn FnMut(usize, usize, &ItemOutcome) + 'a>;

/// Sequential batch over `(path, date)` pairs
///
/// A failure is recorded against its image and the batch moves on. The cancel
/// flag is checked before each image, never in the middle of one.
pub struct BatchRunner<'a> {
    processor: &'a WatermarkProcessor,
    spec: &'a WatermarkSpec,
    policy: &'a OutputPolicy,
    output_dir: PathBuf,
    cancel: Arc<AtomicBool>,
    progress: Option<ProgressCallback<'a>>,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        processor: &'a WatermarkProcessor,
        spec: &'a WatermarkSpec,
        policy: &'a OutputPolicy,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            processor,
            spec,
            policy,
            output_dir: output_dir.into(),
            cancel: Arc::new(AtomicBool::new(false)),
            progress: None,
        }
    }

    /// Share an externally owned cancel flag, e.g. one set by a signal handler.
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// Called after every image with `(index, total, outcome)`, index starting at 1.
    pub fn on_progress(mut self, callback: impl FnMut(usize, usize, &ItemOutcome) + 'a) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn run(&mut self, items: &[(PathBuf, String)]) -> BatchReport {
        let total = items.len();
        let mut report = BatchReport::default();

        for (index, (path, date)) in items.iter().enumerate() {
            if self.cancel.load(Ordering::Relaxed) {
                info!(
                    processed = report.processed(),
                    remaining = total - index,
                    "Batch cancelled"
                );
                report.cancelled = true;
                break;
            }

            let outcome = match self.processor.process_single_image(
                path,
                date,
                &self.output_dir,
                self.spec,
                self.policy,
            ) {
                Ok(output) => ItemOutcome::Saved {
                    input: path.clone(),
                    output,
                },
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to watermark image");
                    ItemOutcome::Failed {
                        input: path.clone(),
                        message: e.to_string(),
                    }
                }
            };

            if let Some(progress) = self.progress.as_mut() {
                progress(index + 1, total, &outcome);
            }

            if outcome.is_success() {
                report.succeeded.push(outcome);
            } else {
                report.failed.push(outcome);
            }
        }

        info!(
            succeeded = report.success_count(),
            failed = report.failure_count(),
            cancelled = report.cancelled,
            "Batch finished"
        );
        report
    }
}
