//! Batch upload orchestration.
//!
//! [`BatchOrchestrator`] takes a set of files and a per-file question count,
//! validates them, and then asks the generation service for cards one file
//! at a time. Files are processed strictly in order and a failing file never
//! stops the batch: its failure is counted and reported, and the next file
//! goes ahead. Only a batch where every file failed is a failure overall.

mod payload;
mod validate;

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::card::Card;
use crate::error::{Error, Result};
use crate::generation::{GenerationRequest, GenerationService};
use crate::notify::{Notification, Notifier};

pub use payload::{decode_data_uri, encode_data_uri, DecodedPayload};
pub use validate::{validate, FieldError, UploadField, UploadLimits, ValidationErrors};

/// Media type given to files with an unrecognized extension.
pub const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Media types the generation service accepts.
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &[
    "application/pdf",
    "text/plain",
    "text/markdown",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// A document submitted for card generation.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// File name shown to the user.
    pub name: String,
    /// Media type of the content.
    pub media_type: String,
    /// Raw content.
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Create a file from in-memory content.
    #[must_use]
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, inferring its media type from the extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path.file_name().map_or_else(
            || path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Ok(Self::new(name, media_type_for_path(path), bytes))
    }

    /// Get the size of the content in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Infer a media type from a file extension.
#[must_use]
pub fn media_type_for_path(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("docx") => {
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        }
        _ => UNKNOWN_MEDIA_TYPE,
    }
}

/// Files plus the number of cards wanted from each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadBatch {
    /// Files in submission order.
    pub files: Vec<UploadFile>,
    /// Cards requested per file.
    pub questions_per_file: u32,
}

impl UploadBatch {
    /// Create a batch.
    #[must_use]
    pub fn new(files: Vec<UploadFile>, questions_per_file: u32) -> Self {
        Self {
            files,
            questions_per_file,
        }
    }
}

/// Which validation profile a submission uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// Exactly one file, higher question limit.
    Single,
    /// Several files, lower question limit.
    #[default]
    Batch,
}

/// A file that produced no cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFailure {
    /// Name of the file.
    pub name: String,
    /// Why it failed.
    pub reason: String,
}

/// What a processed batch produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Generated cards, in file order and then service order.
    pub cards: Vec<Card>,
    /// Number of files that produced cards.
    pub succeeded: usize,
    /// Number of files that did not.
    pub failed: usize,
    /// The failed files, in order.
    pub failures: Vec<FileFailure>,
}

impl BatchReport {
    fn record_success(&mut self, cards: Vec<Card>) {
        self.succeeded += 1;
        self.cards.extend(cards);
    }

    fn record_failure(&mut self, name: &str, reason: String) {
        self.failed += 1;
        self.failures.push(FileFailure {
            name: name.to_string(),
            reason,
        });
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Validation failed; no requests were sent.
    Rejected(ValidationErrors),
    /// At least one file produced cards.
    Completed(BatchReport),
    /// Every file failed.
    Failed(BatchReport),
    /// There was nothing to process.
    NoFiles,
    /// Another submission was still running; nothing was done.
    Busy,
}

impl BatchOutcome {
    /// Get the cards to hand to the caller. Empty unless the batch completed.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        match self {
            Self::Completed(report) => &report.cards,
            _ => &[],
        }
    }

    /// Take the cards to hand to the caller. Empty unless the batch completed.
    #[must_use]
    pub fn into_cards(self) -> Vec<Card> {
        match self {
            Self::Completed(report) => report.cards,
            _ => Vec::new(),
        }
    }

    /// Check if the submission produced cards.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Take the cards, or the reason there are none.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] for a rejected submission and
    /// [`Error::Generation`] when no file produced cards or another
    /// submission was running.
    pub fn into_result(self) -> Result<Vec<Card>> {
        match self {
            Self::Completed(report) => Ok(report.cards),
            Self::Rejected(errors) => Err(Error::Validation(errors)),
            Self::Failed(report) => Err(Error::generation(format!(
                "could not generate cards from any of the {} selected file(s)",
                report.failed
            ))),
            Self::NoFiles => Err(Error::generation("no valid files were provided")),
            Self::Busy => Err(Error::generation("another upload is already in progress")),
        }
    }

    /// Get the processing report, if any file was processed.
    #[must_use]
    pub fn report(&self) -> Option<&BatchReport> {
        match self {
            Self::Completed(report) | Self::Failed(report) => Some(report),
            _ => None,
        }
    }
}

/// Clears the busy flag when a submission ends, however it ends.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Validates uploads and drives card generation for them.
#[derive(Debug)]
pub struct BatchOrchestrator {
    service: Arc<dyn GenerationService>,
    notifier: Arc<dyn Notifier>,
    limits: UploadLimits,
    busy: AtomicBool,
}

impl BatchOrchestrator {
    /// Create an orchestrator with the default limits.
    #[must_use]
    pub fn new(service: Arc<dyn GenerationService>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            service,
            notifier,
            limits: UploadLimits::default(),
            busy: AtomicBool::new(false),
        }
    }

    /// Replace the upload limits.
    #[must_use]
    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Get the upload limits in force.
    #[must_use]
    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Check if a submission is in progress.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Check a submission against the limits without sending anything.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] listing every violated constraint.
    pub fn validate(&self, batch: &UploadBatch, mode: UploadMode) -> Result<()> {
        validate(batch, mode, &self.limits).map_err(Error::Validation)
    }

    /// Validate and process a submission.
    ///
    /// Validation failures send nothing to the service. Otherwise files are
    /// processed one after another; per-file failures are reported and
    /// skipped. A summary notification is emitted at the end. Only one
    /// submission runs at a time; an overlapping call returns
    /// [`BatchOutcome::Busy`] without touching the batch.
    pub async fn submit(&self, batch: UploadBatch, mode: UploadMode) -> BatchOutcome {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Ignoring upload of {} file(s): busy", batch.files.len());
            return BatchOutcome::Busy;
        }
        let _guard = BusyGuard(&self.busy);

        if let Err(errors) = validate(&batch, mode, &self.limits) {
            warn!("Rejected upload: {}", errors);
            let description = match mode {
                UploadMode::Single => "Please check the form for errors.",
                UploadMode::Batch => "Please check the selected files and number of questions.",
            };
            self.notifier
                .notify(Notification::destructive("Invalid Input", description));
            return BatchOutcome::Rejected(errors);
        }

        let report = self.process(&batch).await;
        self.summarize(report)
    }

    /// Ask the service for cards for each file, in order.
    async fn process(&self, batch: &UploadBatch) -> BatchReport {
        let mut report = BatchReport::default();

        for file in &batch.files {
            match self.generate_for(file, batch.questions_per_file).await {
                Ok(cards) => {
                    debug!("Generated {} cards from {}", cards.len(), file.name);
                    report.record_success(cards);
                }
                Err(err) => {
                    let reason = match err {
                        Error::Generation { message } => message,
                        other => other.to_string(),
                    };
                    warn!("Failed to generate cards for {}: {}", file.name, reason);
                    self.notifier.notify(Notification::destructive(
                        format!("Processing Error ({})", file.name),
                        reason.clone(),
                    ));
                    report.record_failure(&file.name, reason);
                }
            }
        }

        report
    }

    async fn generate_for(&self, file: &UploadFile, questions: u32) -> Result<Vec<Card>> {
        let request = GenerationRequest {
            study_material: encode_data_uri(file)?,
            number_of_questions: questions,
        };
        let response = self.service.generate(request).await?;

        let cards = response.question_cards;
        if cards.is_empty() || !cards.iter().all(Card::is_well_formed) {
            return Err(Error::generation("AI failed to generate cards for this file."));
        }
        Ok(cards)
    }

    fn summarize(&self, report: BatchReport) -> BatchOutcome {
        if !report.cards.is_empty() {
            let failed = if report.failed > 0 {
                format!(" {} file(s) failed.", report.failed)
            } else {
                String::new()
            };
            info!(
                "Batch complete: {} cards, {} succeeded, {} failed",
                report.cards.len(),
                report.succeeded,
                report.failed
            );
            self.notifier.notify(Notification::info(
                "Processing Complete!",
                format!(
                    "Generated {} cards from {} file(s).{failed}",
                    report.cards.len(),
                    report.succeeded
                ),
            ));
            BatchOutcome::Completed(report)
        } else if report.failed > 0 && report.succeeded == 0 {
            warn!("Batch failed: all {} files failed", report.failed);
            self.notifier.notify(Notification::destructive(
                "Processing Failed",
                "Could not generate cards from any of the selected files.",
            ));
            BatchOutcome::Failed(report)
        } else {
            self.notifier.notify(Notification::destructive(
                "No Files",
                "No valid files were provided for processing.",
            ));
            BatchOutcome::NoFiles
        }
    }
}
