//! Upload validation.
//!
//! Every constraint is checked and every violation reported, so the user
//! sees all problems with a submission at once. Nothing here touches the
//! network.

use super::{UploadBatch, UploadMode, SUPPORTED_MEDIA_TYPES};

const MB: u64 = 1024 * 1024;

/// Size and count limits applied to an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    /// Maximum number of files in one batch.
    pub max_files: usize,
    /// Maximum size of one file, in bytes.
    pub max_file_size: u64,
    /// Maximum combined size of a batch, in bytes.
    pub max_total_size: u64,
    /// Upper bound on questions per file in batch mode.
    pub batch_max_questions: u32,
    /// Upper bound on questions for a single-file upload.
    pub single_max_questions: u32,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 5 * MB,
            max_total_size: 50 * MB,
            batch_max_questions: 10,
            single_max_questions: 20,
        }
    }
}

impl UploadLimits {
    /// Get the question limit for the given mode.
    #[must_use]
    pub fn max_questions(&self, mode: UploadMode) -> u32 {
        match mode {
            UploadMode::Single => self.single_max_questions,
            UploadMode::Batch => self.batch_max_questions,
        }
    }
}

/// The part of an upload a validation error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadField {
    /// The file selection as a whole.
    Files,
    /// One file, by position in the batch.
    File(usize),
    /// The requested number of questions.
    NumberOfQuestions,
}

impl std::fmt::Display for UploadField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Files => write!(f, "files"),
            Self::File(index) => write!(f, "files[{index}]"),
            Self::NumberOfQuestions => write!(f, "numberOfQuestions"),
        }
    }
}

/// A single violated constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Where the problem is.
    pub field: UploadField,
    /// What the user should fix.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    #[must_use]
    pub fn new(field: UploadField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint an upload violated, in check order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// Get the number of violations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no violations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the violations.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// Get the messages recorded against one field.
    #[must_use]
    pub fn for_field(&self, field: UploadField) -> Vec<&str> {
        self.0
            .iter()
            .filter(|e| e.field == field)
            .map(|e| e.message.as_str())
            .collect()
    }

    fn push(&mut self, field: UploadField, message: impl Into<String>) {
        self.0.push(FieldError::new(field, message));
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Check a batch against `limits` for the given mode.
///
/// # Errors
///
/// Returns every violated constraint if the batch is not acceptable.
pub fn validate(
    batch: &UploadBatch,
    mode: UploadMode,
    limits: &UploadLimits,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    let count = batch.files.len();

    match mode {
        UploadMode::Single if count != 1 => {
            errors.push(UploadField::Files, "Please upload exactly one file.");
        }
        UploadMode::Batch if count == 0 => {
            errors.push(UploadField::Files, "Please select at least one file.");
        }
        UploadMode::Batch if count > limits.max_files => {
            errors.push(
                UploadField::Files,
                format!("You can select a maximum of {} files.", limits.max_files),
            );
        }
        _ => {}
    }

    let total: u64 = batch.files.iter().map(super::UploadFile::size).sum();
    if total > limits.max_total_size {
        errors.push(
            UploadField::Files,
            format!(
                "Total size of all files cannot exceed {}MB.",
                limits.max_total_size / MB
            ),
        );
    }

    for (index, file) in batch.files.iter().enumerate() {
        if file.size() > limits.max_file_size {
            errors.push(
                UploadField::File(index),
                format!(
                    "{}: Max file size is {}MB.",
                    file.name,
                    limits.max_file_size / MB
                ),
            );
        }
        if !SUPPORTED_MEDIA_TYPES.contains(&file.media_type.as_str()) {
            errors.push(
                UploadField::File(index),
                format!(
                    "{}: Unsupported file type. Please upload PDF, TXT, MD, or DOCX.",
                    file.name
                ),
            );
        }
    }

    let max_questions = limits.max_questions(mode);
    if batch.questions_per_file < 1 {
        let message = match mode {
            UploadMode::Single => "Must generate at least 1 question.",
            UploadMode::Batch => "Must generate at least 1 question per file.",
        };
        errors.push(UploadField::NumberOfQuestions, message);
    } else if batch.questions_per_file > max_questions {
        let message = match mode {
            UploadMode::Single => {
                format!("Cannot generate more than {max_questions} questions per file.")
            }
            UploadMode::Batch => format!(
                "Cannot generate more than {max_questions} questions per file in batch mode."
            ),
        };
        errors.push(UploadField::NumberOfQuestions, message);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
