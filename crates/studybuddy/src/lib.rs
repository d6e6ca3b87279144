//! `studybuddy` - Turn study material into flashcards
//!
//! This library provides the saved-card store, which keeps the user's chosen
//! cards in a durable slot, and the batch upload orchestrator, which turns
//! uploaded documents into cards through an external generation service.
//! Cards are reviewed one at a time through a review session.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod card;
pub mod cli;
pub mod config;
pub mod error;
pub mod generation;
pub mod logging;
pub mod notify;
pub mod review;
pub mod storage;
pub mod store;
pub mod upload;

pub use card::{Card, CardIdentity, SavedCard};
pub use config::Config;
pub use error::{Error, Result};
pub use generation::{GenerationRequest, GenerationResponse, GenerationService, HttpGenerationService};
pub use logging::init_logging;
pub use notify::{Notification, Notifier};
pub use review::{ReviewAction, ReviewSession};
pub use storage::{DurableSlot, MemorySlot, SlotStats, SqliteSlot};
pub use store::{AddOutcome, CardStore, ToggleOutcome};
pub use upload::{
    BatchOrchestrator, BatchOutcome, BatchReport, UploadBatch, UploadFile, UploadLimits,
    UploadMode, ValidationErrors,
};
