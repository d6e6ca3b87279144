//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::card::Card;
use crate::upload::UploadMode;

/// Generate command arguments.
#[derive(Debug, Args)]
pub struct GenerateCommand {
    /// Study material to generate cards from (PDF, TXT, MD or DOCX)
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Number of cards to generate per file
    #[arg(short = 'n', long, value_name = "N")]
    pub questions: Option<u32>,

    /// Single-file mode (allows more cards per file)
    #[arg(long)]
    pub single: bool,

    /// Save every generated card
    #[arg(long)]
    pub save: bool,

    /// Output as JSON
    #[arg(short, long, conflicts_with = "review")]
    pub json: bool,

    /// Review the generated cards one at a time
    #[arg(short, long)]
    pub review: bool,
}

impl GenerateCommand {
    /// Get the upload mode selected by the flags.
    #[must_use]
    pub fn mode(&self) -> UploadMode {
        if self.single {
            UploadMode::Single
        } else {
            UploadMode::Batch
        }
    }
}

/// A card given on the command line.
#[derive(Debug, Clone, Args)]
pub struct CardArgs {
    /// Question text
    #[arg(short = 'Q', long)]
    pub question: String,

    /// Answer text
    #[arg(short, long)]
    pub answer: String,
}

impl From<CardArgs> for Card {
    fn from(args: CardArgs) -> Self {
        Card::new(args.question, args.answer)
    }
}

/// Saved card commands.
#[derive(Debug, Subcommand)]
pub enum SavedCommand {
    /// List saved cards
    List {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Save a card
    Add(CardArgs),

    /// Save a card, or remove it if already saved
    Toggle(CardArgs),

    /// Remove a saved card by id
    Remove {
        /// Id of the card to remove
        id: String,
    },

    /// Step through saved cards one at a time
    Review,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_mode() {
        let mut cmd = GenerateCommand {
            files: vec![PathBuf::from("notes.md")],
            questions: None,
            single: false,
            save: false,
            json: false,
            review: false,
        };
        assert_eq!(cmd.mode(), UploadMode::Batch);

        cmd.single = true;
        assert_eq!(cmd.mode(), UploadMode::Single);
    }

    #[test]
    fn test_card_args_conversion() {
        let args = CardArgs {
            question: "What is a lifetime?".to_string(),
            answer: "A region of code".to_string(),
        };
        assert_eq!(
            Card::from(args),
            Card::new("What is a lifetime?", "A region of code")
        );
    }

    #[test]
    fn test_status_command_debug() {
        let cmd = StatusCommand { json: true };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("json"));
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
