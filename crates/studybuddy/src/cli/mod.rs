//! Command-line interface for studybuddy.
//!
//! This module provides the CLI structure for the `studybuddy` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{CardArgs, ConfigCommand, GenerateCommand, SavedCommand, StatusCommand};

/// studybuddy - Turn study material into flashcards
///
/// Uploads documents to a card generation service and keeps the cards you
/// want to review again.
#[derive(Debug, Parser)]
#[command(name = "studybuddy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate cards from study material
    Generate(GenerateCommand),

    /// Manage saved cards
    #[command(subcommand)]
    Saved(SavedCommand),

    /// Show storage status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::Verbosity;
    use clap::CommandFactory;

    fn cli_with(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        let cli = Cli::command();
        assert_eq!(cli.get_name(), "studybuddy");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(cli_with(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli_with(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli_with(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli_with(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let args = vec![
            "studybuddy",
            "generate",
            "a.pdf",
            "b.md",
            "-n",
            "5",
            "--save",
        ];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(cmd.files, vec![PathBuf::from("a.pdf"), PathBuf::from("b.md")]);
        assert_eq!(cmd.questions, Some(5));
        assert!(cmd.save);
        assert!(!cmd.single);
        assert!(!cmd.json);
        assert!(!cmd.review);
    }

    #[test]
    fn test_parse_generate_review() {
        let cli = Cli::try_parse_from(["studybuddy", "generate", "a.pdf", "-r"]).unwrap();
        let Command::Generate(cmd) = cli.command else {
            panic!("expected generate");
        };
        assert!(cmd.review);

        let args = ["studybuddy", "generate", "a.pdf", "--review", "--json"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_saved_review() {
        let cli = Cli::try_parse_from(["studybuddy", "saved", "review"]).unwrap();
        assert!(matches!(cli.command, Command::Saved(SavedCommand::Review)));
    }

    #[test]
    fn test_parse_generate_requires_files() {
        assert!(Cli::try_parse_from(["studybuddy", "generate"]).is_err());
    }

    #[test]
    fn test_parse_saved_list() {
        let cli = Cli::try_parse_from(["studybuddy", "saved", "list", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Saved(SavedCommand::List { json: true })
        ));
    }

    #[test]
    fn test_parse_saved_add() {
        let args = ["studybuddy", "saved", "add", "-Q", "What?", "-a", "That."];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Saved(SavedCommand::Add(card)) = cli.command else {
            panic!("expected saved add");
        };
        assert_eq!(card.question, "What?");
        assert_eq!(card.answer, "That.");
    }

    #[test]
    fn test_parse_saved_toggle_requires_answer() {
        let args = ["studybuddy", "saved", "toggle", "-Q", "What?"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_parse_saved_remove() {
        let cli = Cli::try_parse_from(["studybuddy", "saved", "remove", "What?"]).unwrap();
        let Command::Saved(SavedCommand::Remove { id }) = cli.command else {
            panic!("expected saved remove");
        };
        assert_eq!(id, "What?");
    }

    #[test]
    fn test_parse_status() {
        let cli = Cli::try_parse_from(["studybuddy", "status"]).unwrap();
        assert!(matches!(cli.command, Command::Status(_)));
    }

    #[test]
    fn test_parse_config_validate() {
        let args = ["studybuddy", "config", "validate", "--file", "/tmp/sb.toml"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Config(ConfigCommand::Validate { file }) = cli.command else {
            panic!("expected config validate");
        };
        assert_eq!(file, Some(PathBuf::from("/tmp/sb.toml")));
    }

    #[test]
    fn test_parse_with_config() {
        let args = vec!["studybuddy", "-c", "/custom/config.toml", "status"];
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_with_verbose() {
        let cli = Cli::try_parse_from(vec!["studybuddy", "-v", "status"]).unwrap();
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_parse_with_quiet() {
        let cli = Cli::try_parse_from(vec!["studybuddy", "-q", "status"]).unwrap();
        assert!(cli.quiet);
    }
}
