//! `studybuddy` - CLI for generating and saving flashcards
//!
//! This binary uploads study material to the card generation service and
//! manages the saved-card collection.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use studybuddy::cli::{Cli, Command, ConfigCommand, GenerateCommand, SavedCommand};
use studybuddy::notify::CollectingNotifier;
use studybuddy::review::{self, Reviewable};
use studybuddy::store::ToggleOutcome;
use studybuddy::{
    init_logging, BatchOrchestrator, BatchOutcome, CardStore, Config, HttpGenerationService,
    ReviewSession, SqliteSlot, UploadBatch, UploadFile,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone())?;

    let notifier = Arc::new(CollectingNotifier::new());
    let result = match cli.command {
        Command::Generate(cmd) => handle_generate(&config, &notifier, cmd).await,
        Command::Saved(cmd) => handle_saved(&config, &notifier, cmd),
        Command::Status(cmd) => handle_status(&config, &notifier, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    };

    print_notifications(&notifier);
    result
}

fn print_notifications(notifier: &CollectingNotifier) {
    for notification in notifier.drain() {
        eprintln!("{notification}");
    }
}

fn open_slot(config: &Config) -> anyhow::Result<Arc<SqliteSlot>> {
    let slot = SqliteSlot::open(config.database_path())
        .context("failed to open saved-card database")?
        .with_quota(config.slot_quota());
    Ok(Arc::new(slot))
}

fn load_store(
    config: &Config,
    slot: Arc<SqliteSlot>,
    notifier: &Arc<CollectingNotifier>,
) -> CardStore {
    let store = CardStore::new(slot, notifier.clone(), config.storage.slot_key.clone())
        .with_identity(config.storage.identity);
    store.initialize();
    store
}

async fn handle_generate(
    config: &Config,
    notifier: &Arc<CollectingNotifier>,
    cmd: GenerateCommand,
) -> anyhow::Result<()> {
    let mode = cmd.mode();
    let questions = cmd.questions.unwrap_or(config.upload.default_questions);

    let mut files = Vec::with_capacity(cmd.files.len());
    for path in &cmd.files {
        let file = UploadFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    let service = HttpGenerationService::from_config(config)?;
    let orchestrator = BatchOrchestrator::new(Arc::new(service), notifier.clone())
        .with_limits(config.upload_limits());

    let outcome = orchestrator
        .submit(UploadBatch::new(files, questions), mode)
        .await;

    if let BatchOutcome::Rejected(errors) = &outcome {
        for error in errors {
            eprintln!("  {}", error.message);
        }
    }

    // Anything short of a completed batch exits nonzero
    let cards = outcome.into_result()?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else if !cmd.review {
        for (i, card) in cards.iter().enumerate() {
            println!("{}. {}", i + 1, card.question);
            println!("   {}", card.answer);
        }
    }

    if cmd.save || cmd.review {
        let store = load_store(config, open_slot(config)?, notifier);
        if cmd.save {
            for card in &cards {
                store.add(card.clone())?;
            }
        }
        if cmd.review {
            run_review(ReviewSession::session(cards), &store)?;
        }
    }

    Ok(())
}

fn run_review<T: Reviewable>(
    mut session: ReviewSession<T>,
    store: &CardStore,
) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    review::run(&mut session, store, stdin.lock(), stdout.lock())?;
    Ok(())
}

fn handle_saved(
    config: &Config,
    notifier: &Arc<CollectingNotifier>,
    cmd: SavedCommand,
) -> anyhow::Result<()> {
    let store = load_store(config, open_slot(config)?, notifier);

    match cmd {
        SavedCommand::List { json } => {
            let cards = store.cards();
            if json {
                println!("{}", serde_json::to_string_pretty(&cards)?);
            } else if cards.is_empty() {
                println!("No saved cards.");
            } else {
                for card in &cards {
                    println!("{}", card.id);
                    println!("  Q: {}", card.question);
                    println!("  A: {}", card.answer);
                }
            }
        }
        SavedCommand::Add(card) => {
            store.add(card.into())?;
        }
        SavedCommand::Toggle(card) => match store.toggle(card.into())? {
            ToggleOutcome::Saved => println!("Saved."),
            ToggleOutcome::Removed => println!("Removed."),
        },
        SavedCommand::Remove { id } => {
            if !store.remove(&id)? {
                println!("No saved card with id: {id}");
            }
        }
        SavedCommand::Review => run_review(ReviewSession::deck(store.cards()), &store)?,
    }
    Ok(())
}

fn handle_status(
    config: &Config,
    notifier: &Arc<CollectingNotifier>,
    json: bool,
) -> anyhow::Result<()> {
    let slot = open_slot(config)?;
    let stats = slot.stats()?;
    let store = load_store(config, slot, notifier);

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "slot_key": store.key(),
            "identity": store.identity().to_string(),
            "saved_cards": store.len(),
            "db_size_bytes": stats.db_size_bytes,
            "last_write": stats.last_write,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("studybuddy status");
        println!("-----------------");
        println!("Database:      {}", config.database_path().display());
        println!("Slot key:      {}", store.key());
        println!("Identity:      {}", store.identity());
        println!("Saved cards:   {}", store.len());
        println!("Size:          {} bytes", stats.db_size_bytes);
        match stats.last_write {
            Some(at) => println!("Last write:    {at}"),
            None => println!("Last write:    never"),
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Slot key:           {}", config.storage.slot_key);
                println!("  Slot quota (bytes): {}", config.storage.slot_quota_bytes);
                println!("  Identity:           {}", config.storage.identity);
                println!();
                println!("[Upload]");
                println!("  Max files:          {}", config.upload.max_files);
                println!("  Max file size (MB): {}", config.upload.max_file_size_mb);
                println!("  Max total (MB):     {}", config.upload.max_total_size_mb);
                println!(
                    "  Max questions:      {} (batch), {} (single)",
                    config.upload.batch_max_questions, config.upload.single_max_questions
                );
                println!("  Default questions:  {}", config.upload.default_questions);
                println!();
                println!("[Generation]");
                println!(
                    "  Endpoint:           {}",
                    config.generation.endpoint.as_deref().unwrap_or("(not set)")
                );
                println!(
                    "  API key:            {}",
                    if config.generation.api_key.is_some() {
                        "(set)"
                    } else {
                        "(not set)"
                    }
                );
                println!("  Timeout (secs):     {}", config.generation.timeout_secs);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
