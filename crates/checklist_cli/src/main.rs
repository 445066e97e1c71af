//! Command-line front end for checklist notes.
//!
//! # Responsibility
//! - Drive `checklist_core` against a SQLite note database.
//! - Keep output deterministic for scripting and quick local checks.

use checklist_core::{
    default_log_level, init_logging, ChecklistConfig, ChecklistController, ChecklistItem,
    ChecklistItemId, NewNote, NoteId, SqliteNoteRepository,
};
use clap::{Parser, Subcommand};
use log::info;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Debug, Parser)]
#[command(
    name = "checklist_cli",
    about = "Inspect and edit checklist notes",
    version
)]
struct Cli {
    /// JSON file with sort and insertion settings.
    #[arg(long, env = "CHECKLIST_CONFIG")]
    config: Option<PathBuf>,
    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, env = "CHECKLIST_LOG_DIR")]
    log_dir: Option<String>,
    /// SQLite note database.
    db: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a note and print its id. Each line becomes a legacy entry.
    Create {
        title: String,
        lines: Vec<String>,
    },
    /// Print the checklist in display order.
    Show { note_id: NoteId },
    /// Print the stored JSON form.
    Export { note_id: NoteId },
    /// Remove every done item.
    ClearDone { note_id: NoteId },
    /// Add one item per non-blank line of each text.
    Add {
        note_id: NoteId,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Flip the done flag of one item.
    Toggle {
        note_id: NoteId,
        item_id: ChecklistItemId,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = cli.log_dir.as_deref() {
        init_logging(default_log_level(), log_dir)?;
    }
    let repo = Arc::new(SqliteNoteRepository::open(&cli.db)?);

    let note_id = match &cli.command {
        Commands::Create { title, lines } => {
            let note_id = repo.create_note(&NewNote {
                title: title.clone(),
                value: lines.join("\n"),
                ..NewNote::default()
            })?;
            println!("{note_id}");
            return Ok(());
        }
        Commands::Show { note_id }
        | Commands::Export { note_id }
        | Commands::ClearDone { note_id }
        | Commands::Add { note_id, .. }
        | Commands::Toggle { note_id, .. } => *note_id,
    };
    let config = load_config(cli.config.as_deref())?;
    let mut controller = ChecklistController::attach(note_id, repo.clone(), config)?;
    controller.load()?;
    controller.wait_until_idle()?;
    if controller.note().is_none() {
        return Err(format!("note {note_id} not found").into());
    }
    if !controller.is_content_visible() {
        return Err(format!("note {note_id} is locked").into());
    }

    match cli.command {
        Commands::Create { .. } | Commands::Show { .. } => print_items(controller.items()),
        Commands::Export { .. } => println!("{}", controller.serialize()?),
        Commands::ClearDone { .. } => {
            let removed = controller.remove_done()?;
            controller.wait_until_idle()?;
            println!("removed {removed}");
        }
        Commands::Add { texts, .. } => {
            let ids = controller.add_new_items(&texts)?;
            controller.wait_until_idle()?;
            info!("event=cli_add module=cli status=ok note_id={note_id} added={}", ids.len());
            print_items(controller.items());
        }
        Commands::Toggle { item_id, .. } => {
            if !controller.toggle(item_id)? {
                return Err(format!("no item {item_id} in note {note_id}").into());
            }
            controller.wait_until_idle()?;
            print_items(controller.items());
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ChecklistConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(ChecklistConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .map_err(|err| format!("failed to read config `{}`: {err}", path.display()))?;
    Ok(ChecklistConfig::from_json_str(&raw)?)
}

fn print_items(items: &[ChecklistItem]) {
    for item in items {
        let mark = if item.is_done { 'x' } else { ' ' };
        println!("[{mark}] {:>3} {}", item.id, item.title);
    }
}
