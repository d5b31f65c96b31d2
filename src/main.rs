//! Notepush CLI - push notification registration and the notes service.
//!
//! This is the main binary entry point. See the `notepush` library for the
//! core functionality.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use notepush::commands::{self, SimulateOptions};
use notepush::env::Environment;
use notepush::{Config, DeviceProfile, NotesClient, Os, PermissionState};

/// Global allocator configured per M-MIMALLOC-APPS guideline.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// CLI
#[derive(Parser)]
#[command(name = "notepush")]
#[command(version)]
#[command(about = "Push notification registration and notes service client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one notification activation against an in-memory delivery service
    Simulate {
        /// Platform to pretend to run on (android, ios, other); defaults to the host
        #[arg(long)]
        os: Option<Os>,
        /// Pretend to run on a simulator or emulator
        #[arg(long)]
        emulator: bool,
        /// Stored permission before activation (undetermined, granted, denied)
        #[arg(long, default_value = "undetermined")]
        permission: PermissionState,
        /// Answer given if the user is prompted
        #[arg(long, default_value = "granted")]
        prompt_answer: PermissionState,
        /// Project id scoping the token (defaults to the configured one)
        #[arg(long)]
        project_id: Option<String>,
        /// Deliver a foreground notification with this title once subscribed
        #[arg(long)]
        received: Option<String>,
        /// Tap a notification that opens this screen once subscribed
        #[arg(long)]
        screen: Option<String>,
    },
    /// Read and write notes on the notes service
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
    /// Show the effective configuration
    Config,
}

#[derive(Subcommand)]
enum NotesCommand {
    /// List all notes with their comments
    List,
    /// Create a note
    Create {
        /// Author name
        #[arg(long)]
        author: String,
        /// Note text
        #[arg(long)]
        content: String,
        /// Push token to notify the author about comments
        #[arg(long)]
        token: Option<String>,
    },
    /// Comment on a note
    Comment {
        /// Note id
        note_id: String,
        /// Author name
        #[arg(long)]
        author: String,
        /// Comment text
        #[arg(long)]
        content: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let environment = Environment::current();
    let default_filter = if environment.is_development() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    log::debug!("Running in {environment} environment");

    match cli.command {
        Commands::Simulate {
            os,
            emulator,
            permission,
            prompt_answer,
            project_id,
            received,
            screen,
        } => {
            let os = os.unwrap_or_else(|| DeviceProfile::host().os);
            let device = if emulator {
                DeviceProfile::emulator(os)
            } else {
                DeviceProfile::physical(os)
            };
            let report = commands::simulate::run(SimulateOptions {
                device,
                permission,
                prompt_answer,
                project_id: project_id.or(config.project_id),
                received,
                screen,
                foreground: config.foreground,
            })
            .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Notes { command } => {
            let client = NotesClient::new(&config.notes_url, config.request_timeout())
                .context("Failed to set up notes client")?;
            match command {
                NotesCommand::List => commands::notes::list(&client).await?,
                NotesCommand::Create {
                    author,
                    content,
                    token,
                } => commands::notes::create(&client, &author, &content, token.as_deref()).await?,
                NotesCommand::Comment {
                    note_id,
                    author,
                    content,
                } => commands::notes::comment(&client, &note_id, &author, &content).await?,
            }
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
