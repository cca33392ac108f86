//! Tandem CLI
//!
//! Command-line interface for Tandem - shared task lists with invite codes.

use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tandem_core::{
    ChangePropagator, Config, HttpRemote, ListRepository, LocalStore, ProfileManager, RemoteStore,
    ShareCoordinator, SyncEngine,
};

mod commands;

#[derive(Parser)]
#[command(name = "tandem")]
#[command(about = "Tandem - shared task lists with invite codes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage lists
    List {
        #[command(subcommand)]
        command: ListCommands,
    },
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },
    /// Share a list, generating an invite code
    Share {
        /// List name or id prefix
        list: String,
    },
    /// Join a shared list with an invite code
    Join {
        /// 6-character invite code
        code: String,
    },
    /// Refresh every shared list from the remote store
    Sync,
    /// Show profile and list overview
    Status,
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create the profile (onboarding)
    Create {
        /// Nickname, 2-20 characters
        nickname: String,
    },
    /// Show the current profile
    Show,
    /// Change the nickname
    Nickname {
        /// New nickname, 2-20 characters
        nickname: String,
    },
    /// Clear the profile
    Logout,
}

#[derive(Subcommand)]
enum ListCommands {
    /// Create a new list
    #[command(alias = "add")]
    Create {
        /// List name
        name: String,
        /// Display color (hex)
        #[arg(short, long, default_value = "7161EF")]
        color: String,
    },
    /// Show all lists
    #[command(alias = "ls")]
    List,
    /// Show one list with its tasks
    Show {
        /// List name or id prefix
        list: String,
    },
    /// Rename or recolor a list
    Rename {
        /// List name or id prefix
        list: String,
        /// New name
        name: String,
        /// New display color (hex)
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a list
    #[command(alias = "rm")]
    Delete {
        /// List name or id prefix
        list: String,
    },
    /// Remove a participant from a shared list
    Kick {
        /// List name or id prefix
        list: String,
        /// Participant id
        participant: String,
    },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task to a list
    Add {
        /// List name or id prefix
        list: String,
        /// Task text
        text: String,
    },
    /// Toggle a task's completion
    Toggle {
        /// List name or id prefix
        list: String,
        /// Task text or id prefix
        task: String,
    },
    /// Edit a task's text
    Edit {
        /// List name or id prefix
        list: String,
        /// Task text or id prefix
        task: String,
        /// New text
        text: String,
    },
    /// Delete a task
    #[command(alias = "rm")]
    Delete {
        /// List name or id prefix
        list: String,
        /// Task text or id prefix
        task: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let mut repo = ListRepository::open(LocalStore::new(config.clone()))?;
    let mut profiles = ProfileManager::open(LocalStore::new(config.clone()))?;

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Create { nickname } => commands::profile::create(&mut profiles, &nickname),
            ProfileCommands::Show => commands::profile::show(&profiles),
            ProfileCommands::Nickname { nickname } => {
                commands::profile::rename(&mut profiles, &nickname)
            }
            ProfileCommands::Logout => commands::profile::logout(&mut profiles),
        },
        Commands::List { command } => match command {
            ListCommands::Create { name, color } => {
                commands::list::create(&mut repo, &name, &color)
            }
            ListCommands::List => commands::list::list(&repo),
            ListCommands::Show { list } => commands::list::show(&repo, &list),
            ListCommands::Rename { list, name, color } => {
                let propagator = propagator(&config)?;
                let result =
                    commands::list::rename(&mut repo, &propagator, &list, &name, color.as_deref());
                flush(&propagator).await;
                result
            }
            ListCommands::Delete { list } => commands::list::delete(&mut repo, &list),
            ListCommands::Kick { list, participant } => {
                let propagator = propagator(&config)?;
                let result = commands::list::kick(&mut repo, &propagator, &list, &participant);
                flush(&propagator).await;
                result
            }
        },
        Commands::Task { command } => {
            let propagator = propagator(&config)?;
            let result = match command {
                TaskCommands::Add { list, text } => {
                    commands::task::add(&mut repo, &propagator, &list, &text)
                }
                TaskCommands::Toggle { list, task } => {
                    commands::task::toggle(&mut repo, &profiles, &propagator, &list, &task)
                }
                TaskCommands::Edit { list, task, text } => {
                    commands::task::edit(&mut repo, &propagator, &list, &task, &text)
                }
                TaskCommands::Delete { list, task } => {
                    commands::task::delete(&mut repo, &propagator, &list, &task)
                }
            };
            flush(&propagator).await;
            result
        }
        Commands::Share { list } => {
            let coordinator = ShareCoordinator::new(remote(&config)?);
            commands::share::publish(&mut repo, &profiles, &coordinator, &list).await
        }
        Commands::Join { code } => {
            let coordinator = ShareCoordinator::new(remote(&config)?);
            commands::share::join(&mut repo, &profiles, &coordinator, &code).await
        }
        Commands::Sync => {
            let engine = SyncEngine::new(remote(&config)?);
            commands::sync::refresh(&mut repo, &engine).await
        }
        Commands::Status => commands::status::show(&repo, &profiles),
    }
}

/// Build the remote store client, if one is configured
fn remote(config: &Config) -> Result<Arc<dyn RemoteStore>> {
    let Some(url) = &config.remote_url else {
        bail!("No remote configured. Set remote_url in config.toml or TANDEM_REMOTE_URL.");
    };
    Ok(Arc::new(HttpRemote::new(url.clone())))
}

/// Build a propagator when a remote is configured
///
/// Without a remote, pushes have nowhere to go; local-only operation still
/// works, so this returns None instead of failing the command.
fn propagator(config: &Config) -> Result<Option<ChangePropagator>> {
    match &config.remote_url {
        Some(url) => Ok(Some(ChangePropagator::spawn(Arc::new(HttpRemote::new(
            url.clone(),
        ))))),
        None => Ok(None),
    }
}

/// Drain the push queue before the process exits
async fn flush(propagator: &Option<ChangePropagator>) {
    if let Some(p) = propagator {
        p.flush().await;
    }
}
