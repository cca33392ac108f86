//! Tandem Core Library
//!
//! This crate provides the core functionality for Tandem, an app for
//! keeping private task lists and sharing them with other users via short
//! invite codes.
//!
//! # Architecture
//!
//! Local state is authoritative for this device: every mutation lands in
//! the in-memory repository and is persisted locally before anything else
//! happens. Shared lists are mirrored to a remote record store on a best
//! effort basis (fire-and-forget pushes), and refreshed by wholesale
//! pull-replace of each list's task set.
//!
//! # Quick Start
//!
//! ```text
//! let store = LocalStore::new(config);
//! let mut repo = ListRepository::open(store)?;
//!
//! let list = repo.create_list("Groceries", "7161EF")?;
//! repo.add_task(list.id, "Milk")?;
//!
//! let coordinator = ShareCoordinator::new(remote.clone());
//! let code = coordinator.publish(&mut repo, list.id, user_id, name).await?;
//! ```
//!
//! # Modules
//!
//! - `repository`: in-memory list collection (main entry point)
//! - `models`: lists, tasks, participants, and the user profile
//! - `share`: invite codes, publish, and join
//! - `sync`: pull-replace refresh from the remote store
//! - `propagator`: best-effort push of local changes
//! - `remote`: remote record store trait and implementations
//! - `storage`: local snapshot persistence
//! - `profile`: the device user's profile
//! - `config`: application configuration

pub mod config;
pub mod models;
pub mod profile;
pub mod propagator;
pub mod remote;
pub mod repository;
pub mod share;
pub mod storage;
pub mod sync;

pub use config::Config;
pub use models::{Participant, ShareType, TodoList, TodoTask, UserProfile};
pub use profile::{ProfileError, ProfileManager};
pub use propagator::{ChangeEvent, ChangePropagator};
pub use remote::{HttpRemote, MemoryRemote, Record, RecordId, RecordType, RemoteError, RemoteStore};
pub use repository::{Celebration, ListRepository};
pub use share::{generate_invite_code, ShareCoordinator, ShareError};
pub use storage::{LocalStore, StorageError};
pub use sync::{SyncEngine, SyncError, SyncReport};
