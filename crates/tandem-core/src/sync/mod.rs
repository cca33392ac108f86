//! Sync merge engine
//!
//! Reconciles the local task set of each shared list against the remote
//! record store.
//!
//! ## Policy
//!
//! Pull-replace, not merge: the remote task set is authoritative at pull
//! time and replaces the local sequence wholesale. Completion attribution
//! is a single-writer-per-field fact (only the toggling user writes it),
//! so last-successful-pull-wins avoids conflicting completion states
//! without vector clocks. Local edits made between the last push and a
//! pull do not survive the pull.

mod engine;

pub use engine::{SyncEngine, SyncError, SyncReport};
