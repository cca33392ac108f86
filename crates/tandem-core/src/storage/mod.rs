//! Local record store
//!
//! Durable persistence for the list collection and the user profile.
//! Two keys are used, each holding a whole-value JSON snapshot:
//!
//! - `lists.json` - every list and its tasks
//! - `profile.json` - the device user's profile
//!
//! Snapshots are replaced wholesale on every save (no partial writes),
//! using atomic writes (write to temp file, then rename).

mod error;
mod local;

pub use error::{StorageError, StorageResult};
pub use local::LocalStore;
