//! Pull implementation and aggregate refresh

use std::sync::Arc;
use std::sync::Mutex;

use serde_json::json;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::remote::records::{self, F_LIST_ID};
use crate::remote::{RecordType, RemoteError, RemoteStore};
use crate::repository::ListRepository;
use crate::storage::StorageError;

/// Errors from a single pull
#[derive(Error, Debug)]
pub enum SyncError {
    /// The remote store failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Persisting the pulled state failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of an aggregate refresh
#[derive(Debug, Default)]
pub struct SyncReport {
    /// Lists whose tasks were replaced from the remote
    pub pulled: usize,
    /// Lists whose pull failed, with a description
    pub failed: Vec<(Uuid, String)>,
}

impl SyncReport {
    /// Whether every list pulled cleanly
    pub fn is_ok(&self) -> bool {
        self.failed.is_empty()
    }

    /// One-line summary of what went wrong, if anything did
    pub fn error_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!("{} list(s) failed to sync", self.failed.len()))
    }
}

/// Pulls remote task state into the local repository
pub struct SyncEngine {
    remote: Arc<dyn RemoteStore>,
    syncing: watch::Sender<bool>,
    syncing_rx: watch::Receiver<bool>,
    last_error: Mutex<Option<String>>,
}

impl SyncEngine {
    /// Create an engine over the given remote store
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        let (syncing, syncing_rx) = watch::channel(false);
        Self {
            remote,
            syncing,
            syncing_rx,
            last_error: Mutex::new(None),
        }
    }

    /// Whether an aggregate refresh is in progress
    pub fn is_syncing(&self) -> bool {
        *self.syncing_rx.borrow()
    }

    /// Subscribe to the syncing-in-progress flag
    pub fn subscribe_syncing(&self) -> watch::Receiver<bool> {
        self.syncing_rx.clone()
    }

    /// Error summary from the last refresh, if it failed
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|g| g.clone())
    }

    /// Pull one list's remote task set and replace the local sequence
    ///
    /// Returns whether anything was pulled. A list that is not shared, or
    /// has no remote identity yet, is a no-op.
    pub async fn pull(
        &self,
        repo: &mut ListRepository,
        list_id: Uuid,
    ) -> Result<bool, SyncError> {
        let Some(list) = repo.get_list(list_id) else {
            return Ok(false);
        };
        let Some(record_id) = list.cloud_record_id.clone().filter(|_| list.is_shared) else {
            debug!(list = %list.name, "pull skipped, no remote identity");
            return Ok(false);
        };

        let task_records = self
            .remote
            .query(RecordType::SharedTask, F_LIST_ID, &json!(record_id.as_str()))
            .await?;

        let mut tasks: Vec<_> = task_records.iter().map(records::task_from_record).collect();
        tasks.sort_by_key(|t| t.created_at);

        repo.replace_tasks(list_id, tasks)?;
        Ok(true)
    }

    /// Refresh every shared list with a remote identity
    ///
    /// Each list's pull is independent; one failure does not abort the
    /// others. The syncing flag is set for the duration, and the report's
    /// error summary is kept for display until the next refresh.
    pub async fn pull_all(&self, repo: &mut ListRepository) -> SyncReport {
        let _ = self.syncing.send(true);

        let shared: Vec<(Uuid, String)> = repo
            .lists()
            .iter()
            .filter(|l| l.has_remote_identity())
            .map(|l| (l.id, l.name.clone()))
            .collect();

        let mut report = SyncReport::default();
        for (list_id, name) in shared {
            match self.pull(repo, list_id).await {
                Ok(true) => report.pulled += 1,
                Ok(false) => {}
                Err(e) => {
                    warn!(list = %name, "pull failed: {e}");
                    report.failed.push((list_id, e.to_string()));
                }
            }
        }

        if let Ok(mut last_error) = self.last_error.lock() {
            *last_error = report.error_summary();
        }
        let _ = self.syncing.send(false);

        info!(pulled = report.pulled, failed = report.failed.len(), "refresh complete");
        report
    }
}
