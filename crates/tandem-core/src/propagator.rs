//! Change propagator
//!
//! After a local mutation of a shared list, pushes the corresponding record
//! write to the remote store without blocking the caller: submit, don't
//! await. Each change gets a single attempt; a failure is logged and
//! silently superseded by the next successful pull. There is no outbound
//! queue surviving process restart.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Participant, TodoList, TodoTask};
use crate::remote::records::{self, F_TASK_ID};
use crate::remote::{RecordId, RecordType, RemoteError, RemoteStore};

/// A local mutation to mirror remotely
#[derive(Debug, Clone)]
pub enum ChangeEvent {
    /// A task was added, toggled, or edited
    TaskUpserted {
        list_record: RecordId,
        task: TodoTask,
    },
    /// A task was deleted
    TaskDeleted {
        list_record: RecordId,
        task_id: Uuid,
    },
    /// The list was renamed or recolored
    ListUpdated {
        list_record: RecordId,
        name: String,
        color: String,
    },
    /// The participant set changed (e.g. a participant was removed)
    ParticipantsChanged {
        list_record: RecordId,
        participants: Vec<Participant>,
    },
}

enum Job {
    Change(ChangeEvent),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget push queue over the remote store
pub struct ChangePropagator {
    tx: mpsc::UnboundedSender<Job>,
}

impl ChangePropagator {
    /// Spawn the worker task and return a handle for submitting changes
    pub fn spawn(remote: Arc<dyn RemoteStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker(remote, rx));
        Self { tx }
    }

    /// Enqueue a change. Returns immediately; delivery is best effort.
    pub fn submit(&self, event: ChangeEvent) {
        if self.tx.send(Job::Change(event)).is_err() {
            warn!("change propagator worker is gone, dropping push");
        }
    }

    /// Enqueue a task upsert if the list is shared with a remote identity
    pub fn task_upserted(&self, list: &TodoList, task: &TodoTask) {
        if let Some(list_record) = shared_record(list) {
            self.submit(ChangeEvent::TaskUpserted {
                list_record,
                task: task.clone(),
            });
        }
    }

    /// Enqueue a task deletion if the list is shared with a remote identity
    pub fn task_deleted(&self, list: &TodoList, task_id: Uuid) {
        if let Some(list_record) = shared_record(list) {
            self.submit(ChangeEvent::TaskDeleted {
                list_record,
                task_id,
            });
        }
    }

    /// Enqueue a rename/recolor if the list is shared with a remote identity
    pub fn list_updated(&self, list: &TodoList) {
        if let Some(list_record) = shared_record(list) {
            self.submit(ChangeEvent::ListUpdated {
                list_record,
                name: list.name.clone(),
                color: list.color.clone(),
            });
        }
    }

    /// Enqueue a participant-set write if the list is shared with a remote
    /// identity
    pub fn participants_changed(&self, list: &TodoList) {
        if let Some(list_record) = shared_record(list) {
            self.submit(ChangeEvent::ParticipantsChanged {
                list_record,
                participants: list.participants.clone(),
            });
        }
    }

    /// Wait until every previously submitted change has been attempted
    ///
    /// This is a queue drain, not a delivery guarantee: failed pushes are
    /// already dropped by the time this returns.
    pub async fn flush(&self) {
        let (tx, rx) = oneshot::channel();
        if self.tx.send(Job::Flush(tx)).is_ok() {
            let _ = rx.await;
        }
    }
}

fn shared_record(list: &TodoList) -> Option<RecordId> {
    if list.is_shared {
        list.cloud_record_id.clone()
    } else {
        None
    }
}

async fn worker(remote: Arc<dyn RemoteStore>, mut rx: mpsc::UnboundedReceiver<Job>) {
    while let Some(job) = rx.recv().await {
        match job {
            Job::Change(event) => {
                if let Err(e) = push(remote.as_ref(), event).await {
                    // Single attempt: the next successful pull supersedes this
                    warn!("push failed: {e}");
                }
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

async fn push(remote: &dyn RemoteStore, event: ChangeEvent) -> Result<(), RemoteError> {
    match event {
        ChangeEvent::TaskUpserted { list_record, task } => {
            let existing = remote
                .query(
                    RecordType::SharedTask,
                    F_TASK_ID,
                    &serde_json::json!(task.id.to_string()),
                )
                .await?;
            let fields = records::task_fields(&task, &list_record);
            match existing.first() {
                Some(record) => remote.update(&record.id, fields).await?,
                None => {
                    remote.create(RecordType::SharedTask, fields).await?;
                }
            }
            debug!(task = %task.id, "task pushed");
        }
        ChangeEvent::TaskDeleted { task_id, .. } => {
            let existing = remote
                .query(
                    RecordType::SharedTask,
                    F_TASK_ID,
                    &serde_json::json!(task_id.to_string()),
                )
                .await?;
            for record in existing {
                remote.delete(&record.id).await?;
            }
            debug!(task = %task_id, "task deletion pushed");
        }
        ChangeEvent::ListUpdated {
            list_record,
            name,
            color,
        } => {
            remote
                .update(&list_record, records::list_update_fields(&name, &color))
                .await?;
        }
        ChangeEvent::ParticipantsChanged {
            list_record,
            participants,
        } => {
            remote
                .update(&list_record, records::participants_fields(&participants))
                .await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MemoryRemote;
    use serde_json::json;

    fn task_text(fields: &crate::remote::Fields) -> &str {
        fields
            .get(records::F_TEXT)
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let remote = Arc::new(MemoryRemote::new());
        let propagator = ChangePropagator::spawn(remote.clone());
        let list_record = RecordId::from("rec-list");

        let mut task = TodoTask::new("Milk");
        propagator.submit(ChangeEvent::TaskUpserted {
            list_record: list_record.clone(),
            task: task.clone(),
        });
        propagator.flush().await;
        assert_eq!(remote.count(RecordType::SharedTask).await, 1);

        task.set_text("Oat milk");
        propagator.submit(ChangeEvent::TaskUpserted {
            list_record,
            task: task.clone(),
        });
        propagator.flush().await;

        // Still one record, now updated
        assert_eq!(remote.count(RecordType::SharedTask).await, 1);
        let found = remote
            .query(RecordType::SharedTask, F_TASK_ID, &json!(task.id.to_string()))
            .await
            .unwrap();
        assert_eq!(task_text(&found[0].fields), "Oat milk");
    }

    #[tokio::test]
    async fn test_delete_removes_the_record() {
        let remote = Arc::new(MemoryRemote::new());
        let propagator = ChangePropagator::spawn(remote.clone());
        let list_record = RecordId::from("rec-list");

        let task = TodoTask::new("Milk");
        propagator.submit(ChangeEvent::TaskUpserted {
            list_record: list_record.clone(),
            task: task.clone(),
        });
        propagator.submit(ChangeEvent::TaskDeleted {
            list_record,
            task_id: task.id,
        });
        propagator.flush().await;

        assert_eq!(remote.count(RecordType::SharedTask).await, 0);
    }

    #[tokio::test]
    async fn test_failed_push_is_swallowed() {
        let remote = Arc::new(MemoryRemote::new());
        let propagator = ChangePropagator::spawn(remote.clone());
        remote.set_offline(true);

        propagator.submit(ChangeEvent::TaskUpserted {
            list_record: RecordId::from("rec-list"),
            task: TodoTask::new("Milk"),
        });
        // flush returns normally even though the push failed
        propagator.flush().await;

        remote.set_offline(false);
        // Single attempt only: nothing was retried after the outage
        assert_eq!(remote.count(RecordType::SharedTask).await, 0);
    }

    #[tokio::test]
    async fn test_helpers_skip_unshared_lists() {
        let remote = Arc::new(MemoryRemote::new());
        let propagator = ChangePropagator::spawn(remote.clone());

        let mut list = TodoList::new("Groceries", "7161EF");
        let task = TodoTask::new("Milk");

        // Private list: nothing to push
        propagator.task_upserted(&list, &task);
        // Shared but unsynced (no remote identity yet): still nothing
        list.is_shared = true;
        propagator.task_upserted(&list, &task);
        propagator.flush().await;

        assert_eq!(remote.count(RecordType::SharedTask).await, 0);

        list.cloud_record_id = Some(RecordId::from("rec-list"));
        propagator.task_upserted(&list, &task);
        propagator.flush().await;
        assert_eq!(remote.count(RecordType::SharedTask).await, 1);
    }

    #[tokio::test]
    async fn test_list_update_and_participants() {
        let remote = Arc::new(MemoryRemote::new());
        let propagator = ChangePropagator::spawn(remote.clone());

        let mut list = TodoList::new("Groceries", "7161EF");
        let record_id = remote
            .create(
                RecordType::SharedList,
                records::list_fields(&list, "u1", "Alice"),
            )
            .await
            .unwrap();
        list.is_shared = true;
        list.cloud_record_id = Some(record_id.clone());
        list.participants.push(Participant::new("u2", "Bob"));

        list.name = "Errands".to_string();
        propagator.list_updated(&list);
        propagator.participants_changed(&list);
        propagator.flush().await;

        let found = remote
            .query(RecordType::SharedList, records::F_NAME, &json!("Errands"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        let header = records::SharedListRecord::from_record(&found[0]);
        assert_eq!(header.participants.len(), 1);

        // Removing the participant mirrors the emptied set
        list.participants.clear();
        propagator.participants_changed(&list);
        propagator.flush().await;

        let found = remote
            .query(RecordType::SharedList, records::F_NAME, &json!("Errands"))
            .await
            .unwrap();
        let header = records::SharedListRecord::from_record(&found[0]);
        assert!(header.participants.is_empty());
    }
}
