//! List repository
//!
//! Owns the in-memory canonical set of lists for this device and is the
//! only writer of the local store's list snapshot. Every operation mutates
//! memory first, then persists the full collection before returning, so a
//! caller never observes a half-applied operation.
//!
//! Operations on a missing list or task id are benign no-ops; the return
//! value (`Option`/`bool`) says whether anything happened, but no error is
//! raised for not-found.
//!
//! Completing a task (false -> true only) emits a celebration event for the
//! presentation layer; see [`ListRepository::take_celebrations`].

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{Participant, ShareType, TodoList, TodoTask};
use crate::remote::RecordId;
use crate::storage::{LocalStore, StorageResult};

/// Event emitted when a task transitions to completed. Carries no payload;
/// the presentation layer owns the transient (~2s) visual effect.
#[derive(Debug, Clone, Copy)]
pub struct Celebration;

/// In-memory canonical list collection, persisted through [`LocalStore`]
pub struct ListRepository {
    lists: Vec<TodoList>,
    store: LocalStore,
    celebration_tx: mpsc::UnboundedSender<Celebration>,
    celebration_rx: Option<mpsc::UnboundedReceiver<Celebration>>,
}

impl ListRepository {
    /// Open the repository, loading any persisted collection
    pub fn open(store: LocalStore) -> StorageResult<Self> {
        let lists = store.load_lists()?;
        let (celebration_tx, celebration_rx) = mpsc::unbounded_channel();
        Ok(Self {
            lists,
            store,
            celebration_tx,
            celebration_rx: Some(celebration_rx),
        })
    }

    /// Take the celebration receiver (can only be called once)
    pub fn take_celebrations(&mut self) -> Option<mpsc::UnboundedReceiver<Celebration>> {
        self.celebration_rx.take()
    }

    /// All lists, in creation order
    pub fn lists(&self) -> &[TodoList] {
        &self.lists
    }

    /// Look up a list by id
    pub fn get_list(&self, list_id: Uuid) -> Option<&TodoList> {
        self.lists.iter().find(|l| l.id == list_id)
    }

    /// Look up a list by its remote identity
    pub fn find_by_cloud_record(&self, record_id: &RecordId) -> Option<&TodoList> {
        self.lists
            .iter()
            .find(|l| l.cloud_record_id.as_ref() == Some(record_id))
    }

    // ==================== List Operations ====================

    /// Create a new private list
    pub fn create_list(
        &mut self,
        name: impl Into<String>,
        color: impl Into<String>,
    ) -> StorageResult<TodoList> {
        let list = TodoList::new(name, color);
        self.lists.push(list.clone());
        self.persist()?;
        Ok(list)
    }

    /// Rename/recolor a list (whole-struct replace by id)
    pub fn update_list(&mut self, list: TodoList) -> StorageResult<bool> {
        let Some(slot) = self.lists.iter_mut().find(|l| l.id == list.id) else {
            return Ok(false);
        };
        *slot = list;
        self.persist()?;
        Ok(true)
    }

    /// Delete a list
    pub fn delete_list(&mut self, list_id: Uuid) -> StorageResult<bool> {
        let before = self.lists.len();
        self.lists.retain(|l| l.id != list_id);
        if self.lists.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Append an externally constructed list (used when joining a shared
    /// list). The caller is responsible for idempotence checks.
    pub fn append_list(&mut self, list: TodoList) -> StorageResult<()> {
        self.lists.push(list);
        self.persist()
    }

    // ==================== Task Operations ====================

    /// Add a task to a list, returning it (None if the list is missing)
    pub fn add_task(
        &mut self,
        list_id: Uuid,
        text: impl Into<String>,
    ) -> StorageResult<Option<TodoTask>> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(None);
        };
        let task = TodoTask::new(text);
        list.tasks.push(task.clone());
        self.persist()?;
        Ok(Some(task))
    }

    /// Toggle a task's completion, attributing the acting user
    ///
    /// Completing (false -> true) emits one celebration event;
    /// un-completing emits none. Returns the updated task.
    pub fn toggle_task(
        &mut self,
        list_id: Uuid,
        task_id: Uuid,
        user_id: &str,
        user_name: &str,
    ) -> StorageResult<Option<TodoTask>> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(None);
        };
        let Some(task) = list.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Ok(None);
        };

        let completed_now = if task.is_completed {
            task.uncomplete();
            false
        } else {
            task.complete(user_id, user_name);
            true
        };
        let updated = task.clone();
        self.persist()?;

        if completed_now {
            let _ = self.celebration_tx.send(Celebration);
        }
        Ok(Some(updated))
    }

    /// Replace a task (edit text), bumping its modification time
    pub fn update_task(&mut self, list_id: Uuid, task: TodoTask) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        let Some(slot) = list.tasks.iter_mut().find(|t| t.id == task.id) else {
            return Ok(false);
        };
        *slot = task;
        self.persist()?;
        Ok(true)
    }

    /// Delete a task from a list
    pub fn delete_task(&mut self, list_id: Uuid, task_id: Uuid) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        let before = list.tasks.len();
        list.tasks.retain(|t| t.id != task_id);
        if list.tasks.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Replace a list's task sequence wholesale (sync pull)
    pub fn replace_tasks(&mut self, list_id: Uuid, tasks: Vec<TodoTask>) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        debug!(
            list = %list.name,
            old = list.tasks.len(),
            new = tasks.len(),
            "replacing task sequence from remote"
        );
        list.tasks = tasks;
        self.persist()?;
        Ok(true)
    }

    // ==================== Sharing Envelope ====================

    /// Transition a list to owned-shared, returning the updated list
    ///
    /// Sets the owner attribution and invite code. The remote identity is
    /// attached separately once the remote record exists; until then the
    /// list is shared-but-unsynced.
    pub fn mark_owned(
        &mut self,
        list_id: Uuid,
        owner_id: &str,
        owner_name: &str,
        invite_code: &str,
    ) -> StorageResult<Option<TodoList>> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(None);
        };
        list.is_shared = true;
        list.share_type = ShareType::Owned;
        list.owner_id = Some(owner_id.to_string());
        list.owner_name = Some(owner_name.to_string());
        list.invite_code = Some(invite_code.to_string());
        let updated = list.clone();
        self.persist()?;
        Ok(Some(updated))
    }

    /// Attach the remote identity to a published list
    pub fn set_cloud_record(&mut self, list_id: Uuid, record_id: RecordId) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        list.cloud_record_id = Some(record_id);
        self.persist()?;
        Ok(true)
    }

    /// Add a participant to a list, deduplicated by id
    pub fn add_participant(
        &mut self,
        list_id: Uuid,
        participant: Participant,
    ) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        if !list.add_participant(participant) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Remove a participant from a list by id (local only; the remote
    /// half goes through the change propagator)
    pub fn remove_participant(
        &mut self,
        list_id: Uuid,
        participant_id: &str,
    ) -> StorageResult<bool> {
        let Some(list) = self.lists.iter_mut().find(|l| l.id == list_id) else {
            return Ok(false);
        };
        if !list.remove_participant(participant_id) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    // ==================== Stats ====================

    /// Completed tasks across every list
    pub fn total_completed_tasks(&self) -> usize {
        self.lists.iter().map(|l| l.completed_task_count()).sum()
    }

    /// All tasks across every list
    pub fn total_tasks(&self) -> usize {
        self.lists.iter().map(|l| l.total_task_count()).sum()
    }

    /// Completions per completer name for one list
    pub fn participant_stats(&self, list_id: Uuid) -> HashMap<String, usize> {
        let mut stats = HashMap::new();
        let Some(list) = self.get_list(list_id) else {
            return stats;
        };
        for task in list.tasks.iter().filter(|t| t.is_completed) {
            if let Some(name) = &task.completed_by_name {
                *stats.entry(name.clone()).or_insert(0) += 1;
            }
        }
        stats
    }

    /// Persist the full collection to the local store
    fn persist(&self) -> StorageResult<()> {
        self.store.save_lists(&self.lists)
    }
}
