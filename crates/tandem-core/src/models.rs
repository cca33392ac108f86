//! Data models for Tandem
//!
//! Defines the core data structures: TodoList, TodoTask, Participant, and
//! UserProfile. Lists carry a sharing envelope describing whether (and how)
//! they are published to the remote record store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::remote::RecordId;

/// How a list relates to the remote record store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShareType {
    /// Only on this device, never published
    #[default]
    Local,
    /// Published from this device; this user is the owner
    Owned,
    /// Joined from another user's invite code
    Participant,
}

/// A single task within a list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoTask {
    /// Unique identifier, stable across devices
    pub id: Uuid,
    /// Task text
    pub text: String,
    /// Whether the task is done
    pub is_completed: bool,
    /// User ID of whoever completed the task
    pub completed_by: Option<String>,
    /// Display name of whoever completed the task
    pub completed_by_name: Option<String>,
    /// When the task was completed
    pub completed_at: Option<DateTime<Utc>>,
    /// When this task was created
    pub created_at: DateTime<Utc>,
    /// When any field last changed
    pub modified_at: DateTime<Utc>,
}

impl TodoTask {
    /// Create a new, incomplete task
    pub fn new(text: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            is_completed: false,
            completed_by: None,
            completed_by_name: None,
            completed_at: None,
            created_at: now,
            modified_at: now,
        }
    }

    /// Mark the task complete, attributing the acting user
    ///
    /// The three attribution fields are always set together so that
    /// `is_completed` and attribution can never disagree.
    pub fn complete(&mut self, user_id: impl Into<String>, user_name: impl Into<String>) {
        self.is_completed = true;
        self.completed_by = Some(user_id.into());
        self.completed_by_name = Some(user_name.into());
        self.completed_at = Some(Utc::now());
        self.modified_at = Utc::now();
    }

    /// Mark the task incomplete, clearing all attribution
    pub fn uncomplete(&mut self) {
        self.is_completed = false;
        self.completed_by = None;
        self.completed_by_name = None;
        self.completed_at = None;
        self.modified_at = Utc::now();
    }

    /// Update the task text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified_at = Utc::now();
    }
}

/// A user participating in a shared list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    /// Remote user identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// When this user joined the list
    pub joined_at: DateTime<Utc>,
}

impl Participant {
    /// Create a participant joining now
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            joined_at: Utc::now(),
        }
    }
}

/// A task list, private by default, optionally shared
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TodoList {
    /// Unique identifier, assigned at creation
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Display color (hex string, e.g. "7161EF")
    pub color: String,
    /// Tasks in insertion order (order is meaningful for display)
    pub tasks: Vec<TodoTask>,

    // Sharing envelope
    /// Remote identity once published, otherwise absent
    pub cloud_record_id: Option<RecordId>,
    /// Whether this list is published to the remote store
    pub is_shared: bool,
    /// Local, owned, or joined as a participant
    pub share_type: ShareType,
    /// Owner's user ID (set once shared)
    pub owner_id: Option<String>,
    /// Owner's display name (set once shared)
    pub owner_name: Option<String>,
    /// Participants, unique by id
    pub participants: Vec<Participant>,
    /// Invite code, stable for the list's sharing lifetime
    pub invite_code: Option<String>,
}

impl TodoList {
    /// Create a new private list
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: color.into(),
            tasks: Vec::new(),
            cloud_record_id: None,
            is_shared: false,
            share_type: ShareType::Local,
            owner_id: None,
            owner_name: None,
            participants: Vec::new(),
            invite_code: None,
        }
    }

    /// Number of completed tasks
    pub fn completed_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    /// Total number of tasks
    pub fn total_task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Fraction of tasks completed, 0.0 for an empty list
    pub fn completion_progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_task_count() as f64 / self.total_task_count() as f64
    }

    /// Look up a task by id
    pub fn task(&self, task_id: Uuid) -> Option<&TodoTask> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Add a participant, deduplicated by id
    ///
    /// Returns false if a participant with the same id already exists.
    pub fn add_participant(&mut self, participant: Participant) -> bool {
        if self.participants.iter().any(|p| p.id == participant.id) {
            return false;
        }
        self.participants.push(participant);
        true
    }

    /// Remove a participant by id, returning whether one was removed
    pub fn remove_participant(&mut self, participant_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != participant_id);
        self.participants.len() != before
    }

    /// Whether this list has been published and has a remote identity
    pub fn has_remote_identity(&self) -> bool {
        self.is_shared && self.cloud_record_id.is_some()
    }
}

/// Nickname length bounds (inclusive)
pub const NICKNAME_MIN: usize = 2;
pub const NICKNAME_MAX: usize = 20;

/// The device user's profile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    /// Opaque stable identifier, generated once
    pub user_id: String,
    /// Display name, the only user-editable field
    pub nickname: String,
    /// Token for push delivery, if registered
    pub device_token: Option<String>,
    /// When the profile was created
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create a profile with a fresh user ID
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            user_id: Uuid::new_v4().to_string(),
            nickname: nickname.into(),
            device_token: None,
            created_at: Utc::now(),
        }
    }

    /// Whether the nickname is within bounds
    pub fn is_valid(&self) -> bool {
        nickname_is_valid(&self.nickname)
    }
}

/// Check nickname length against the allowed range
pub fn nickname_is_valid(nickname: &str) -> bool {
    let len = nickname.chars().count();
    (NICKNAME_MIN..=NICKNAME_MAX).contains(&len)
}
