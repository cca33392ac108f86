//! Record field schema
//!
//! Conversion between local models and the field maps stored remotely.
//! A record written by an older client (or another platform) may omit
//! fields, so decoding falls back to sensible defaults for missing values
//! instead of failing the whole fetch.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::{Participant, TodoList, TodoTask, UserProfile};

use super::{Fields, Record, RecordId};

// Shared-list fields
pub const F_NAME: &str = "name";
pub const F_COLOR: &str = "color";
pub const F_OWNER_ID: &str = "ownerID";
pub const F_OWNER_NAME: &str = "ownerName";
pub const F_INVITE_CODE: &str = "inviteCode";
pub const F_PARTICIPANTS: &str = "participants";

// Shared-task fields
pub const F_LIST_ID: &str = "listID";
pub const F_TASK_ID: &str = "taskID";
pub const F_TEXT: &str = "text";
pub const F_IS_COMPLETED: &str = "isCompleted";
pub const F_COMPLETED_BY: &str = "completedBy";
pub const F_COMPLETED_BY_NAME: &str = "completedByName";
pub const F_COMPLETED_AT: &str = "completedAt";
pub const F_CREATED_AT: &str = "createdAt";
pub const F_MODIFIED_AT: &str = "modifiedAt";

// Invitation fields
pub const F_CODE: &str = "code";

// User-profile fields
pub const F_USER_ID: &str = "userID";
pub const F_NICKNAME: &str = "nickname";
pub const F_DEVICE_TOKEN: &str = "deviceToken";

/// Fields for a new shared-list record
pub fn list_fields(list: &TodoList, owner_id: &str, owner_name: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_NAME.into(), json!(list.name));
    fields.insert(F_COLOR.into(), json!(list.color));
    fields.insert(F_OWNER_ID.into(), json!(owner_id));
    fields.insert(F_OWNER_NAME.into(), json!(owner_name));
    fields.insert(F_INVITE_CODE.into(), json!(list.invite_code));
    fields.insert(F_PARTICIPANTS.into(), participants_value(&list.participants));
    fields
}

/// Fields for renaming/recoloring an existing shared-list record
pub fn list_update_fields(name: &str, color: &str) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_NAME.into(), json!(name));
    fields.insert(F_COLOR.into(), json!(color));
    fields
}

/// Fields replacing the participant set of a shared-list record
pub fn participants_fields(participants: &[Participant]) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_PARTICIPANTS.into(), participants_value(participants));
    fields
}

/// Fields for a shared-task record
///
/// The task keeps its client-side UUID in `taskID` so that edits from any
/// device address the same remote record. Completion is stored as 0/1.
pub fn task_fields(task: &TodoTask, list_record: &RecordId) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_LIST_ID.into(), json!(list_record.as_str()));
    fields.insert(F_TASK_ID.into(), json!(task.id.to_string()));
    fields.insert(F_TEXT.into(), json!(task.text));
    fields.insert(
        F_IS_COMPLETED.into(),
        json!(if task.is_completed { 1 } else { 0 }),
    );
    fields.insert(F_COMPLETED_BY.into(), json!(task.completed_by));
    fields.insert(F_COMPLETED_BY_NAME.into(), json!(task.completed_by_name));
    fields.insert(
        F_COMPLETED_AT.into(),
        json!(task.completed_at.map(|t| t.to_rfc3339())),
    );
    fields.insert(F_CREATED_AT.into(), json!(task.created_at.to_rfc3339()));
    fields.insert(F_MODIFIED_AT.into(), json!(task.modified_at.to_rfc3339()));
    fields
}

/// Fields for an invitation record (code -> list reference)
pub fn invitation_fields(code: &str, list_record: &RecordId) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_CODE.into(), json!(code));
    fields.insert(F_LIST_ID.into(), json!(list_record.as_str()));
    fields.insert(F_CREATED_AT.into(), json!(Utc::now().to_rfc3339()));
    fields
}

/// Fields for a user-profile record
pub fn profile_fields(profile: &UserProfile) -> Fields {
    let mut fields = Fields::new();
    fields.insert(F_USER_ID.into(), json!(profile.user_id));
    fields.insert(F_NICKNAME.into(), json!(profile.nickname));
    fields.insert(F_DEVICE_TOKEN.into(), json!(profile.device_token));
    fields
}

/// Decode a task from a shared-task record
pub fn task_from_record(record: &Record) -> TodoTask {
    let fields = &record.fields;
    let now = Utc::now();
    TodoTask {
        id: str_field(fields, F_TASK_ID)
            .and_then(|s| Uuid::parse_str(&s).ok())
            .unwrap_or_else(Uuid::new_v4),
        text: str_field(fields, F_TEXT).unwrap_or_default(),
        is_completed: fields
            .get(F_IS_COMPLETED)
            .and_then(Value::as_i64)
            .unwrap_or(0)
            == 1,
        completed_by: str_field(fields, F_COMPLETED_BY),
        completed_by_name: str_field(fields, F_COMPLETED_BY_NAME),
        completed_at: date_field(fields, F_COMPLETED_AT),
        created_at: date_field(fields, F_CREATED_AT).unwrap_or(now),
        modified_at: date_field(fields, F_MODIFIED_AT).unwrap_or(now),
    }
}

/// The decoded header of a shared-list record
#[derive(Debug, Clone)]
pub struct SharedListRecord {
    pub name: String,
    pub color: String,
    pub owner_id: Option<String>,
    pub owner_name: Option<String>,
    pub invite_code: Option<String>,
    pub participants: Vec<Participant>,
}

impl SharedListRecord {
    /// Decode the header fields of a shared-list record
    pub fn from_record(record: &Record) -> Self {
        let fields = &record.fields;
        Self {
            name: str_field(fields, F_NAME).unwrap_or_default(),
            color: str_field(fields, F_COLOR).unwrap_or_default(),
            owner_id: str_field(fields, F_OWNER_ID),
            owner_name: str_field(fields, F_OWNER_NAME),
            invite_code: str_field(fields, F_INVITE_CODE),
            participants: fields
                .get(F_PARTICIPANTS)
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
        }
    }
}

fn participants_value(participants: &[Participant]) -> Value {
    serde_json::to_value(participants).unwrap_or_else(|_| json!([]))
}

fn str_field(fields: &Fields, name: &str) -> Option<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn date_field(fields: &Fields, name: &str) -> Option<DateTime<Utc>> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
