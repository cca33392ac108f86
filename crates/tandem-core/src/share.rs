//! Share coordinator
//!
//! Publishes a list to the remote record store, resolves invite codes to
//! shared lists, and maintains the participant set.
//!
//! Publishing persists the local sharing transition FIRST, then issues the
//! remote writes (list record, one task record per task, invitation
//! record). A remote failure after the local transition leaves the list
//! shared-but-unsynced rather than rolling back: local state stays
//! authoritative and the error is surfaced so the user can retry.

use std::sync::Arc;

use rand::Rng;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Participant, ShareType, TodoList, UserProfile};
use crate::remote::records::{
    self, F_INVITE_CODE, F_LIST_ID,
};
use crate::remote::{RecordId, RecordType, RemoteError, RemoteStore};
use crate::repository::ListRepository;
use crate::storage::StorageError;

/// Invite code length
pub const INVITE_CODE_LEN: usize = 6;

/// Unambiguous code alphabet: uppercase letters and digits without 0/O/1/I
pub const INVITE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Generate an invite code, drawn uniformly from the alphabet
///
/// 32^6 codes; collisions against existing codes are not checked at this
/// scale.
pub fn generate_invite_code() -> String {
    let mut rng = rand::rng();
    (0..INVITE_CODE_LEN)
        .map(|_| INVITE_ALPHABET[rng.random_range(0..INVITE_ALPHABET.len())] as char)
        .collect()
}

/// Errors from sharing operations
#[derive(Error, Debug)]
pub enum ShareError {
    /// The list id does not exist locally
    #[error("List not found")]
    ListNotFound,

    /// The list is already shared
    #[error("This list is already shared")]
    AlreadyShared,

    /// Malformed invite code, rejected before any remote call
    #[error("Invite codes are exactly 6 characters")]
    InvalidCode,

    /// No remote list matches the invite code
    #[error("No list found for that invite code")]
    CodeNotFound,

    /// The remote store failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Local persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Coordinates invite codes, publication, and participant membership
pub struct ShareCoordinator {
    remote: Arc<dyn RemoteStore>,
}

impl ShareCoordinator {
    /// Create a coordinator over the given remote store
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        Self { remote }
    }

    /// Publish a list, transitioning it local -> owned
    ///
    /// Returns the generated invite code. The local transition is persisted
    /// before any remote write and is never rolled back; if a remote write
    /// fails the list stays shared-but-unsynced and the error is returned.
    pub async fn publish(
        &self,
        repo: &mut ListRepository,
        list_id: Uuid,
        owner_id: &str,
        owner_name: &str,
    ) -> Result<String, ShareError> {
        let list = repo.get_list(list_id).ok_or(ShareError::ListNotFound)?;
        if list.is_shared {
            return Err(ShareError::AlreadyShared);
        }

        let code = generate_invite_code();
        let Some(list) = repo.mark_owned(list_id, owner_id, owner_name, &code)? else {
            return Err(ShareError::ListNotFound);
        };

        // Remote writes are not transactional; partial completion leaves a
        // state the next publish retry or sync can catch up from.
        let record_id = self
            .remote
            .create(
                RecordType::SharedList,
                records::list_fields(&list, owner_id, owner_name),
            )
            .await?;
        repo.set_cloud_record(list_id, record_id.clone())?;

        for task in &list.tasks {
            self.remote
                .create(RecordType::SharedTask, records::task_fields(task, &record_id))
                .await?;
        }

        self.remote
            .create(
                RecordType::Invitation,
                records::invitation_fields(&code, &record_id),
            )
            .await?;

        info!(list = %list.name, %record_id, "list published");
        Ok(code)
    }

    /// Normalize user input into a canonical invite code
    ///
    /// Trims whitespace and uppercases; anything that is not exactly six
    /// characters is rejected here, before any remote call.
    pub fn normalize_code(input: &str) -> Result<String, ShareError> {
        let code = input.trim().to_uppercase();
        if code.chars().count() != INVITE_CODE_LEN {
            return Err(ShareError::InvalidCode);
        }
        Ok(code)
    }

    /// Resolve an invite code and join the list as a participant
    ///
    /// Registers the redeeming user on the remote record (append-if-absent
    /// by id) and appends the list locally unless a list with the same
    /// remote identity already exists (idempotent re-join).
    pub async fn redeem(
        &self,
        repo: &mut ListRepository,
        code: &str,
        user_id: &str,
        user_name: &str,
    ) -> Result<TodoList, ShareError> {
        let code = Self::normalize_code(code)?;

        let mut matches = self
            .remote
            .query(RecordType::SharedList, F_INVITE_CODE, &json!(code))
            .await?;
        let Some(record) = matches.pop() else {
            return Err(ShareError::CodeNotFound);
        };

        let header = records::SharedListRecord::from_record(&record);

        let task_records = self
            .remote
            .query(RecordType::SharedTask, F_LIST_ID, &json!(record.id.as_str()))
            .await?;
        let mut tasks: Vec<_> = task_records.iter().map(records::task_from_record).collect();
        tasks.sort_by_key(|t| t.created_at);

        // Register the redeemer on the remote record, append-if-absent
        let mut participants = header.participants.clone();
        if !participants.iter().any(|p| p.id == user_id) {
            participants.push(Participant::new(user_id, user_name));
            self.remote
                .update(&record.id, records::participants_fields(&participants))
                .await?;
        }

        if let Some(existing) = repo.find_by_cloud_record(&record.id) {
            info!(list = %existing.name, "already joined, reusing local copy");
            return Ok(existing.clone());
        }

        let list = TodoList {
            id: Uuid::new_v4(),
            name: header.name,
            color: header.color,
            tasks,
            cloud_record_id: Some(record.id.clone()),
            is_shared: true,
            share_type: ShareType::Participant,
            owner_id: header.owner_id,
            owner_name: header.owner_name,
            participants,
            invite_code: Some(code),
        };
        repo.append_list(list.clone())?;

        info!(list = %list.name, record = %record.id, "joined shared list");
        Ok(list)
    }

    /// Remove a participant from the local set
    ///
    /// Does not notify the remote store itself; the symmetric remote
    /// removal goes through the change propagator.
    pub fn remove_participant(
        &self,
        repo: &mut ListRepository,
        list_id: Uuid,
        participant_id: &str,
    ) -> Result<bool, ShareError> {
        Ok(repo.remove_participant(list_id, participant_id)?)
    }

    /// Publish the user-profile record, best effort
    pub async fn publish_profile(&self, profile: &UserProfile) -> Result<RecordId, ShareError> {
        match self
            .remote
            .create(RecordType::UserProfile, records::profile_fields(profile))
            .await
        {
            Ok(id) => Ok(id),
            Err(e) => {
                warn!("profile publish failed: {e}");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::remote::MemoryRemote;
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn test_repo(temp_dir: &TempDir) -> ListRepository {
        let store = LocalStore::new(Config {
            data_dir: temp_dir.path().to_path_buf(),
            remote_url: None,
            sync_enabled: false,
        });
        ListRepository::open(store).unwrap()
    }

    fn coordinator() -> (ShareCoordinator, Arc<MemoryRemote>) {
        let remote = Arc::new(MemoryRemote::new());
        (ShareCoordinator::new(remote.clone()), remote)
    }

    #[test]
    fn test_generated_codes_use_the_alphabet() {
        for _ in 0..100 {
            let code = generate_invite_code();
            assert_eq!(code.len(), INVITE_CODE_LEN);
            assert!(code.bytes().all(|b| INVITE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(ShareCoordinator::normalize_code(" xj7k2m ").unwrap(), "XJ7K2M");
        assert!(matches!(
            ShareCoordinator::normalize_code("XJ7K2"),
            Err(ShareError::InvalidCode)
        ));
        assert!(matches!(
            ShareCoordinator::normalize_code("XJ7K2M9"),
            Err(ShareError::InvalidCode)
        ));
    }

    #[tokio::test]
    async fn test_publish_transitions_to_owned() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, remote) = coordinator();

        let list = repo.create_list("Groceries", "7161EF").unwrap();
        repo.add_task(list.id, "Milk").unwrap();
        repo.add_task(list.id, "Eggs").unwrap();

        let code = coordinator
            .publish(&mut repo, list.id, "u1", "Alice")
            .await
            .unwrap();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.bytes().all(|b| INVITE_ALPHABET.contains(&b)));

        let list = repo.get_list(list.id).unwrap();
        assert!(list.is_shared);
        assert_eq!(list.share_type, ShareType::Owned);
        assert_eq!(list.owner_id.as_deref(), Some("u1"));
        assert_eq!(list.invite_code.as_deref(), Some(code.as_str()));
        assert!(list.has_remote_identity());

        // One list record, two task records, one invitation
        assert_eq!(remote.count(RecordType::SharedList).await, 1);
        assert_eq!(remote.count(RecordType::SharedTask).await, 2);
        assert_eq!(remote.count(RecordType::Invitation).await, 1);
    }

    #[tokio::test]
    async fn test_publish_already_shared_is_rejected_without_mutation() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, remote) = coordinator();

        let list = repo.create_list("Groceries", "7161EF").unwrap();
        let code = coordinator
            .publish(&mut repo, list.id, "u1", "Alice")
            .await
            .unwrap();

        let err = coordinator
            .publish(&mut repo, list.id, "u1", "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::AlreadyShared));

        // Unchanged: same code, no extra remote records
        assert_eq!(
            repo.get_list(list.id).unwrap().invite_code.as_deref(),
            Some(code.as_str())
        );
        assert_eq!(remote.count(RecordType::SharedList).await, 1);
    }

    #[tokio::test]
    async fn test_publish_missing_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, _remote) = coordinator();

        let err = coordinator
            .publish(&mut repo, Uuid::new_v4(), "u1", "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::ListNotFound));
    }

    #[tokio::test]
    async fn test_publish_outage_leaves_shared_but_unsynced() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, remote) = coordinator();
        remote.set_offline(true);

        let list = repo.create_list("Groceries", "7161EF").unwrap();
        let err = coordinator
            .publish(&mut repo, list.id, "u1", "Alice")
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::Remote(RemoteError::Unavailable(_))));

        // Local truth kept: shared, owned, has a code, but no remote identity
        let list = repo.get_list(list.id).unwrap();
        assert!(list.is_shared);
        assert_eq!(list.share_type, ShareType::Owned);
        assert!(list.invite_code.is_some());
        assert!(list.cloud_record_id.is_none());
    }

    #[tokio::test]
    async fn test_redeem_lowercase_code_joins_as_participant() {
        let owner_dir = TempDir::new().unwrap();
        let joiner_dir = TempDir::new().unwrap();
        let mut owner_repo = test_repo(&owner_dir);
        let mut joiner_repo = test_repo(&joiner_dir);
        let (coordinator, _remote) = coordinator();

        let list = owner_repo.create_list("Groceries", "7161EF").unwrap();
        owner_repo.add_task(list.id, "Milk").unwrap();
        owner_repo.add_task(list.id, "Eggs").unwrap();
        let code = coordinator
            .publish(&mut owner_repo, list.id, "u1", "Alice")
            .await
            .unwrap();

        let joined = coordinator
            .redeem(&mut joiner_repo, &code.to_lowercase(), "u2", "Bob")
            .await
            .unwrap();

        assert_eq!(joined.share_type, ShareType::Participant);
        assert_eq!(joined.name, "Groceries");
        assert_eq!(joined.tasks.len(), 2);
        assert_eq!(joined.owner_id.as_deref(), Some("u1"));
        assert_eq!(joined.owner_name.as_deref(), Some("Alice"));
        assert!(joined.participants.iter().any(|p| p.id == "u2"));
        assert_eq!(joiner_repo.lists().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_unknown_code_leaves_repository_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, _remote) = coordinator();

        let err = coordinator
            .redeem(&mut repo, "AAAAAA", "u2", "Bob")
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::CodeNotFound));
        assert!(repo.lists().is_empty());
    }

    #[tokio::test]
    async fn test_redeem_invalid_code_never_touches_the_remote() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, remote) = coordinator();

        // With the remote offline, only a pre-validation failure avoids an
        // Unavailable error.
        remote.set_offline(true);
        let err = coordinator
            .redeem(&mut repo, "XJ7", "u2", "Bob")
            .await
            .unwrap_err();
        assert!(matches!(err, ShareError::InvalidCode));
    }

    #[tokio::test]
    async fn test_redeem_twice_is_idempotent() {
        let owner_dir = TempDir::new().unwrap();
        let joiner_dir = TempDir::new().unwrap();
        let mut owner_repo = test_repo(&owner_dir);
        let mut joiner_repo = test_repo(&joiner_dir);
        let (coordinator, _remote) = coordinator();

        let list = owner_repo.create_list("Groceries", "7161EF").unwrap();
        let code = coordinator
            .publish(&mut owner_repo, list.id, "u1", "Alice")
            .await
            .unwrap();

        let first = coordinator
            .redeem(&mut joiner_repo, &code, "u2", "Bob")
            .await
            .unwrap();
        let second = coordinator
            .redeem(&mut joiner_repo, &code, "u2", "Bob")
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(joiner_repo.lists().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_registers_participant_once() {
        let owner_dir = TempDir::new().unwrap();
        let mut owner_repo = test_repo(&owner_dir);
        let (coordinator, remote) = coordinator();

        let list = owner_repo.create_list("Groceries", "7161EF").unwrap();
        let code = coordinator
            .publish(&mut owner_repo, list.id, "u1", "Alice")
            .await
            .unwrap();

        for _ in 0..2 {
            let joiner_dir = TempDir::new().unwrap();
            let mut joiner_repo = test_repo(&joiner_dir);
            coordinator
                .redeem(&mut joiner_repo, &code, "u2", "Bob")
                .await
                .unwrap();
        }

        let records = remote
            .query(RecordType::SharedList, F_INVITE_CODE, &json!(code))
            .await
            .unwrap();
        let header = records::SharedListRecord::from_record(&records[0]);
        assert_eq!(header.participants.len(), 1);
        assert_eq!(header.participants[0].id, "u2");
    }

    #[tokio::test]
    async fn test_remove_participant_is_local_only() {
        let temp_dir = TempDir::new().unwrap();
        let mut repo = test_repo(&temp_dir);
        let (coordinator, remote) = coordinator();
        remote.set_offline(true);

        let list = repo.create_list("Groceries", "7161EF").unwrap();
        repo.add_participant(list.id, Participant::new("u2", "Bob"))
            .unwrap();

        // Works even while the remote is down: no remote call is made
        assert!(coordinator
            .remove_participant(&mut repo, list.id, "u2")
            .unwrap());
        assert!(repo.get_list(list.id).unwrap().participants.is_empty());
    }

    #[tokio::test]
    async fn test_publish_profile() {
        let (coordinator, remote) = coordinator();
        let profile = UserProfile::new("Alice");

        coordinator.publish_profile(&profile).await.unwrap();
        assert_eq!(remote.count(RecordType::UserProfile).await, 1);

        remote.set_offline(true);
        assert!(coordinator.publish_profile(&profile).await.is_err());
    }
}
