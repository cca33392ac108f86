//! User profile management
//!
//! The profile is created once during onboarding, persisted on every
//! mutation, and cleared on logout. The nickname is the only field a user
//! can edit; the user id is generated once and never changes.

use thiserror::Error;
use tracing::info;

use crate::models::{nickname_is_valid, UserProfile, NICKNAME_MAX, NICKNAME_MIN};
use crate::storage::{LocalStore, StorageError};

/// Errors from profile operations
#[derive(Error, Debug)]
pub enum ProfileError {
    /// Nickname outside the allowed length range
    #[error("Nickname must be {NICKNAME_MIN} to {NICKNAME_MAX} characters")]
    InvalidNickname,

    /// No profile exists yet
    #[error("Not logged in")]
    NotLoggedIn,

    /// Local persistence failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Manages the device user's profile
pub struct ProfileManager {
    store: LocalStore,
    profile: Option<UserProfile>,
}

impl ProfileManager {
    /// Open the manager, loading any persisted profile
    pub fn open(store: LocalStore) -> Result<Self, ProfileError> {
        let profile = store.load_profile()?;
        Ok(Self { store, profile })
    }

    /// Whether a profile exists
    pub fn is_logged_in(&self) -> bool {
        self.profile.is_some()
    }

    /// The current profile, if any
    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    /// The user id, empty when logged out
    pub fn user_id(&self) -> &str {
        self.profile.as_ref().map(|p| p.user_id.as_str()).unwrap_or("")
    }

    /// The nickname, empty when logged out
    pub fn nickname(&self) -> &str {
        self.profile.as_ref().map(|p| p.nickname.as_str()).unwrap_or("")
    }

    /// Create the profile during onboarding
    pub fn create(&mut self, nickname: &str) -> Result<UserProfile, ProfileError> {
        if !nickname_is_valid(nickname) {
            return Err(ProfileError::InvalidNickname);
        }
        let profile = UserProfile::new(nickname);
        self.store.save_profile(&profile)?;
        info!(user_id = %profile.user_id, "profile created");
        self.profile = Some(profile.clone());
        Ok(profile)
    }

    /// Change the nickname
    pub fn update_nickname(&mut self, nickname: &str) -> Result<(), ProfileError> {
        if !nickname_is_valid(nickname) {
            return Err(ProfileError::InvalidNickname);
        }
        let Some(profile) = self.profile.as_mut() else {
            return Err(ProfileError::NotLoggedIn);
        };
        profile.nickname = nickname.to_string();
        self.store.save_profile(profile)?;
        Ok(())
    }

    /// Register a device token for push delivery
    pub fn update_device_token(&mut self, token: &str) -> Result<(), ProfileError> {
        let Some(profile) = self.profile.as_mut() else {
            return Err(ProfileError::NotLoggedIn);
        };
        profile.device_token = Some(token.to_string());
        self.store.save_profile(profile)?;
        Ok(())
    }

    /// Clear the profile; `is_logged_in` becomes false
    pub fn logout(&mut self) -> Result<(), ProfileError> {
        self.store.delete_profile()?;
        self.profile = None;
        info!("profile cleared");
        Ok(())
    }
}
