//! Profile setup, editing, account closure and search.

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{now, SkillSwap};
use crate::error::{Result, SwapError};
use crate::group::Group;
use crate::profile::{Profile, ProfileDraft};
use crate::store::SwapStore;
use crate::validation;

/// Users and groups matching a search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub users: Vec<Profile>,
    pub groups: Vec<Group>,
}

impl<S: SwapStore> SkillSwap<S> {
    /// Create the profile of a newly signed-up user.
    pub async fn create_profile(&self, id: &str, email: &str, draft: ProfileDraft) -> Result<Profile> {
        validation::validate_user_id(id)?;
        validation::validate_email(email)?;
        draft.validate()?;

        if self.store.get_profile(id).await?.is_some() {
            return Err(SwapError::Invalid(format!("profile {} already exists", id)));
        }

        let profile = Profile::new(id, email, draft, now());
        self.store.upsert_profile(&profile).await?;
        info!(user_id = %id, "Created profile");
        Ok(profile)
    }

    /// Replace the editable fields of an existing profile.
    pub async fn update_profile(&self, id: &str, draft: ProfileDraft) -> Result<Profile> {
        draft.validate()?;

        let mut profile = self.require_profile(id).await?;
        profile.apply(draft, now());
        self.store.upsert_profile(&profile).await?;
        info!(user_id = %id, "Updated profile");
        Ok(profile)
    }

    /// Create or update a profile from a loosely typed document.
    ///
    /// A photo URL missing from the document keeps the stored one.
    pub async fn save_profile_document(&self, id: &str, email: &str, doc: &Value) -> Result<Profile> {
        let mut draft = ProfileDraft::from_document(doc)?;

        match self.store.get_profile(id).await? {
            Some(existing) => {
                if draft.photo_url.is_none() {
                    draft.photo_url = existing.photo_url;
                }
                self.update_profile(id, draft).await
            }
            None => self.create_profile(id, email, draft).await,
        }
    }

    pub async fn get_profile(&self, id: &str) -> Result<Profile> {
        self.require_profile(id).await
    }

    /// Store the download URL of an uploaded profile photo.
    pub async fn set_photo_url(&self, id: &str, url: &str) -> Result<Profile> {
        let url = url.trim();
        if url.is_empty() {
            return Err(validation::ValidationError::Empty("photo URL".to_string()).into());
        }

        let mut profile = self.require_profile(id).await?;
        profile.photo_url = Some(url.to_string());
        profile.updated_at = now();
        self.store.upsert_profile(&profile).await?;
        info!(user_id = %id, "Updated profile photo");
        Ok(profile)
    }

    /// Hard-delete a user's profile.
    pub async fn close_account(&self, id: &str) -> Result<()> {
        if !self.store.delete_profile(id).await? {
            return Err(SwapError::not_found("User", id));
        }
        info!(user_id = %id, "Closed account");
        Ok(())
    }

    /// Case-insensitive search over users and groups.
    ///
    /// A blank query returns everything.
    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        let needle = query.trim().to_lowercase();

        let mut users = self.store.list_profiles().await?;
        let mut groups = self.store.list_groups().await?;
        if !needle.is_empty() {
            users.retain(|p| p.matches_search(&needle));
            groups.retain(|g| g.matches_search(&needle));
        }

        Ok(SearchResults { users, groups })
    }
}
