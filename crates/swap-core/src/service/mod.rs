//! The SkillSwap service facade.
//!
//! [`SkillSwap`] holds every multi-step operation of the product: it checks
//! preconditions, builds records and writes them through a [`SwapStore`].
//! Operations are grouped by area in the submodules.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, SwapError};
use crate::group::Group;
use crate::profile::Profile;
use crate::store::SwapStore;

mod credits;
mod group_chat;
mod groups;
mod matching;
mod messages;
mod moderation;
mod profiles;
mod sessions;

pub use profiles::SearchResults;

/// Default time a typing status stays visible without a refresh.
pub const DEFAULT_TYPING_TTL: Duration = Duration::from_secs(3);

/// Tunables of the service.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Typing statuses older than this are hidden.
    pub typing_ttl: Duration,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            typing_ttl: DEFAULT_TYPING_TTL,
        }
    }
}

/// SkillSwap operations over a store.
pub struct SkillSwap<S: SwapStore> {
    store: Arc<S>,
    settings: ServiceSettings,
}

impl<S: SwapStore> Clone for SkillSwap<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: self.settings.clone(),
        }
    }
}

impl<S: SwapStore> SkillSwap<S> {
    /// Create a service with default settings.
    pub fn new(store: S) -> Self {
        Self::with_settings(Arc::new(store), ServiceSettings::default())
    }

    /// Create a service over a shared store.
    pub fn with_settings(store: Arc<S>, settings: ServiceSettings) -> Self {
        Self { store, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    async fn require_profile(&self, id: &str) -> Result<Profile> {
        self.store
            .get_profile(id)
            .await?
            .ok_or_else(|| SwapError::not_found("User", id))
    }

    async fn require_group(&self, id: &str) -> Result<Group> {
        self.store
            .get_group(id)
            .await?
            .ok_or_else(|| SwapError::not_found("Group", id))
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn now() -> DateTime<Utc> {
    Utc::now()
}

#[cfg(test)]
mod testing {
    use crate::memory::MemoryStore;
    use crate::profile::{Profile, ProfileDraft};
    use crate::store::SwapStore;

    use super::SkillSwap;

    pub(crate) fn draft(offered: &[&str], needed: &[&str], availability: &[&str]) -> ProfileDraft {
        let list = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        ProfileDraft {
            skills_offered: list(offered),
            skills_needed: list(needed),
            availability: list(availability),
            bio: "Student".to_string(),
            ..Default::default()
        }
    }

    /// A service with one complete profile per id.
    pub(crate) async fn service_with(ids: &[&str]) -> SkillSwap<MemoryStore> {
        let service = SkillSwap::new(MemoryStore::new());
        for id in ids {
            service
                .create_profile(id, &format!("{id}@uni.edu"), draft(&["Go"], &["Rust"], &["Mornings"]))
                .await
                .unwrap();
        }
        service
    }

    /// Overwrite a balance directly, bypassing the ledger.
    pub(crate) async fn set_credits(service: &SkillSwap<MemoryStore>, id: &str, credits: i64) {
        let mut profile: Profile = service.store().get_profile(id).await.unwrap().unwrap();
        profile.credits = credits;
        service.store().delete_profile(id).await.unwrap();
        service.store().upsert_profile(&profile).await.unwrap();
    }

    /// Two users that accepted each other.
    pub(crate) async fn matched(a: &str, b: &str) -> SkillSwap<MemoryStore> {
        use crate::swipe::Direction;

        let service = service_with(&[a, b]).await;
        service.record_swipe(a, b, Direction::Accept).await.unwrap();
        service.record_swipe(b, a, Direction::Accept).await.unwrap();
        service
    }
}
